use crate::period::Period;
use crate::period_set::PeriodSet;
use crate::range::ValueRange;
use crate::time::Timestamp;
use crate::timestamp_set::TimestampSet;
use geo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Common behaviour of the value × time envelopes cached by temporal values.
pub trait BoundingBox: Clone + Debug + PartialEq {
    /// Grow `self` so that it also covers `other`.
    fn expand(&mut self, other: &Self);

    /// Time extent of the box as a closed period.
    fn timespan(&self) -> Period;
}

impl BoundingBox for Period {
    fn expand(&mut self, other: &Self) {
        *self = self.span(other);
    }

    fn timespan(&self) -> Period {
        *self
    }
}

/// A value × time box for temporal numbers.
///
/// Dimensions that a query does not constrain are set to infinity
/// (`f64::INFINITY` for values, `Timestamp::MIN`/`MAX` for time) so that the
/// box predicates ignore them.
///
/// # Examples
///
/// ```
/// use tempus_types::bbox::TBox;
/// use tempus_types::time::Timestamp;
///
/// let key = TBox::new(0.0, 10.0, Timestamp::from_secs(0), Timestamp::from_secs(60));
/// let query = TBox::from_value(5.0);
///
/// assert!(key.overlaps(&query));
/// assert!(key.contains(&query));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TBox {
    pub xmin: f64,
    pub xmax: f64,
    pub tmin: Timestamp,
    pub tmax: Timestamp,
}

impl TBox {
    pub fn new(xmin: f64, xmax: f64, tmin: Timestamp, tmax: Timestamp) -> Self {
        Self {
            xmin,
            xmax,
            tmin,
            tmax,
        }
    }

    /// Box of a single value observed at a single timestamp.
    pub fn from_value_at(value: f64, t: Timestamp) -> Self {
        Self::new(value, value, t, t)
    }

    pub fn from_value(value: f64) -> Self {
        Self::new(value, value, Timestamp::MIN, Timestamp::MAX)
    }

    pub fn from_range(range: &ValueRange) -> Self {
        Self::new(range.lower(), range.upper(), Timestamp::MIN, Timestamp::MAX)
    }

    pub fn from_timestamp(t: Timestamp) -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY, t, t)
    }

    pub fn from_timestamp_set(ts: &TimestampSet) -> Self {
        Self::from_period(&ts.timespan())
    }

    pub fn from_period(period: &Period) -> Self {
        Self::new(
            f64::NEG_INFINITY,
            f64::INFINITY,
            period.lower(),
            period.upper(),
        )
    }

    pub fn from_period_set(ps: &PeriodSet) -> Self {
        Self::from_period(&ps.timespan())
    }

    pub fn overlaps(&self, other: &TBox) -> bool {
        self.xmax >= other.xmin
            && other.xmax >= self.xmin
            && self.tmax >= other.tmin
            && other.tmax >= self.tmin
    }

    /// Returns true if `other` lies entirely inside `self`.
    pub fn contains(&self, other: &TBox) -> bool {
        self.xmin <= other.xmin
            && self.xmax >= other.xmax
            && self.tmin <= other.tmin
            && self.tmax >= other.tmax
    }

    pub fn contained(&self, other: &TBox) -> bool {
        other.contains(self)
    }

    pub fn same(&self, other: &TBox) -> bool {
        self.xmin == other.xmin
            && self.xmax == other.xmax
            && self.tmin == other.tmin
            && self.tmax == other.tmax
    }

    pub fn left(&self, other: &TBox) -> bool {
        self.xmax < other.xmin
    }

    pub fn overleft(&self, other: &TBox) -> bool {
        self.xmax <= other.xmax
    }

    pub fn right(&self, other: &TBox) -> bool {
        self.xmin > other.xmax
    }

    pub fn overright(&self, other: &TBox) -> bool {
        self.xmin >= other.xmin
    }

    pub fn before(&self, other: &TBox) -> bool {
        self.tmax < other.tmin
    }

    pub fn overbefore(&self, other: &TBox) -> bool {
        self.tmax <= other.tmax
    }

    pub fn after(&self, other: &TBox) -> bool {
        self.tmin > other.tmax
    }

    pub fn overafter(&self, other: &TBox) -> bool {
        self.tmin >= other.tmin
    }
}

impl BoundingBox for TBox {
    fn expand(&mut self, other: &Self) {
        self.xmin = self.xmin.min(other.xmin);
        self.xmax = self.xmax.max(other.xmax);
        self.tmin = self.tmin.min(other.tmin);
        self.tmax = self.tmax.max(other.tmax);
    }

    fn timespan(&self) -> Period {
        Period::instant(self.tmin).span(&Period::instant(self.tmax))
    }
}

/// A 2D axis-aligned bounding box.
///
/// Thin wrapper around `geo::Rect`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2D {
    pub rect: Rect,
}

impl BoundingBox2D {
    /// # Examples
    ///
    /// ```
    /// use tempus_types::bbox::BoundingBox2D;
    ///
    /// let bbox = BoundingBox2D::new(-74.0, 40.7, -73.9, 40.8);
    /// assert!((bbox.width() - 0.1).abs() < 1e-9);
    /// ```
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            rect: Rect::new(
                geo::coord! { x: min_x, y: min_y },
                geo::coord! { x: max_x, y: max_y },
            ),
        }
    }

    pub fn from_point(point: &Point<f64>) -> Self {
        Self::new(point.x(), point.y(), point.x(), point.y())
    }

    pub fn min_x(&self) -> f64 {
        self.rect.min().x
    }

    pub fn min_y(&self) -> f64 {
        self.rect.min().y
    }

    pub fn max_x(&self) -> f64 {
        self.rect.max().x
    }

    pub fn max_y(&self) -> f64 {
        self.rect.max().y
    }

    pub fn width(&self) -> f64 {
        self.max_x() - self.min_x()
    }

    pub fn height(&self) -> f64 {
        self.max_y() - self.min_y()
    }

    pub fn contains_point(&self, point: &Point<f64>) -> bool {
        point.x() >= self.min_x()
            && point.x() <= self.max_x()
            && point.y() >= self.min_y()
            && point.y() <= self.max_y()
    }

    pub fn intersects(&self, other: &BoundingBox2D) -> bool {
        !(self.max_x() < other.min_x()
            || self.min_x() > other.max_x()
            || self.max_y() < other.min_y()
            || self.min_y() > other.max_y())
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &BoundingBox2D) -> Self {
        Self::new(
            self.min_x().min(other.min_x()),
            self.min_y().min(other.min_y()),
            self.max_x().max(other.max_x()),
            self.max_y().max(other.max_y()),
        )
    }
}

/// A spatial box with a time extent, cached by temporal points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct STBox {
    pub spatial: BoundingBox2D,
    pub tmin: Timestamp,
    pub tmax: Timestamp,
}

impl STBox {
    pub fn new(spatial: BoundingBox2D, tmin: Timestamp, tmax: Timestamp) -> Self {
        Self {
            spatial,
            tmin,
            tmax,
        }
    }

    pub fn from_point_at(point: &Point<f64>, t: Timestamp) -> Self {
        Self::new(BoundingBox2D::from_point(point), t, t)
    }

    pub fn overlaps(&self, other: &STBox) -> bool {
        self.spatial.intersects(&other.spatial) && self.tmax >= other.tmin && other.tmax >= self.tmin
    }
}

impl BoundingBox for STBox {
    fn expand(&mut self, other: &Self) {
        self.spatial = self.spatial.union(&other.spatial);
        self.tmin = self.tmin.min(other.tmin);
        self.tmax = self.tmax.max(other.tmax);
    }

    fn timespan(&self) -> Period {
        Period::instant(self.tmin).span(&Period::instant(self.tmax))
    }
}
