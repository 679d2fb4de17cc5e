//! Base value types that can vary over time.
//!
//! Everything the generic containers need to know about a value type lives in
//! the [`TemporalValue`] trait: total ordering, hashing, interpolation and
//! crossing detection for continuous types, bounding boxes and the fixed
//! width wire encoding.

use crate::error::{Result, TempusError};
use bytes::{Buf, BufMut, BytesMut};
use geo::Point;
use rustc_hash::FxHasher;
use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use tempus_types::bbox::{BoundingBox, STBox, TBox};
use tempus_types::period::Period;
use tempus_types::time::Timestamp;

/// Relative tolerance for collinearity and crossing checks on floats.
const EPSILON: f64 = 1e-10;

pub trait TemporalValue: Clone + Debug + Send + Sync + 'static {
    type Box: BoundingBox;

    const TYPE_NAME: &'static str;

    /// Whether linear interpolation is meaningful for the type.
    const CONTINUOUS: bool;

    /// Total order used for canonical comparison of temporal values.
    fn value_cmp(&self, other: &Self) -> Ordering;

    fn value_eq(&self, other: &Self) -> bool {
        self.value_cmp(other) == Ordering::Equal
    }

    fn value_hash(&self) -> u32;

    /// Value at `ratio` in `[0, 1]` along the segment `start -> end`.
    fn interpolate(start: &Self, _end: &Self, _ratio: f64) -> Self {
        start.clone()
    }

    /// Ratio at which the segment `start -> end` takes the value `target`.
    fn locate(_start: &Self, _end: &Self, _target: &Self) -> Option<f64> {
        None
    }

    /// Ratio strictly inside `(0, 1)` at which the segments `a1 -> a2` and
    /// `b1 -> b2` take the same value.
    fn crossing(_a1: &Self, _a2: &Self, _b1: &Self, _b2: &Self) -> Option<f64> {
        None
    }

    /// Whether `middle` lies at `ratio` on the segment `start -> end`.
    fn collinear(start: &Self, middle: &Self, end: &Self, _ratio: f64) -> bool {
        start.value_eq(middle) && middle.value_eq(end)
    }

    fn make_box(&self, t: Timestamp) -> Self::Box;

    /// False only if the box proves the value never occurs.
    fn box_may_contain(_bbox: &Self::Box, _value: &Self) -> bool {
        true
    }

    /// Numeric value extent of a box, `None` for non-numeric types.
    fn box_value_extent(_bbox: &Self::Box) -> Option<(f64, f64)> {
        None
    }

    /// Inverse of the numeric box projection.
    fn from_extent(_value: f64) -> Option<Self> {
        None
    }

    fn encode(&self, buf: &mut BytesMut);

    fn decode<B: Buf>(buf: &mut B) -> Result<Self>;

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

/// Temporal values with a numeric base type and a `TBox` envelope.
pub trait TemporalNumber: TemporalValue<Box = TBox> + Copy {
    fn to_f64(self) -> f64;

    fn from_f64(value: f64) -> Self;
}

fn fx_hash<T: Hash + ?Sized>(value: &T) -> u32 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    let h = hasher.finish();
    (h ^ (h >> 32)) as u32
}

pub(crate) fn timestamp_hash(t: Timestamp) -> u32 {
    fx_hash(&t.as_micros())
}

pub(crate) fn ensure_remaining<B: Buf>(buf: &B, needed: usize) -> Result<()> {
    if buf.remaining() < needed {
        return Err(TempusError::UnexpectedEof);
    }
    Ok(())
}

/// Total order on floats in which `-0.0` and `0.0` are the same value.
fn float_cmp(a: f64, b: f64) -> Ordering {
    if a == b { Ordering::Equal } else { a.total_cmp(&b) }
}

/// Bits of `value` with the sign of zero dropped, consistent with [`float_cmp`].
fn float_bits(value: f64) -> u64 {
    if value == 0.0 { 0 } else { value.to_bits() }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON * a.abs().max(b.abs()).max(1.0)
}

/// Ratio at which two scalar segments meet strictly inside the segment.
fn scalar_crossing(a1: f64, a2: f64, b1: f64, b2: f64) -> Option<f64> {
    let d1 = a1 - b1;
    let d2 = a2 - b2;
    if d1 == 0.0 || d2 == 0.0 || (d1 > 0.0) == (d2 > 0.0) {
        return None;
    }
    let ratio = d1 / (d1 - d2);
    (ratio > 0.0 && ratio < 1.0).then_some(ratio)
}

impl TemporalValue for i32 {
    type Box = TBox;

    const TYPE_NAME: &'static str = "int";
    const CONTINUOUS: bool = false;

    fn value_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn value_hash(&self) -> u32 {
        fx_hash(self)
    }

    fn make_box(&self, t: Timestamp) -> TBox {
        TBox::from_value_at(*self as f64, t)
    }

    fn box_may_contain(bbox: &TBox, value: &Self) -> bool {
        let v = *value as f64;
        bbox.xmin <= v && v <= bbox.xmax
    }

    fn box_value_extent(bbox: &TBox) -> Option<(f64, f64)> {
        Some((bbox.xmin, bbox.xmax))
    }

    fn from_extent(value: f64) -> Option<Self> {
        Some(value as i32)
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i32(*self);
    }

    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        ensure_remaining(buf, 4)?;
        Ok(buf.get_i32())
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl TemporalNumber for i32 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value.round() as i32
    }
}

impl TemporalValue for f64 {
    type Box = TBox;

    const TYPE_NAME: &'static str = "float";
    const CONTINUOUS: bool = true;

    fn value_cmp(&self, other: &Self) -> Ordering {
        float_cmp(*self, *other)
    }

    fn value_hash(&self) -> u32 {
        fx_hash(&float_bits(*self))
    }

    fn interpolate(start: &Self, end: &Self, ratio: f64) -> Self {
        start + (end - start) * ratio
    }

    fn locate(start: &Self, end: &Self, target: &Self) -> Option<f64> {
        if start == end {
            return None;
        }
        let (lo, hi) = if start < end { (*start, *end) } else { (*end, *start) };
        if *target < lo || *target > hi {
            return None;
        }
        Some(((target - start) / (end - start)).clamp(0.0, 1.0))
    }

    fn crossing(a1: &Self, a2: &Self, b1: &Self, b2: &Self) -> Option<f64> {
        scalar_crossing(*a1, *a2, *b1, *b2)
    }

    fn collinear(start: &Self, middle: &Self, end: &Self, ratio: f64) -> bool {
        approx_eq(Self::interpolate(start, end, ratio), *middle)
    }

    fn make_box(&self, t: Timestamp) -> TBox {
        TBox::from_value_at(*self, t)
    }

    fn box_may_contain(bbox: &TBox, value: &Self) -> bool {
        bbox.xmin <= *value && *value <= bbox.xmax
    }

    fn box_value_extent(bbox: &TBox) -> Option<(f64, f64)> {
        Some((bbox.xmin, bbox.xmax))
    }

    fn from_extent(value: f64) -> Option<Self> {
        Some(value)
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_f64(*self);
    }

    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        ensure_remaining(buf, 8)?;
        Ok(buf.get_f64())
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl TemporalNumber for f64 {
    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}

impl TemporalValue for bool {
    type Box = Period;

    const TYPE_NAME: &'static str = "bool";
    const CONTINUOUS: bool = false;

    fn value_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn value_hash(&self) -> u32 {
        fx_hash(self)
    }

    fn make_box(&self, t: Timestamp) -> Period {
        Period::instant(t)
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(u8::from(*self));
    }

    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        ensure_remaining(buf, 1)?;
        match buf.get_u8() {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(TempusError::InvalidFormat(format!(
                "invalid boolean byte {}",
                other
            ))),
        }
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if *self { "t" } else { "f" })
    }
}

impl TemporalValue for String {
    type Box = Period;

    const TYPE_NAME: &'static str = "text";
    const CONTINUOUS: bool = false;

    fn value_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn value_hash(&self) -> u32 {
        fx_hash(self.as_str())
    }

    fn make_box(&self, t: Timestamp) -> Period {
        Period::instant(t)
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32(self.len() as u32);
        buf.put(self.as_bytes());
    }

    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        ensure_remaining(buf, 4)?;
        let len = buf.get_u32() as usize;
        ensure_remaining(buf, len)?;
        let mut bytes = vec![0u8; len];
        buf.copy_to_slice(&mut bytes);
        String::from_utf8(bytes)
            .map_err(|e| TempusError::InvalidFormat(format!("text value is not UTF-8: {}", e)))
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

impl TemporalValue for Point<f64> {
    type Box = STBox;

    const TYPE_NAME: &'static str = "point";
    const CONTINUOUS: bool = true;

    fn value_cmp(&self, other: &Self) -> Ordering {
        float_cmp(self.x(), other.x()).then_with(|| float_cmp(self.y(), other.y()))
    }

    fn value_hash(&self) -> u32 {
        fx_hash(&(float_bits(self.x()), float_bits(self.y())))
    }

    fn interpolate(start: &Self, end: &Self, ratio: f64) -> Self {
        Point::new(
            start.x() + (end.x() - start.x()) * ratio,
            start.y() + (end.y() - start.y()) * ratio,
        )
    }

    fn locate(start: &Self, end: &Self, target: &Self) -> Option<f64> {
        let dx = end.x() - start.x();
        let dy = end.y() - start.y();
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        let ratio = if dx.abs() >= dy.abs() {
            (target.x() - start.x()) / dx
        } else {
            (target.y() - start.y()) / dy
        };
        if !(0.0..=1.0).contains(&ratio) {
            return None;
        }
        let on_segment = Self::interpolate(start, end, ratio);
        (approx_eq(on_segment.x(), target.x()) && approx_eq(on_segment.y(), target.y()))
            .then_some(ratio)
    }

    fn crossing(a1: &Self, a2: &Self, b1: &Self, b2: &Self) -> Option<f64> {
        let x_static = a1.x() == b1.x() && a2.x() == b2.x();
        let y_static = a1.y() == b1.y() && a2.y() == b2.y();
        match (x_static, y_static) {
            (true, true) => None,
            (true, false) => scalar_crossing(a1.y(), a2.y(), b1.y(), b2.y()),
            (false, true) => scalar_crossing(a1.x(), a2.x(), b1.x(), b2.x()),
            (false, false) => {
                let rx = scalar_crossing(a1.x(), a2.x(), b1.x(), b2.x())?;
                let ry = scalar_crossing(a1.y(), a2.y(), b1.y(), b2.y())?;
                approx_eq(rx, ry).then_some(rx)
            }
        }
    }

    fn collinear(start: &Self, middle: &Self, end: &Self, ratio: f64) -> bool {
        let expected = Self::interpolate(start, end, ratio);
        approx_eq(expected.x(), middle.x()) && approx_eq(expected.y(), middle.y())
    }

    fn make_box(&self, t: Timestamp) -> STBox {
        STBox::from_point_at(self, t)
    }

    fn box_may_contain(bbox: &STBox, value: &Self) -> bool {
        bbox.spatial.contains_point(value)
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_f64(self.x());
        buf.put_f64(self.y());
    }

    fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        ensure_remaining(buf, 16)?;
        let x = buf.get_f64();
        let y = buf.get_f64();
        Ok(Point::new(x, y))
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POINT({} {})", self.x(), self.y())
    }
}

/// Formats a value through [`TemporalValue::fmt_value`].
pub(crate) struct DisplayValue<'a, V>(pub &'a V);

impl<V: TemporalValue> fmt::Display for DisplayValue<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_value(f)
    }
}
