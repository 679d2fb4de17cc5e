//! # tempus-types
//!
//! Time and value primitives for the tempus temporal algebra.
//!
//! This crate provides the building blocks temporal values are defined over:
//!
//! - **Time types**: `Timestamp`, `Period`, `PeriodSet`, `TimestampSet`
//! - **Value ranges**: `ValueRange` with range/element position predicates
//! - **Bounding box types**: `TBox`, `STBox`, `BoundingBox2D` and the `BoundingBox` trait
//!
//! All types are serializable with Serde; spatial boxes are built on top of
//! the `geo` crate's geometric primitives.
//!
//! ## Examples
//!
//! ```rust
//! use tempus_types::period::Period;
//! use tempus_types::period_set::PeriodSet;
//! use tempus_types::time::Timestamp;
//!
//! let t = Timestamp::from_secs;
//! let periods = vec![
//!     Period::closed(t(20), t(30))?,
//!     Period::closed(t(0), t(10))?,
//!     Period::new(t(10), t(15), false, true)?,
//! ];
//!
//! // Sorted, and the two periods touching at 10 are merged
//! let set = PeriodSet::new(periods, true)?;
//! assert_eq!(set.count(), 2);
//! assert_eq!(set.find_timestamp(t(17)), (false, 1));
//! # Ok::<(), tempus_types::error::TypesError>(())
//! ```

pub mod bbox;
pub mod error;
pub mod period;
pub mod period_set;
pub mod range;
pub mod time;
pub mod timestamp_set;
