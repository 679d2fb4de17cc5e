//! Temporal values: base values that change over time, with sequence-set
//! construction, synchronization, restriction and a compact binary codec.
//!
//! ```rust
//! use tempus::prelude::*;
//!
//! let t = Timestamp::from_secs;
//! let speed = TSequenceSet::from_sequences(
//!     vec![
//!         TSequence::new(
//!             vec![TInstant::new(0.0, t(0)), TInstant::new(10.0, t(10))],
//!             true,
//!             true,
//!             Interpolation::Linear,
//!             true,
//!         )?,
//!         TSequence::new(
//!             vec![TInstant::new(10.0, t(20)), TInstant::new(0.0, t(30))],
//!             true,
//!             true,
//!             Interpolation::Linear,
//!             true,
//!         )?,
//!     ],
//!     true,
//! )?;
//!
//! let fast = speed.at_range(&ValueRange::closed(8.0, 10.0)?).expect("reaches 8");
//! assert_eq!(fast.count(), 2);
//!
//! let bytes = tempus::codec::encode(&speed);
//! let decoded: TSequenceSet<f64> = tempus::codec::decode(&bytes)?;
//! assert_eq!(decoded, speed);
//! # Ok::<(), tempus::TempusError>(())
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod index;
pub mod temporal;
pub mod value;

pub use config::{
    BoundingBox, BoundingBox2D, Config, Period, PeriodSet, STBox, TBox, Timestamp, TimestampSet,
    ValueRange,
};
pub use error::{Result, TempusError};
pub use tempus_types::error::TypesError;

pub use temporal::{Interpolation, TInstant, TInstantSet, TSequence, TSequenceSet, Temporal};
pub use value::{TemporalNumber, TemporalValue};

pub use geo::Point;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Config, Result, TempusError};

    pub use crate::{Period, PeriodSet, TBox, Timestamp, TimestampSet, ValueRange};

    pub use crate::{Interpolation, TInstant, TInstantSet, TSequence, TSequenceSet, Temporal};

    pub use crate::{TemporalNumber, TemporalValue};

    pub use geo::Point;
}
