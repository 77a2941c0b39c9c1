//! Trimline-Common: shared range types, engine constants, and errors.
//!
//! This crate provides the vocabulary used across trimline:
//!
//! - **Range types**: [`TimeRange`], [`TrimRange`] and [`SpeedRange`]
//! - **Constants**: separation, minimum-length and epsilon values that define canonical form
//! - **Time parsing**: `SS`, `MM:SS` and `HH:MM:SS` strings into seconds
//! - **Error Handling**: the common error type and result alias
//!
//! # Examples
//!
//! ```
//! use trimline_common::{clamp_time, time::parse_time, TimeRange};
//!
//! let range = TimeRange::new(parse_time("0:01").unwrap(), 3.0);
//! assert_eq!(range.len(), 2.0);
//!
//! // Without a known duration only the floor is enforced.
//! assert_eq!(clamp_time(42.0, 0.0), 42.0);
//! assert_eq!(clamp_time(42.0, 10.0), 10.0);
//! ```

pub mod error;
pub mod time;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
