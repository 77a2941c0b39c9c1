//! Range engine for trimline.
//!
//! Holds the canonical trim and speed spans of one source, reconciles a live
//! media handle against them, and serializes them for the render service.
//!
//! ```
//! use trimline_common::TimeRange;
//! use trimline_engine::normalize::normalize_trims;
//!
//! let trims = normalize_trims(
//!     &[TimeRange::new(3.0, 5.0), TimeRange::new(5.02, 6.0)],
//!     10.0,
//! );
//! assert_eq!(trims, vec![TimeRange::new(3.0, 6.0)]);
//! ```

pub mod drag;
pub mod export;
pub mod handle;
pub mod normalize;
pub mod playback;
pub mod resolve;
pub mod session;
pub mod store;
pub mod suggest;
pub mod ticker;

pub use drag::{DragGesture, DragLayer, DragTarget, DragTracker};
pub use export::{serialize_export, ExportRequest, ExportResponse, Segment};
pub use handle::{MediaEvent, MediaHandle};
pub use playback::PlaybackController;
pub use session::EditSession;
pub use store::{PlaybackState, RangeStore};
pub use suggest::{Suggestion, SuggestionAction, SuggestRequest, SuggestResponse};
pub use ticker::FrameTicker;
