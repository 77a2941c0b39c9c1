//! Span drag gestures on the editing surface.
//!
//! While a pointer is down, edits only touch the gesture's local preview.
//! Nothing reaches the store, and so nothing reaches the playback controller,
//! until the gesture is committed on pointer-up through the normalizing
//! commands. At most one gesture is active at a time.

use trimline_common::{SpeedRange, TimeRange};

use crate::store::RangeStore;

/// Which span list a gesture edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragLayer {
    Trim,
    Speed,
}

/// What part of the span is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    StartEdge,
    EndEdge,
    /// The whole span moves, keeping its length.
    Body,
}

/// One in-flight drag of a canonical span.
#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    layer: DragLayer,
    index: usize,
    target: DragTarget,
    anchor: f64,
    original: TimeRange,
    preview: TimeRange,
}

impl DragGesture {
    /// Start dragging span `index` of `layer` with the pointer at `pointer`.
    pub fn begin(
        store: &RangeStore,
        layer: DragLayer,
        index: usize,
        target: DragTarget,
        pointer: f64,
    ) -> Option<Self> {
        let original = match layer {
            DragLayer::Trim => store.trims().get(index).copied(),
            DragLayer::Speed => store.speeds().get(index).map(SpeedRange::range),
        }?;
        Some(Self {
            layer,
            index,
            target,
            anchor: pointer,
            original,
            preview: original,
        })
    }

    /// Move the pointer. Returns the uncommitted preview.
    pub fn update(&mut self, pointer: f64) -> TimeRange {
        let delta = pointer - self.anchor;
        self.preview = match self.target {
            DragTarget::StartEdge => TimeRange::new(self.original.start + delta, self.original.end),
            DragTarget::EndEdge => TimeRange::new(self.original.start, self.original.end + delta),
            DragTarget::Body => {
                TimeRange::new(self.original.start + delta, self.original.end + delta)
            }
        };
        self.preview
    }

    pub fn preview(&self) -> TimeRange {
        self.preview
    }

    pub fn layer(&self) -> DragLayer {
        self.layer
    }

    /// Write the preview through the store's normalizing commands.
    ///
    /// Returns `false` if the dragged span is no longer at its index
    /// unchanged (the list was replaced mid-gesture); the store is left
    /// untouched in that case.
    pub fn commit(self, store: &mut RangeStore) -> bool {
        let current = match self.layer {
            DragLayer::Trim => store.trims().get(self.index).copied(),
            DragLayer::Speed => store.speeds().get(self.index).map(SpeedRange::range),
        };
        if current != Some(self.original) {
            tracing::debug!(layer = ?self.layer, index = self.index, "Dropped stale drag");
            return false;
        }

        match self.layer {
            DragLayer::Trim => {
                let mut trims = store.trims().to_vec();
                let Some(slot) = trims.get_mut(self.index) else {
                    return false;
                };
                *slot = self.preview;
                store.set_trim_ranges(&trims);
            }
            DragLayer::Speed => {
                let mut speeds = store.speeds().to_vec();
                let Some(slot) = speeds.get_mut(self.index) else {
                    return false;
                };
                *slot = SpeedRange::new(self.preview.start, self.preview.end, slot.speed);
                store.set_speed_ranges(&speeds);
            }
        }
        tracing::debug!(layer = ?self.layer, index = self.index, "Committed drag");
        true
    }
}

/// Holder enforcing a single active gesture.
#[derive(Debug, Default)]
pub struct DragTracker {
    active: Option<DragGesture>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Pointer-down on a span. Ignored while another gesture is active.
    pub fn pointer_down(
        &mut self,
        store: &RangeStore,
        layer: DragLayer,
        index: usize,
        target: DragTarget,
        pointer: f64,
    ) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = DragGesture::begin(store, layer, index, target, pointer);
        self.active.is_some()
    }

    /// Pointer-move. Returns the preview of the active gesture.
    pub fn pointer_move(&mut self, pointer: f64) -> Option<TimeRange> {
        self.active.as_mut().map(|gesture| gesture.update(pointer))
    }

    /// Pointer-up. Hands back the finished gesture for committing.
    pub fn pointer_up(&mut self) -> Option<DragGesture> {
        self.active.take()
    }

    /// Abandon the active gesture without committing.
    pub fn cancel(&mut self) {
        self.active = None;
    }
}
