//! Frame scheduling abstraction for coalesced recomputes.
//!
//! Drag/resize/pan updates invalidate derived state (paths, bounds) many
//! times per frame; the workspace keeps one pending flag and asks the
//! scheduler for a single frame, so repeated invalidations supersede
//! rather than stack.

/// Requests an animation-frame-style callback from the embedding layer.
pub trait FrameScheduler {
    /// Ask for one frame. Calling this while a frame is already requested
    /// must be a no-op for the embedder; the workspace guards with its own
    /// pending flag anyway.
    fn request_frame(&mut self);
}

/// Scheduler that only counts requests; the test (or a synchronous
/// embedder) drives frames by hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualScheduler {
    requested: u32,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames requested so far.
    pub fn requested(&self) -> u32 {
        self.requested
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) {
        self.requested += 1;
    }
}
