//! Platform abstraction layer
//!
//! Frame loop scheduling. The driver owns the loop: every scheduled frame
//! carries the token it was started with and only runs (and reschedules)
//! while that token is current. Stopping is "stop scheduling", so a restart
//! can never leave a second loop running.

use std::cell::Cell;
use std::rc::Rc;

/// Identifies one run of a frame loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopToken(u64);

/// Shared gate deciding which loop may keep running
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    current: Rc<Cell<Option<u64>>>,
    generation: Rc<Cell<u64>>,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new loop, invalidating any previous one
    pub fn start(&self) -> LoopToken {
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);
        self.current.set(Some(generation));
        LoopToken(generation)
    }

    /// Invalidate the running loop, if any
    pub fn stop(&self) {
        self.current.set(None);
    }

    /// Whether a frame scheduled with `token` should still run
    pub fn is_current(&self, token: LoopToken) -> bool {
        self.current.get() == Some(token.0)
    }

    pub fn is_running(&self) -> bool {
        self.current.get().is_some()
    }
}
