//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per displayed frame
//! - Randomness only through the RNG passed to `start_round`
//! - No rendering, storage or network; side effects leave as `GameEvent`s

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{BoundaryExit, bounce_angle, boundary_exit};
pub use state::{
    Ball, EndReason, GameEvent, Outcome, Paddle, Phase, RallyCounter, RoundState, RoundSummary,
    SimulationState,
};
pub use tick::{FrameInput, FrameResult, advance_frame, step};
