//! Deterministic, tick-driven attribute transitions.
//!
//! Nothing here reads a wall clock. Hosts drive the scheduler with explicit
//! timestamps (a frame callback, a timer, or a test), which keeps every
//! animation reproducible.

mod interpolate;
mod scheduler;
mod transition;

pub use interpolate::{Easing, Interpolator};
pub use scheduler::{
    AttrWrite, ElementPhase, HandleStatus, TickOutput, TransitionHandle, TransitionScheduler,
};
pub use transition::{AnimationRequest, Completion, Delay, PhasePlan, TransitionSpec};
