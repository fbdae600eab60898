//! Phase solvers.
//!
//! One solver per phase kind: the movement adjudicator, the retreat
//! solver, and the winter-adjustment solver, plus the sequencer that
//! decides which phase comes next.

pub mod adjustment;
pub mod movement;
pub mod retreat;
pub mod sequencer;

pub use adjustment::{apply_adjustments, resolve_adjustments, AdjustmentOutcome};
pub use movement::{
    apply_movement, resolve_movement, Dislodgement, MovementOutcome, OrderResult, ResolvedOrder,
};
pub use retreat::{apply_retreats, resolve_retreats};
pub use sequencer::{advance_phase, last_power_standing, update_sc_ownership};
