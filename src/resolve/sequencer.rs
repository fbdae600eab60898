//! Phase sequencing.
//!
//! Drives the turn cycle MOVEMENT -> RETREAT -> ADJUSTMENT across years,
//! eliding phases with nothing to do: a retreat phase only exists while
//! units are dislodged, a winter only while some power's center and unit
//! counts disagree. Supply-center ownership moves exclusively at fall
//! adjudication.

use crate::board::phase::{Phase, PhaseKind, Season};
use crate::board::province::{Power, ALL_POWERS, ALL_PROVINCES};
use crate::board::state::GameState;

/// Captures supply centers for whichever units sit on them.
///
/// Called at the end of fall movement and fall retreat resolution; an
/// unoccupied center keeps its owner (ownership is sticky, disbands never
/// release it).
pub fn update_sc_ownership(state: &mut GameState) {
    for prov in ALL_PROVINCES {
        if !prov.is_supply_center() {
            continue;
        }
        if let Some((power, _)) = state.units[prov as usize] {
            state.sc_owner[prov as usize] = Some(power);
        }
    }
}

/// Advances a freshly resolved state to its next phase.
///
/// The state must already have the solver's results applied (moves
/// executed, dislodgements recorded, builds placed). Handles the fall SC
/// capture, phase elision, and the year increment across winter.
pub fn advance_phase(state: &mut GameState) {
    let phase = state.phase;

    if phase.season == Season::Fall
        && matches!(phase.kind, PhaseKind::Movement | PhaseKind::Retreat)
    {
        update_sc_ownership(state);
    }

    let next = next_phase(state);

    if next.kind != PhaseKind::Retreat {
        state.dislodged = std::array::from_fn(|_| None);
        state.contested = [false; crate::board::PROVINCE_COUNT];
    }

    state.phase = next;
}

/// The phase that follows, given the resolved state's contents.
fn next_phase(state: &GameState) -> Phase {
    let p = state.phase;
    let next_spring = Phase::new(Season::Spring, p.year + 1, PhaseKind::Movement);

    match (p.season, p.kind) {
        (Season::Spring, PhaseKind::Movement) => {
            if state.has_dislodged() {
                Phase::new(Season::Spring, p.year, PhaseKind::Retreat)
            } else {
                Phase::new(Season::Fall, p.year, PhaseKind::Movement)
            }
        }
        (Season::Spring, _) => Phase::new(Season::Fall, p.year, PhaseKind::Movement),
        (Season::Fall, PhaseKind::Movement) if state.has_dislodged() => {
            Phase::new(Season::Fall, p.year, PhaseKind::Retreat)
        }
        (Season::Fall, _) => {
            // SC ownership was already updated by the caller.
            if winter_due(state) {
                Phase::new(Season::Winter, p.year, PhaseKind::Adjustment)
            } else {
                next_spring
            }
        }
        (Season::Winter, _) => next_spring,
    }
}

/// A winter runs iff some power's delta is non-zero.
fn winter_due(state: &GameState) -> bool {
    state.any_adjustment_due()
}

/// True when a single power holds every owned supply center.
pub fn last_power_standing(state: &GameState) -> Option<Power> {
    let mut owners = ALL_POWERS.iter().filter(|p| state.sc_count(**p) > 0);
    match (owners.next(), owners.next()) {
        (Some(p), None) => Some(*p),
        _ => None,
    }
}
