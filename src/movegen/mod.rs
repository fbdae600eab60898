//! Legal-order enumeration.
//!
//! For every orderable location, enumerates the complete set of orders
//! its occupant could legally submit in the current phase. The `Game`
//! aggregate memoizes the full map between phase transitions.

pub mod adjustment;
pub mod movement;
pub mod retreat;

use std::collections::BTreeMap;

use crate::board::loc::Loc;
use crate::board::order::Order;
use crate::board::phase::PhaseKind;
use crate::board::province::{Power, ALL_POWERS};
use crate::board::state::GameState;

/// All legal orders in the current phase, keyed by the issuing location.
pub fn all_possible_orders(state: &GameState) -> BTreeMap<Loc, Vec<Order>> {
    let mut map = BTreeMap::new();
    match state.phase.kind {
        PhaseKind::Movement => {
            for prov in crate::board::ALL_PROVINCES {
                if let Some(loc) = state.unit_loc(prov) {
                    map.insert(loc, movement::legal_orders(prov, state));
                }
            }
        }
        PhaseKind::Retreat => {
            for (loc, orders) in retreat::legal_retreats(state) {
                map.insert(loc, orders);
            }
        }
        PhaseKind::Adjustment => {
            for power in ALL_POWERS {
                for (loc, orders) in adjustment::legal_adjustments(power, state) {
                    map.insert(loc, orders);
                }
            }
        }
    }
    map
}

/// The locations each power must order this phase.
///
/// Movement: every unit. Retreat: every dislodged unit. Adjustment: open
/// home centers when builds are owed, all units when disbands are owed.
pub fn orderable_locations(state: &GameState) -> BTreeMap<Power, Vec<Loc>> {
    let mut map: BTreeMap<Power, Vec<Loc>> = BTreeMap::new();
    for power in ALL_POWERS {
        let mut locs = Vec::new();
        match state.phase.kind {
            PhaseKind::Movement => {
                for (prov, _, coast) in state.units_of(power) {
                    locs.push(Loc::with_coast(prov, coast));
                }
            }
            PhaseKind::Retreat => {
                for prov in crate::board::ALL_PROVINCES {
                    if let Some(d) = &state.dislodged[prov as usize] {
                        if d.power == power {
                            locs.push(Loc::with_coast(prov, d.coast));
                        }
                    }
                }
            }
            PhaseKind::Adjustment => {
                let delta = state.adjustment_delta(power);
                if delta > 0 {
                    let (_, homes) = state.build_options(power);
                    locs.extend(homes.into_iter().map(Loc::new));
                } else if delta < 0 {
                    for (prov, _, coast) in state.units_of(power) {
                        locs.push(Loc::with_coast(prov, coast));
                    }
                }
            }
        }
        map.insert(power, locs);
    }
    map
}
