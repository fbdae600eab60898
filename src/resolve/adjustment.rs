//! Winter-adjustment resolution.
//!
//! After the fall turn, each power fields exactly as many units as it
//! owns supply centers. Builds happen at open owned home centers up to
//! the positive delta; disbands remove existing units down to it. A
//! power that under-submits disbands is dismantled by civil disorder:
//! its surplus units are removed in a deterministic order derived from
//! the distance-to-home tables.

use tracing::debug;

use crate::board::distance::{disband_distance, INELIGIBLE};
use crate::board::loc::Loc;
use crate::board::order::Order;
use crate::board::province::{Coast, Power, ALL_POWERS, PROVINCE_COUNT};
use crate::board::state::GameState;
use crate::board::unit::{OrderUnit, UnitType};
use crate::protocol::orders::validate_order;

use super::movement::{OrderResult, ResolvedOrder};

/// The adjustment solver's report for one winter.
#[derive(Debug, Clone)]
pub struct AdjustmentOutcome {
    pub resolved: Vec<ResolvedOrder>,
    /// Powers whose disbands had to be chosen by civil disorder.
    pub civil_disorder: Vec<Power>,
}

/// Resolves build/disband/waive orders for all powers.
pub fn resolve_adjustments(orders: &[(Order, Power)], state: &GameState) -> AdjustmentOutcome {
    let mut resolved = Vec::new();
    let mut civil_disorder = Vec::new();

    for power in ALL_POWERS {
        let delta = state.adjustment_delta(power);

        if delta > 0 {
            let allowed = delta as usize;
            let mut built = 0usize;
            let mut taken = [false; PROVINCE_COUNT];
            for (order, p) in orders {
                if *p != power {
                    continue;
                }
                let ok = match order {
                    Order::Build { unit } => {
                        built < allowed
                            && !taken[unit.loc.province as usize]
                            && validate_order(order, power, state)
                    }
                    Order::Waive => built < allowed,
                    _ => false,
                };
                if ok {
                    built += 1;
                    if let Order::Build { unit } = order {
                        taken[unit.loc.province as usize] = true;
                    }
                }
                resolved.push(ResolvedOrder {
                    order: *order,
                    power,
                    result: if ok { OrderResult::Succeeded } else { OrderResult::Failed },
                });
            }
            // Unused build rights lapse silently.
        } else if delta < 0 {
            let needed = (-delta) as usize;
            let mut disbanded = 0usize;
            let mut taken = [false; PROVINCE_COUNT];
            for (order, p) in orders {
                if *p != power {
                    continue;
                }
                let ok = match order {
                    Order::Disband { unit } => {
                        disbanded < needed
                            && !taken[unit.loc.province as usize]
                            && validate_order(order, power, state)
                    }
                    _ => false,
                };
                if ok {
                    disbanded += 1;
                    if let Order::Disband { unit } = order {
                        taken[unit.loc.province as usize] = true;
                    }
                }
                resolved.push(ResolvedOrder {
                    order: *order,
                    power,
                    result: if ok { OrderResult::Succeeded } else { OrderResult::Failed },
                });
            }

            if disbanded < needed {
                let auto = dismantle(power, needed - disbanded, state, &taken);
                if !auto.is_empty() {
                    debug!(power = power.name(), count = auto.len(), "civil disorder disband");
                    civil_disorder.push(power);
                }
                resolved.extend(auto);
            }
        } else {
            // Balanced: submitted adjustment orders are void.
            for (order, p) in orders {
                if *p == power {
                    resolved.push(ResolvedOrder {
                        order: *order,
                        power,
                        result: OrderResult::Failed,
                    });
                }
            }
        }
    }

    AdjustmentOutcome { resolved, civil_disorder }
}

/// Picks `count` units of the power to disband under civil disorder.
///
/// Deterministic order: greatest distance-to-home first (per the
/// precomputed table for the unit's type), fleets before armies on ties,
/// then the higher canonical loc index. Units whose table entry is `-1`
/// are never selected this way.
fn dismantle(
    power: Power,
    count: usize,
    state: &GameState,
    already: &[bool; PROVINCE_COUNT],
) -> Vec<ResolvedOrder> {
    let mut candidates: Vec<(i16, UnitType, Loc)> = Vec::new();
    for (prov, unit_type, coast) in state.units_of(power) {
        if already[prov as usize] {
            continue;
        }
        let loc = Loc::with_coast(prov, coast);
        let dist = disband_distance(power, unit_type, loc);
        if dist == INELIGIBLE {
            continue;
        }
        candidates.push((dist, unit_type, loc));
    }

    candidates.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| {
                // Fleet outranks army on equal distance.
                let rank = |ut: UnitType| match ut {
                    UnitType::Fleet => 0,
                    UnitType::Army => 1,
                };
                rank(a.1).cmp(&rank(b.1))
            })
            .then_with(|| b.2.index().cmp(&a.2.index()))
    });

    candidates
        .into_iter()
        .take(count)
        .map(|(_, unit_type, loc)| ResolvedOrder {
            order: Order::Disband {
                unit: OrderUnit::new(unit_type, loc),
            },
            power,
            result: OrderResult::Succeeded,
        })
        .collect()
}

/// Applies adjustment results: successful builds enter the board and
/// successful disbands leave it.
pub fn apply_adjustments(state: &mut GameState, outcome: &AdjustmentOutcome) {
    for r in &outcome.resolved {
        if r.result != OrderResult::Succeeded {
            continue;
        }
        match r.order {
            Order::Build { unit } => {
                let prov = unit.loc.province;
                state.units[prov as usize] = Some((r.power, unit.unit_type));
                state.fleet_coast[prov as usize] = if unit.loc.coast != Coast::None {
                    Some(unit.loc.coast)
                } else {
                    None
                };
                state.influence[prov as usize] = Some(r.power);
            }
            Order::Disband { unit } => {
                state.remove_unit(unit.loc.province);
            }
            _ => {}
        }
    }
    for power in &outcome.civil_disorder {
        state.civil_disorder[*power as usize] = true;
    }
}
