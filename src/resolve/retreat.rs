//! Retreat-phase resolution.
//!
//! Every dislodged unit either retreats to one of its recorded legal
//! destinations or disbands. Two units retreating into the same province
//! annihilate each other; a unit with no usable order disbands.

use crate::board::loc::Loc;
use crate::board::order::Order;
use crate::board::province::{Coast, Power, ALL_PROVINCES, PROVINCE_COUNT};
use crate::board::state::GameState;
use crate::board::unit::OrderUnit;

use super::movement::{OrderResult, ResolvedOrder};

/// Resolves retreat-phase orders.
///
/// The caller passes only orders that validated against the dislodged
/// set; anything else was already demoted. Rules:
/// - a retreat destination must be among the unit's recorded options;
/// - simultaneous retreats to the same province all fail (disband);
/// - dislodged units without an order disband;
/// - disband orders always go through.
pub fn resolve_retreats(orders: &[(Order, Power)], state: &GameState) -> Vec<ResolvedOrder> {
    let mut results = Vec::new();
    let mut ordered = [false; PROVINCE_COUNT];

    // Count retreat targets by parent province to find collisions.
    let mut target_count = [0u8; PROVINCE_COUNT];
    for (order, _) in orders {
        if let Order::Retreat { dest, .. } = order {
            target_count[dest.province as usize] += 1;
        }
    }

    for (order, power) in orders {
        let unit = match order.unit() {
            Some(u) => u,
            None => continue,
        };
        ordered[unit.loc.province as usize] = true;

        match order {
            Order::Disband { .. } => {
                results.push(ResolvedOrder {
                    order: *order,
                    power: *power,
                    result: OrderResult::Succeeded,
                });
            }
            Order::Retreat { dest, .. } => {
                let legal = state.dislodged[unit.loc.province as usize]
                    .as_ref()
                    .map(|d| d.retreat_options.contains(dest))
                    .unwrap_or(false);
                let result = if !legal {
                    OrderResult::Failed
                } else if target_count[dest.province as usize] > 1 {
                    OrderResult::Bounced
                } else {
                    OrderResult::Succeeded
                };
                results.push(ResolvedOrder {
                    order: *order,
                    power: *power,
                    result,
                });
            }
            _ => {
                results.push(ResolvedOrder {
                    order: *order,
                    power: *power,
                    result: OrderResult::Failed,
                });
            }
        }
    }

    // Unordered dislodged units disband.
    for prov in ALL_PROVINCES {
        if ordered[prov as usize] {
            continue;
        }
        if let Some(d) = &state.dislodged[prov as usize] {
            results.push(ResolvedOrder {
                order: Order::Disband {
                    unit: OrderUnit::new(d.unit_type, Loc::with_coast(prov, d.coast)),
                },
                power: d.power,
                result: OrderResult::Succeeded,
            });
        }
    }

    results
}

/// Applies retreat results: successful retreats re-enter the board, every
/// other dislodged unit is gone. Clears the dislodged set and the
/// contested markers, which only ever bind the retreat phase they were
/// produced for.
pub fn apply_retreats(state: &mut GameState, results: &[ResolvedOrder]) {
    for r in results {
        if r.result != OrderResult::Succeeded {
            continue;
        }
        if let Order::Retreat { unit, dest } = r.order {
            state.units[dest.province as usize] = Some((r.power, unit.unit_type));
            state.influence[dest.province as usize] = Some(r.power);
            state.fleet_coast[dest.province as usize] = if dest.coast != Coast::None {
                Some(dest.coast)
            } else {
                None
            };
        }
    }
    state.dislodged = std::array::from_fn(|_| None);
    state.contested = [false; PROVINCE_COUNT];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::phase::Phase;
    use crate::board::province::Province;
    use crate::board::state::DislodgedUnit;
    use crate::board::unit::UnitType;

    fn retreat_state() -> GameState {
        GameState::empty("S1901R".parse::<Phase>().unwrap())
    }

    fn dislodge(
        state: &mut GameState,
        prov: Province,
        power: Power,
        unit_type: UnitType,
        options: Vec<Loc>,
    ) {
        state.dislodged[prov as usize] = Some(DislodgedUnit {
            power,
            unit_type,
            coast: Coast::None,
            retreat_options: options,
        });
    }

    fn retreat(unit_type: UnitType, from: Province, to: Province) -> Order {
        Order::Retreat {
            unit: OrderUnit::new(unit_type, Loc::new(from)),
            dest: Loc::new(to),
        }
    }

    #[test]
    fn legal_retreat_succeeds_and_reenters_board() {
        let mut s = retreat_state();
        dislodge(
            &mut s,
            Province::Ser,
            Power::Austria,
            UnitType::Army,
            vec![Loc::new(Province::Alb)],
        );
        let results = resolve_retreats(
            &[(retreat(UnitType::Army, Province::Ser, Province::Alb), Power::Austria)],
            &s,
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].result, OrderResult::Succeeded);

        apply_retreats(&mut s, &results);
        assert_eq!(
            s.units[Province::Alb as usize],
            Some((Power::Austria, UnitType::Army))
        );
        assert_eq!(s.influence[Province::Alb as usize], Some(Power::Austria));
        assert!(!s.has_dislodged());
    }

    #[test]
    fn retreat_outside_options_disbands() {
        let mut s = retreat_state();
        dislodge(
            &mut s,
            Province::Ser,
            Power::Austria,
            UnitType::Army,
            vec![Loc::new(Province::Alb)],
        );
        // Greece was excluded at movement resolution (say, contested).
        let results = resolve_retreats(
            &[(retreat(UnitType::Army, Province::Ser, Province::Gre), Power::Austria)],
            &s,
        );
        assert_eq!(results[0].result, OrderResult::Failed);

        apply_retreats(&mut s, &results);
        assert!(s.units[Province::Gre as usize].is_none());
    }

    #[test]
    fn colliding_retreats_all_disband() {
        let mut s = retreat_state();
        dislodge(
            &mut s,
            Province::Ser,
            Power::Austria,
            UnitType::Army,
            vec![Loc::new(Province::Alb)],
        );
        dislodge(
            &mut s,
            Province::Gre,
            Power::Italy,
            UnitType::Army,
            vec![Loc::new(Province::Alb)],
        );
        let results = resolve_retreats(
            &[
                (retreat(UnitType::Army, Province::Ser, Province::Alb), Power::Austria),
                (retreat(UnitType::Army, Province::Gre, Province::Alb), Power::Italy),
            ],
            &s,
        );
        assert!(results.iter().all(|r| r.result == OrderResult::Bounced));

        apply_retreats(&mut s, &results);
        assert!(s.units[Province::Alb as usize].is_none());
    }

    #[test]
    fn unordered_dislodged_unit_disbands() {
        let mut s = retreat_state();
        dislodge(
            &mut s,
            Province::Vie,
            Power::Austria,
            UnitType::Army,
            vec![Loc::new(Province::Boh)],
        );
        let results = resolve_retreats(&[], &s);
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0].order, Order::Disband { .. }));
        assert_eq!(results[0].power, Power::Austria);
    }

    #[test]
    fn fleet_retreats_to_coast() {
        let mut s = retreat_state();
        s.dislodged[Province::Mao as usize] = Some(DislodgedUnit {
            power: Power::France,
            unit_type: UnitType::Fleet,
            coast: Coast::None,
            retreat_options: vec![Loc::with_coast(Province::Spa, Coast::North)],
        });
        let results = resolve_retreats(
            &[(
                Order::Retreat {
                    unit: OrderUnit::new(UnitType::Fleet, Loc::new(Province::Mao)),
                    dest: Loc::with_coast(Province::Spa, Coast::North),
                },
                Power::France,
            )],
            &s,
        );
        apply_retreats(&mut s, &results);
        assert_eq!(
            s.units[Province::Spa as usize],
            Some((Power::France, UnitType::Fleet))
        );
        assert_eq!(s.fleet_coast[Province::Spa as usize], Some(Coast::North));
    }
}
