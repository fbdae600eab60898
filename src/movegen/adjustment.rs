//! Adjustment-phase order enumeration.
//!
//! Powers owed builds get the legal build variants (army, and fleet per
//! coast where applicable) at each open owned home center plus a waive;
//! powers owed disbands get one disband per unit.

use crate::board::loc::Loc;
use crate::board::order::Order;
use crate::board::province::{Coast, Power, Terrain};
use crate::board::state::GameState;
use crate::board::unit::{OrderUnit, UnitType};

/// Legal orders for one power this winter, keyed by location.
pub fn legal_adjustments(power: Power, state: &GameState) -> Vec<(Loc, Vec<Order>)> {
    let delta = state.adjustment_delta(power);
    if delta > 0 {
        let (_, homes) = state.build_options(power);
        homes
            .into_iter()
            .map(|prov| {
                let mut orders = Vec::new();
                if prov.terrain() != Terrain::Sea {
                    orders.push(Order::Build {
                        unit: OrderUnit::new(UnitType::Army, Loc::new(prov)),
                    });
                }
                if prov.terrain() == Terrain::Coastal {
                    if prov.has_coasts() {
                        for coast in prov.coasts() {
                            orders.push(Order::Build {
                                unit: OrderUnit::new(
                                    UnitType::Fleet,
                                    Loc::with_coast(prov, *coast),
                                ),
                            });
                        }
                    } else {
                        orders.push(Order::Build {
                            unit: OrderUnit::new(UnitType::Fleet, Loc::new(prov)),
                        });
                    }
                }
                orders.push(Order::Waive);
                (Loc::new(prov), orders)
            })
            .collect()
    } else if delta < 0 {
        state
            .units_of(power)
            .map(|(prov, unit_type, coast)| {
                let loc = Loc::with_coast(prov, coast);
                let unit = OrderUnit::new(unit_type, loc);
                (loc, vec![Order::Disband { unit }])
            })
            .collect()
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::phase::Phase;
    use crate::board::province::Province;

    fn winter() -> Phase {
        "W1901A".parse().unwrap()
    }

    #[test]
    fn builds_offer_both_unit_types_on_coast() {
        let mut s = GameState::empty(winter());
        s.set_sc_owner(Province::Bre, Some(Power::France));
        s.set_sc_owner(Province::Par, Some(Power::France));

        let all = legal_adjustments(Power::France, &s);
        assert_eq!(all.len(), 2);

        let bre = &all.iter().find(|(l, _)| l.province == Province::Bre).unwrap().1;
        assert!(bre.iter().any(|o| matches!(
            o,
            Order::Build { unit } if unit.unit_type == UnitType::Army
        )));
        assert!(bre.iter().any(|o| matches!(
            o,
            Order::Build { unit } if unit.unit_type == UnitType::Fleet
        )));
        assert!(bre.contains(&Order::Waive));

        // Paris is inland: army only.
        let par = &all.iter().find(|(l, _)| l.province == Province::Par).unwrap().1;
        assert!(!par.iter().any(|o| matches!(
            o,
            Order::Build { unit } if unit.unit_type == UnitType::Fleet
        )));
    }

    #[test]
    fn split_coast_home_offers_fleet_per_coast() {
        let mut s = GameState::empty(winter());
        s.set_sc_owner(Province::Stp, Some(Power::Russia));

        let all = legal_adjustments(Power::Russia, &s);
        let stp = &all[0].1;
        let fleet_coasts: Vec<Coast> = stp
            .iter()
            .filter_map(|o| match o {
                Order::Build { unit } if unit.unit_type == UnitType::Fleet => {
                    Some(unit.loc.coast)
                }
                _ => None,
            })
            .collect();
        assert_eq!(fleet_coasts, vec![Coast::North, Coast::South]);
    }

    #[test]
    fn deficit_offers_disbands() {
        let mut s = GameState::empty(winter());
        s.set_sc_owner(Province::Vie, Some(Power::Austria));
        s.place_unit(Province::Vie, Power::Austria, UnitType::Army, Coast::None);
        s.place_unit(Province::Gre, Power::Austria, UnitType::Army, Coast::None);

        let all = legal_adjustments(Power::Austria, &s);
        assert_eq!(all.len(), 2);
        for (_, orders) in &all {
            assert_eq!(orders.len(), 1);
            assert!(matches!(orders[0], Order::Disband { .. }));
        }
    }

    #[test]
    fn balanced_power_has_no_adjustments() {
        let mut s = GameState::empty(winter());
        s.set_sc_owner(Province::Vie, Some(Power::Austria));
        s.place_unit(Province::Vie, Power::Austria, UnitType::Army, Coast::None);
        assert!(legal_adjustments(Power::Austria, &s).is_empty());
    }
}
