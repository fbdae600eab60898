//! Order-text parsing, normalization, and per-phase validation.
//!
//! The canonical grammar (emitted by `Order`'s `Display`):
//!
//! ```text
//! ORDER  := UNIT SP ACTION
//! UNIT   := ('A'|'F') SP LOC
//! ACTION := 'H'
//!         | '-' SP LOC ['VIA']
//!         | 'S' SP UNIT ['-' SP LOC]
//!         | 'C' SP UNIT '-' SP LOC
//!         | 'R' SP LOC
//!         | 'D'
//!         | 'B'
//!         | 'WAIVE'
//! LOC    := PROV ['/' COAST]
//! ```
//!
//! Parsing is tolerant of case and whitespace and additionally accepts a
//! trailing `H` on support-hold orders and a bare `WAIVE`. Validation is
//! deliberately quiet: a rejected order is kept by the caller with its
//! validity flag cleared and adjudicated as a hold, so replays of games
//! containing illegal submissions come out identical.

use crate::board::adjacency::{fleet_dest_coasts, is_adjacent};
use crate::board::loc::Loc;
use crate::board::order::Order;
use crate::board::phase::PhaseKind;
use crate::board::province::{Coast, Power, Terrain};
use crate::board::state::GameState;
use crate::board::unit::{OrderUnit, UnitType};
use crate::error::GameError;

/// Parses one order string into an `Order`, checking syntax only.
pub fn parse_order(s: &str) -> Result<Order, GameError> {
    let fail = || GameError::Parse(s.trim().to_string());
    let text = s.trim().to_ascii_uppercase();
    let tokens: Vec<&str> = text.split_whitespace().collect();

    match tokens.as_slice() {
        ["WAIVE", ..] => Ok(Order::Waive),
        [] | [_] => Err(fail()),
        // Tolerated long form: a unit reference in front of the waive.
        [_, _, "WAIVE"] => Ok(Order::Waive),
        [ut, loc, rest @ ..] => {
            let unit = parse_unit(ut, loc).ok_or_else(fail)?;
            match rest {
                ["H"] => Ok(Order::Hold { unit }),
                ["-", dest] => Ok(Order::Move {
                    unit,
                    dest: parse_loc(dest).ok_or_else(fail)?,
                    via_convoy: false,
                }),
                ["-", dest, "VIA"] => Ok(Order::Move {
                    unit,
                    dest: parse_loc(dest).ok_or_else(fail)?,
                    via_convoy: true,
                }),
                ["S", tut, tloc] | ["S", tut, tloc, "H"] => Ok(Order::SupportHold {
                    unit,
                    target: parse_unit(tut, tloc).ok_or_else(fail)?,
                }),
                ["S", tut, tloc, "-", dest] => Ok(Order::SupportMove {
                    unit,
                    target: parse_unit(tut, tloc).ok_or_else(fail)?,
                    dest: parse_loc(dest).ok_or_else(fail)?,
                }),
                ["C", "A", from, "-", dest] => Ok(Order::Convoy {
                    unit,
                    army: parse_loc(from).ok_or_else(fail)?,
                    dest: parse_loc(dest).ok_or_else(fail)?,
                }),
                ["R", dest] => Ok(Order::Retreat {
                    unit,
                    dest: parse_loc(dest).ok_or_else(fail)?,
                }),
                ["D"] => Ok(Order::Disband { unit }),
                ["B"] => Ok(Order::Build { unit }),
                _ => Err(fail()),
            }
        }
    }
}

fn parse_unit(ut: &str, loc: &str) -> Option<OrderUnit> {
    let mut chars = ut.chars();
    let letter = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(OrderUnit::new(UnitType::from_letter(letter)?, parse_loc(loc)?))
}

fn parse_loc(s: &str) -> Option<Loc> {
    Loc::from_str_loose(s)
}

/// Rewrites an order against the board so sloppy submissions still refer
/// to real units: the issuing and supported units take their actual type
/// and coast from the board, a fleet move to a split-coast province with
/// no coast named takes the single reachable coast, and a non-adjacent
/// army move is marked as travelling by convoy.
pub fn normalize_order(order: Order, state: &GameState) -> Order {
    let fix_unit = |u: OrderUnit| -> OrderUnit {
        match state.units[u.loc.province as usize] {
            Some((_, unit_type)) => OrderUnit::new(
                unit_type,
                state.unit_loc(u.loc.province).unwrap_or(u.loc),
            ),
            None => u,
        }
    };

    match order {
        Order::Hold { unit } => Order::Hold { unit: fix_unit(unit) },
        Order::Move { unit, mut dest, via_convoy } => {
            let unit = fix_unit(unit);
            if unit.unit_type == UnitType::Fleet
                && dest.province.has_coasts()
                && dest.coast == Coast::None
            {
                let coasts = fleet_dest_coasts(unit.loc, dest.province);
                if coasts.len() == 1 {
                    dest = Loc::with_coast(dest.province, coasts[0]);
                }
            }
            let via_convoy = via_convoy
                || (unit.unit_type == UnitType::Army && !is_adjacent(unit.loc, dest, false));
            Order::Move { unit, dest, via_convoy }
        }
        Order::SupportHold { unit, target } => Order::SupportHold {
            unit: fix_unit(unit),
            target: fix_unit(target),
        },
        Order::SupportMove { unit, target, dest } => Order::SupportMove {
            unit: fix_unit(unit),
            target: fix_unit(target),
            dest,
        },
        Order::Convoy { unit, army, dest } => Order::Convoy {
            unit: fix_unit(unit),
            army,
            dest,
        },
        Order::Retreat { unit, dest } => {
            // Dislodged units are off the board; take type from the
            // dislodgement record instead.
            let unit = match &state.dislodged[unit.loc.province as usize] {
                Some(d) => OrderUnit::new(
                    d.unit_type,
                    Loc::with_coast(unit.loc.province, d.coast),
                ),
                None => unit,
            };
            Order::Retreat { unit, dest }
        }
        Order::Disband { unit } => {
            let unit = match &state.dislodged[unit.loc.province as usize] {
                Some(d) if state.phase.kind == PhaseKind::Retreat => OrderUnit::new(
                    d.unit_type,
                    Loc::with_coast(unit.loc.province, d.coast),
                ),
                _ => fix_unit(unit),
            };
            Order::Disband { unit }
        }
        Order::Build { .. } | Order::Waive => order,
    }
}

/// Checks an order against the board and the current phase kind.
///
/// Returns false for any order that must not influence adjudication: the
/// wrong kind for the phase, a unit that does not exist or belongs to
/// another power, or a reference that breaks adjacency for the unit type
/// (convoy moves excepted).
pub fn validate_order(order: &Order, power: Power, state: &GameState) -> bool {
    match state.phase.kind {
        PhaseKind::Movement => validate_movement(order, power, state),
        PhaseKind::Retreat => validate_retreat(order, power, state),
        PhaseKind::Adjustment => validate_adjustment(order, power, state),
    }
}

fn owns_unit(unit: &OrderUnit, power: Power, state: &GameState) -> bool {
    let idx = unit.loc.province as usize;
    match state.units[idx] {
        Some((p, ut)) => {
            p == power && ut == unit.unit_type && state.unit_loc(unit.loc.province) == Some(unit.loc)
        }
        None => false,
    }
}

fn unit_exists(unit: &OrderUnit, state: &GameState) -> bool {
    matches!(state.units[unit.loc.province as usize], Some((_, ut)) if ut == unit.unit_type)
}

fn validate_movement(order: &Order, power: Power, state: &GameState) -> bool {
    match order {
        Order::Hold { unit } => owns_unit(unit, power, state),
        Order::Move { unit, dest, via_convoy } => {
            if !owns_unit(unit, power, state) || dest.province == unit.loc.province {
                return false;
            }
            if !unit.unit_type.can_occupy(dest.province.terrain()) {
                return false;
            }
            match unit.unit_type {
                UnitType::Fleet => {
                    // A split-coast destination must name its coast; the
                    // normalizer already filled it in when unambiguous.
                    if dest.province.has_coasts() && dest.coast == Coast::None {
                        return false;
                    }
                    is_adjacent(unit.loc, *dest, true)
                }
                UnitType::Army => {
                    if is_adjacent(unit.loc, *dest, false) && !via_convoy {
                        return true;
                    }
                    // Convoy attempt: both ends must be coastal.
                    unit.loc.province.terrain() == Terrain::Coastal
                        && dest.province.terrain() == Terrain::Coastal
                }
            }
        }
        Order::SupportHold { unit, target } => {
            owns_unit(unit, power, state)
                && unit_exists(target, state)
                && target.loc.province != unit.loc.province
                && is_adjacent(
                    unit.loc,
                    Loc::new(target.loc.province),
                    unit.unit_type == UnitType::Fleet,
                )
        }
        Order::SupportMove { unit, target, dest } => {
            owns_unit(unit, power, state)
                && unit_exists(target, state)
                && target.loc.province != unit.loc.province
                && dest.province != unit.loc.province
                && is_adjacent(
                    unit.loc,
                    Loc::new(dest.province),
                    unit.unit_type == UnitType::Fleet,
                )
        }
        Order::Convoy { unit, army, dest } => {
            unit.unit_type == UnitType::Fleet
                && owns_unit(unit, power, state)
                && unit.loc.province.terrain() == Terrain::Sea
                && army.province.terrain() == Terrain::Coastal
                && dest.province.terrain() == Terrain::Coastal
                && matches!(
                    state.units[army.province as usize],
                    Some((_, UnitType::Army))
                )
        }
        _ => false,
    }
}

fn validate_retreat(order: &Order, power: Power, state: &GameState) -> bool {
    let dislodged_here = |unit: &OrderUnit| {
        matches!(
            &state.dislodged[unit.loc.province as usize],
            Some(d) if d.power == power && d.unit_type == unit.unit_type
        )
    };
    match order {
        Order::Retreat { unit, dest } => {
            dislodged_here(unit)
                && unit.unit_type.can_occupy(dest.province.terrain())
                && is_adjacent(unit.loc, *dest, unit.unit_type == UnitType::Fleet)
        }
        Order::Disband { unit } => dislodged_here(unit),
        _ => false,
    }
}

fn validate_adjustment(order: &Order, power: Power, state: &GameState) -> bool {
    match order {
        Order::Build { unit } => {
            let prov = unit.loc.province;
            if prov.home_power() != Some(power)
                || state.sc_owner[prov as usize] != Some(power)
                || state.units[prov as usize].is_some()
            {
                return false;
            }
            match unit.unit_type {
                UnitType::Army => {
                    unit.loc.coast == Coast::None && prov.terrain() != Terrain::Sea
                }
                UnitType::Fleet => {
                    if prov.terrain() != Terrain::Coastal {
                        return false;
                    }
                    if prov.has_coasts() {
                        prov.coasts().contains(&unit.loc.coast)
                    } else {
                        unit.loc.coast == Coast::None
                    }
                }
            }
        }
        Order::Disband { unit } => owns_unit(unit, power, state),
        Order::Waive => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::phase::{Phase, PhaseKind, Season};
    use crate::board::province::Province;
    use crate::board::state::DislodgedUnit;

    fn loc(p: Province) -> Loc {
        Loc::new(p)
    }

    fn army(p: Province) -> OrderUnit {
        OrderUnit::new(UnitType::Army, loc(p))
    }

    fn fleet(p: Province) -> OrderUnit {
        OrderUnit::new(UnitType::Fleet, loc(p))
    }

    // --- parsing ---

    #[test]
    fn parse_canonical_forms_roundtrip() {
        for text in [
            "A VIE H",
            "A PAR - BUR",
            "A LON - NWY VIA",
            "F NRG - STP/NC",
            "A MUN S F KIE",
            "A MUN S F KIE - BER",
            "F MAO C A BRE - LON",
            "A SER R ALB",
            "F TRI D",
            "F STP/SC B",
            "WAIVE",
        ] {
            let order = parse_order(text).unwrap();
            assert_eq!(order.to_string(), text, "round-trip of {}", text);
        }
    }

    #[test]
    fn parse_is_tolerant_of_case_and_whitespace() {
        assert_eq!(
            parse_order("  a par  -  bur ").unwrap(),
            Order::Move {
                unit: army(Province::Par),
                dest: loc(Province::Bur),
                via_convoy: false,
            }
        );
        assert_eq!(
            parse_order("a mun s f kie h").unwrap(),
            Order::SupportHold { unit: army(Province::Mun), target: fleet(Province::Kie) }
        );
        assert_eq!(parse_order("a par waive").unwrap(), Order::Waive);
    }

    #[test]
    fn parse_rejects_malformed_text() {
        for text in ["", "A", "A PAR", "A PAR X", "A PAR -", "Q PAR H", "A XXX H", "A PAR - BUR EXTRA"] {
            assert!(parse_order(text).is_err(), "{:?} should not parse", text);
        }
    }

    // --- movement validation ---

    fn movement_state() -> GameState {
        let mut s = GameState::empty(Phase::initial());
        s.place_unit(Province::Par, Power::France, UnitType::Army, Coast::None);
        s.place_unit(Province::Bre, Power::France, UnitType::Fleet, Coast::None);
        s.place_unit(Province::Mun, Power::Germany, UnitType::Army, Coast::None);
        s
    }

    #[test]
    fn valid_move_and_wrong_owner() {
        let s = movement_state();
        let mv = Order::Move { unit: army(Province::Par), dest: loc(Province::Bur), via_convoy: false };
        assert!(validate_order(&mv, Power::France, &s));
        assert!(!validate_order(&mv, Power::Germany, &s));
    }

    #[test]
    fn fleet_needs_fleet_adjacency() {
        let s = movement_state();
        let good = Order::Move { unit: fleet(Province::Bre), dest: loc(Province::Mao), via_convoy: false };
        let bad = Order::Move { unit: fleet(Province::Bre), dest: loc(Province::Par), via_convoy: false };
        assert!(validate_order(&good, Power::France, &s));
        assert!(!validate_order(&bad, Power::France, &s));
    }

    #[test]
    fn army_convoy_attempt_is_valid() {
        let mut s = GameState::empty(Phase::initial());
        s.place_unit(Province::Lon, Power::England, UnitType::Army, Coast::None);
        let mv = Order::Move { unit: army(Province::Lon), dest: loc(Province::Nwy), via_convoy: true };
        assert!(validate_order(&mv, Power::England, &s));
        // Sea destination stays illegal regardless of convoys.
        let bad = Order::Move { unit: army(Province::Lon), dest: loc(Province::Nth), via_convoy: false };
        assert!(!validate_order(&bad, Power::England, &s));
    }

    #[test]
    fn support_requires_reachability() {
        let s = movement_state();
        let good = Order::SupportMove {
            unit: army(Province::Mun),
            target: army(Province::Par),
            dest: loc(Province::Bur),
        };
        assert!(validate_order(&good, Power::Germany, &s));
        let bad = Order::SupportMove {
            unit: army(Province::Mun),
            target: fleet(Province::Bre),
            dest: loc(Province::Gas),
        };
        assert!(!validate_order(&bad, Power::Germany, &s));
    }

    #[test]
    fn retreat_orders_rejected_during_movement() {
        let s = movement_state();
        let r = Order::Retreat { unit: army(Province::Par), dest: loc(Province::Bur) };
        assert!(!validate_order(&r, Power::France, &s));
    }

    // --- retreat validation ---

    #[test]
    fn retreat_validation_consults_dislodged_set() {
        let mut s = GameState::empty(Phase::new(Season::Spring, 1901, PhaseKind::Retreat));
        s.dislodged[Province::Ser as usize] = Some(DislodgedUnit {
            power: Power::Austria,
            unit_type: UnitType::Army,
            coast: Coast::None,
            retreat_options: vec![loc(Province::Alb)],
        });

        let r = Order::Retreat { unit: army(Province::Ser), dest: loc(Province::Alb) };
        assert!(validate_order(&r, Power::Austria, &s));
        assert!(!validate_order(&r, Power::Italy, &s));

        let d = Order::Disband { unit: army(Province::Ser) };
        assert!(validate_order(&d, Power::Austria, &s));

        let h = Order::Hold { unit: army(Province::Ser) };
        assert!(!validate_order(&h, Power::Austria, &s));
    }

    // --- adjustment validation ---

    fn winter_state() -> GameState {
        let mut s = GameState::empty(Phase::new(Season::Winter, 1901, PhaseKind::Adjustment));
        for p in [Province::Vie, Province::Bud, Province::Tri] {
            s.set_sc_owner(p, Some(Power::Austria));
        }
        s
    }

    #[test]
    fn build_needs_owned_open_home() {
        let s = winter_state();
        assert!(validate_order(
            &Order::Build { unit: army(Province::Vie) },
            Power::Austria,
            &s
        ));
        // Not Austria's home.
        assert!(!validate_order(
            &Order::Build { unit: army(Province::Ber) },
            Power::Austria,
            &s
        ));
        // Fleet in an inland home is impossible.
        assert!(!validate_order(
            &Order::Build { unit: fleet(Province::Vie) },
            Power::Austria,
            &s
        ));
    }

    #[test]
    fn fleet_build_on_split_coast_needs_coast() {
        let mut s = GameState::empty(Phase::new(Season::Winter, 1901, PhaseKind::Adjustment));
        s.set_sc_owner(Province::Stp, Some(Power::Russia));

        let no_coast = Order::Build { unit: fleet(Province::Stp) };
        assert!(!validate_order(&no_coast, Power::Russia, &s));

        let with_coast = Order::Build {
            unit: OrderUnit::new(UnitType::Fleet, Loc::with_coast(Province::Stp, Coast::North)),
        };
        assert!(validate_order(&with_coast, Power::Russia, &s));
    }

    // --- normalization ---

    #[test]
    fn normalize_fixes_unit_type_and_coast() {
        let mut s = movement_state();
        s.remove_unit(Province::Bre);
        s.place_unit(Province::Stp, Power::Russia, UnitType::Fleet, Coast::South);

        // Submitted as an army at a bare loc; the board says fleet on STP/SC.
        let sloppy = Order::Hold { unit: army(Province::Stp) };
        let fixed = normalize_order(sloppy, &s);
        assert_eq!(
            fixed,
            Order::Hold {
                unit: OrderUnit::new(UnitType::Fleet, Loc::with_coast(Province::Stp, Coast::South)),
            }
        );
    }

    #[test]
    fn normalize_marks_nonadjacent_army_moves_via() {
        let mut s = GameState::empty(Phase::initial());
        s.place_unit(Province::Lon, Power::England, UnitType::Army, Coast::None);
        let mv = parse_order("A LON - NWY").unwrap();
        match normalize_order(mv, &s) {
            Order::Move { via_convoy, .. } => assert!(via_convoy),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn normalize_picks_unique_destination_coast() {
        let mut s = GameState::empty(Phase::initial());
        s.place_unit(Province::Gol, Power::France, UnitType::Fleet, Coast::None);
        let mv = parse_order("F GOL - SPA").unwrap();
        match normalize_order(mv, &s) {
            Order::Move { dest, .. } => {
                assert_eq!(dest, Loc::with_coast(Province::Spa, Coast::South))
            }
            other => panic!("unexpected {:?}", other),
        }

        // From MAO both coasts are reachable; the order is left untouched.
        let mut s = GameState::empty(Phase::initial());
        s.place_unit(Province::Mao, Power::France, UnitType::Fleet, Coast::None);
        let mv = parse_order("F MAO - SPA").unwrap();
        match normalize_order(mv, &s) {
            Order::Move { dest, .. } => assert_eq!(dest, loc(Province::Spa)),
            other => panic!("unexpected {:?}", other),
        }
    }
}
