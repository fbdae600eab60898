//! Movement-phase order enumeration.
//!
//! For the unit at a province: hold, adjacent moves (coast-aware for
//! fleets), convoyed moves through currently occupied seas, supports for
//! every other unit whose position or destination this unit can reach,
//! and convoy orders for fleets on sea provinces.

use crate::board::adjacency::{fleet_dest_coasts, neighbors};
use crate::board::loc::Loc;
use crate::board::order::Order;
use crate::board::province::{Coast, Province, Terrain, ALL_PROVINCES, PROVINCE_COUNT};
use crate::board::state::GameState;
use crate::board::unit::{OrderUnit, UnitType};

/// All legal movement-phase orders for the unit at `province`.
///
/// Returns an empty vec when the province is unoccupied.
pub fn legal_orders(province: Province, state: &GameState) -> Vec<Order> {
    let (_, unit_type) = match state.units[province as usize] {
        Some(pu) => pu,
        None => return Vec::new(),
    };
    let loc = match state.unit_loc(province) {
        Some(l) => l,
        None => return Vec::new(),
    };
    let is_fleet = unit_type == UnitType::Fleet;
    let unit = OrderUnit::new(unit_type, loc);

    let mut orders = vec![Order::Hold { unit }];

    // Adjacent moves.
    let move_targets = move_targets(loc, unit_type);
    for dest in &move_targets {
        orders.push(Order::Move { unit, dest: *dest, via_convoy: false });
    }

    // Convoyed moves for coastal armies.
    if unit_type == UnitType::Army && province.terrain() == Terrain::Coastal {
        let (_, dests) = convoy_reach(province, state);
        for dest in dests {
            orders.push(Order::Move {
                unit,
                dest: Loc::new(dest),
                via_convoy: true,
            });
        }
    }

    generate_supports(province, unit, state, &move_targets, &mut orders);

    if is_fleet && province.terrain() == Terrain::Sea {
        generate_convoys(province, unit, state, &mut orders);
    }

    orders
}

/// Destination locations reachable by a direct move.
fn move_targets(loc: Loc, unit_type: UnitType) -> Vec<Loc> {
    let is_fleet = unit_type == UnitType::Fleet;
    let mut targets = Vec::new();
    for dest in neighbors(loc, is_fleet) {
        if !unit_type.can_occupy(dest.terrain()) {
            continue;
        }
        if is_fleet && dest.has_coasts() {
            for coast in fleet_dest_coasts(loc, dest) {
                targets.push(Loc::with_coast(dest, coast));
            }
        } else {
            targets.push(Loc::new(dest));
        }
    }
    targets
}

/// Support-hold for any reachable unit; support-move for any destination
/// both this unit and the supported unit can reach.
fn generate_supports(
    province: Province,
    unit: OrderUnit,
    state: &GameState,
    move_targets: &[Loc],
    orders: &mut Vec<Order>,
) {
    let reachable: Vec<Province> = move_targets.iter().map(|l| l.province).collect();

    for other_prov in ALL_PROVINCES {
        if other_prov == province {
            continue;
        }
        let (_, other_type) = match state.units[other_prov as usize] {
            Some(pu) => pu,
            None => continue,
        };
        let other_loc = match state.unit_loc(other_prov) {
            Some(l) => l,
            None => continue,
        };
        let target = OrderUnit::new(other_type, other_loc);

        if reachable.contains(&other_prov) {
            orders.push(Order::SupportHold { unit, target });
        }

        for dest in neighbors(other_loc, other_type == UnitType::Fleet) {
            if dest == province || !other_type.can_occupy(dest.terrain()) {
                continue;
            }
            if reachable.contains(&dest) {
                orders.push(Order::SupportMove {
                    unit,
                    target,
                    dest: Loc::new(dest),
                });
            }
        }
    }
}

/// Convoy orders for a fleet on a sea province: one per coastal army and
/// reachable destination, provided this fleet's sea can take part in a
/// chain from that army.
fn generate_convoys(
    province: Province,
    unit: OrderUnit,
    state: &GameState,
    orders: &mut Vec<Order>,
) {
    for army_prov in ALL_PROVINCES {
        if army_prov.terrain() != Terrain::Coastal {
            continue;
        }
        if !matches!(state.units[army_prov as usize], Some((_, UnitType::Army))) {
            continue;
        }
        let (seas, dests) = convoy_reach(army_prov, state);
        if !seas.contains(&province) {
            continue;
        }
        for dest in dests {
            orders.push(Order::Convoy {
                unit,
                army: Loc::new(army_prov),
                dest: Loc::new(dest),
            });
        }
    }
}

/// BFS from a coastal province through seas currently occupied by fleets.
///
/// Returns the seas a convoy chain from there could run through and the
/// coastal provinces such a chain could land on.
pub fn convoy_reach(from: Province, state: &GameState) -> (Vec<Province>, Vec<Province>) {
    let mut seas = Vec::new();
    let mut dests = Vec::new();
    let mut visited = [false; PROVINCE_COUNT];
    let mut queue: Vec<Province> = Vec::new();

    let fleet_occupied_sea = |p: Province| {
        p.terrain() == Terrain::Sea
            && matches!(state.units[p as usize], Some((_, UnitType::Fleet)))
    };

    for sea in neighbors(Loc::new(from), true) {
        if fleet_occupied_sea(sea) && !visited[sea as usize] {
            visited[sea as usize] = true;
            queue.push(sea);
        }
    }
    while let Some(sea) = queue.pop() {
        seas.push(sea);
        for next in neighbors(Loc::new(sea), true) {
            if fleet_occupied_sea(next) {
                if !visited[next as usize] {
                    visited[next as usize] = true;
                    queue.push(next);
                }
            } else if next.terrain() == Terrain::Coastal
                && next != from
                && !dests.contains(&next)
            {
                dests.push(next);
            }
        }
    }
    seas.sort();
    dests.sort();
    (seas, dests)
}
