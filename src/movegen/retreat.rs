//! Retreat-phase order enumeration.
//!
//! Dislodged units carry their legal destinations, fixed at movement
//! resolution; the options here are exactly those plus a disband.

use crate::board::loc::Loc;
use crate::board::order::Order;
use crate::board::province::ALL_PROVINCES;
use crate::board::state::GameState;
use crate::board::unit::OrderUnit;

/// Legal orders per dislodged unit, keyed by the unit's location.
pub fn legal_retreats(state: &GameState) -> Vec<(Loc, Vec<Order>)> {
    let mut out = Vec::new();
    for prov in ALL_PROVINCES {
        let d = match &state.dislodged[prov as usize] {
            Some(d) => d,
            None => continue,
        };
        let loc = Loc::with_coast(prov, d.coast);
        let unit = OrderUnit::new(d.unit_type, loc);

        let mut orders: Vec<Order> = d
            .retreat_options
            .iter()
            .map(|dest| Order::Retreat { unit, dest: *dest })
            .collect();
        orders.push(Order::Disband { unit });
        out.push((loc, orders));
    }
    out
}
