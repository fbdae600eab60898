//! Movement-phase adjudication.
//!
//! Guess-and-check constraint resolution: every order starts unresolved;
//! resolving an order may recursively resolve the orders it depends on.
//! When the recursion closes a cycle, the resolver guesses an outcome for
//! the cycle root, checks the guess for consistency, and retries with the
//! opposite guess. A cycle with two consistent outcomes is circular
//! movement (everything moves); a cycle with none is a convoy paradox and
//! falls back to the Szykman convention: every convoyed move in the cycle
//! fails. The result is a fixed point that does not depend on the order
//! in which orders were submitted.
//!
//! Strength arithmetic follows the classic rules: base 1 plus uncut
//! supports, supports of the defender's own power never help dislodge it,
//! a power cannot dislodge its own unit, and two units swapping places
//! over land bounce unless one side is strictly stronger.

use tracing::debug;

use crate::board::adjacency::is_adjacent;
use crate::board::loc::Loc;
use crate::board::order::Order;
use crate::board::province::{Coast, Power, Province, Terrain, ALL_PROVINCES, PROVINCE_COUNT};
use crate::board::state::{DislodgedUnit, GameState};
use crate::board::unit::UnitType;

/// The terminal status of one adjudicated order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderResult {
    Succeeded,
    /// A move that did not go through.
    Bounced,
    /// A support that was cut or lost its supporter.
    Cut,
    /// A convoy that failed or an order voided by dislodgement.
    Failed,
    /// The unit was forced out of its province.
    Dislodged,
}

/// A resolved order paired with its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOrder {
    pub order: Order,
    pub power: Power,
    pub result: OrderResult,
}

/// A unit forced to retreat, with the province its attacker came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dislodgement {
    pub power: Power,
    pub unit_type: UnitType,
    pub province: Province,
    pub coast: Coast,
    pub attacker_from: Province,
}

/// Everything the movement solver reports for one phase.
#[derive(Debug, Clone)]
pub struct MovementOutcome {
    pub resolved: Vec<ResolvedOrder>,
    pub dislodged: Vec<Dislodgement>,
    /// Provinces where a move bounced; barred to retreats.
    pub contested: Vec<Province>,
    /// True if the Szykman fallback fired at least once.
    pub paradox: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResState {
    Unresolved,
    Guessing,
    Resolved,
}

/// Internal bookkeeping for one order.
#[derive(Debug, Clone, Copy)]
struct Entry {
    order: Order,
    power: Power,
    res_state: ResState,
    resolution: bool,
    /// Province of the issuing unit.
    prov: Province,
    /// Destination province for moves.
    target: Option<Province>,
    /// Supported/convoyed unit's province.
    aux: Option<Province>,
    /// Supported move's / convoy's destination province.
    aux_target: Option<Province>,
    /// True for moves that must travel by convoy.
    via: bool,
}

/// Adjudicates one set of movement orders against a board state.
///
/// Every unit on the board is expected to carry exactly one order (the
/// caller substitutes holds for missing or invalid submissions). The
/// outcome is deterministic and independent of slice order.
pub fn resolve_movement(orders: &[(Order, Power)], state: &GameState) -> MovementOutcome {
    Resolver::new(orders, state).run()
}

struct Resolver<'a> {
    state: &'a GameState,
    entries: Vec<Entry>,
    /// Province index -> entry index.
    lookup: [i16; PROVINCE_COUNT],
    dep_stack: Vec<usize>,
    paradox: bool,
}

impl<'a> Resolver<'a> {
    fn new(orders: &[(Order, Power)], state: &'a GameState) -> Self {
        let mut entries = Vec::with_capacity(orders.len());
        let mut lookup = [-1i16; PROVINCE_COUNT];

        for (order, power) in orders {
            let unit = match order.unit() {
                Some(u) => u,
                None => continue,
            };
            let prov = unit.loc.province;
            let (target, aux, aux_target, via) = match *order {
                Order::Move { dest, via_convoy, .. } => {
                    let via = via_convoy
                        || (unit.unit_type == UnitType::Army
                            && !is_adjacent(unit.loc, dest, false));
                    (Some(dest.province), None, None, via)
                }
                Order::SupportHold { target, .. } => {
                    (None, Some(target.loc.province), None, false)
                }
                Order::SupportMove { target, dest, .. } => {
                    (None, Some(target.loc.province), Some(dest.province), false)
                }
                Order::Convoy { army, dest, .. } => {
                    (None, Some(army.province), Some(dest.province), false)
                }
                _ => (None, None, None, false),
            };
            // One order per province; a later submission overrides.
            if lookup[prov as usize] >= 0 {
                entries[lookup[prov as usize] as usize] = Entry {
                    order: *order,
                    power: *power,
                    res_state: ResState::Unresolved,
                    resolution: false,
                    prov,
                    target,
                    aux,
                    aux_target,
                    via,
                };
                continue;
            }
            lookup[prov as usize] = entries.len() as i16;
            entries.push(Entry {
                order: *order,
                power: *power,
                res_state: ResState::Unresolved,
                resolution: false,
                prov,
                target,
                aux,
                aux_target,
                via,
            });
        }

        Resolver {
            state,
            entries,
            lookup,
            dep_stack: Vec::new(),
            paradox: false,
        }
    }

    fn run(mut self) -> MovementOutcome {
        // Adjudicate in province order so nothing depends on input order.
        let mut ids: Vec<usize> = (0..self.entries.len()).collect();
        ids.sort_by_key(|&i| self.entries[i].prov as u8);
        for id in ids {
            self.resolve(id);
            debug_assert!(self.dep_stack.is_empty());
        }
        self.build_outcome()
    }

    fn id_at(&self, prov: Province) -> Option<usize> {
        let idx = self.lookup[prov as usize];
        if idx < 0 {
            None
        } else {
            Some(idx as usize)
        }
    }

    /// Resolves the order with the given id, guessing through cycles.
    fn resolve(&mut self, id: usize) -> bool {
        match self.entries[id].res_state {
            ResState::Resolved => return self.entries[id].resolution,
            ResState::Guessing => {
                if !self.dep_stack.contains(&id) {
                    self.dep_stack.push(id);
                }
                return self.entries[id].resolution;
            }
            ResState::Unresolved => {}
        }

        let old_len = self.dep_stack.len();
        self.entries[id].res_state = ResState::Guessing;
        self.entries[id].resolution = false;
        let first = self.adjudicate(id);

        if self.dep_stack.len() == old_len {
            // Did not touch any guess: the result is final.
            if self.entries[id].res_state != ResState::Resolved {
                self.entries[id].res_state = ResState::Resolved;
                self.entries[id].resolution = first;
            }
            return self.entries[id].resolution;
        }

        if self.dep_stack[old_len] != id {
            // Depends on someone else's guess; propagate and let the
            // cycle root sort it out.
            if !self.dep_stack.contains(&id) {
                self.dep_stack.push(id);
            }
            self.entries[id].resolution = first;
            return first;
        }

        // This order is the root of a dependency cycle. Retry with the
        // opposite guess.
        self.unwind(old_len);
        self.entries[id].res_state = ResState::Guessing;
        self.entries[id].resolution = true;
        let second = self.adjudicate(id);

        if first == second {
            // The cycle has a unique outcome regardless of the guess.
            self.unwind(old_len);
            self.entries[id].res_state = ResState::Resolved;
            self.entries[id].resolution = first;
            return first;
        }

        // Two consistent outcomes (circular movement) or none (paradox).
        let mut cycle: Vec<usize> = self.dep_stack[old_len..].to_vec();
        if !cycle.contains(&id) {
            cycle.push(id);
        }
        self.dep_stack.truncate(old_len);
        self.apply_backup_rule(&cycle);
        self.resolve(id)
    }

    /// Resets every order guessed past `from` back to unresolved.
    fn unwind(&mut self, from: usize) {
        for &d in &self.dep_stack[from..] {
            self.entries[d].res_state = ResState::Unresolved;
        }
        self.dep_stack.truncate(from);
    }

    /// Decides a dependency cycle that guessing cannot settle.
    ///
    /// A cycle of moves is circular movement: all of them succeed (a
    /// convoyed move may ride along, as in a two-unit swap by convoy).
    /// A cycle that runs through a convoy order is a paradox, decided by
    /// the Szykman rule: the convoyed moves and the convoys carrying
    /// them fail, everything else is re-resolved from scratch.
    fn apply_backup_rule(&mut self, cycle: &[usize]) {
        let convoy_involved = cycle
            .iter()
            .any(|&i| matches!(self.entries[i].order, Order::Convoy { .. }));

        if convoy_involved {
            self.paradox = true;
            debug!(members = cycle.len(), "convoy paradox, applying Szykman rule");
            for &i in cycle {
                let e = &mut self.entries[i];
                if matches!(e.order, Order::Convoy { .. }) || e.via {
                    e.res_state = ResState::Resolved;
                    e.resolution = false;
                } else {
                    e.res_state = ResState::Unresolved;
                }
            }
        } else {
            debug!(members = cycle.len(), "move cycle, circular movement succeeds");
            for &i in cycle {
                let e = &mut self.entries[i];
                if matches!(e.order, Order::Move { .. }) {
                    e.res_state = ResState::Resolved;
                    e.resolution = true;
                } else {
                    e.res_state = ResState::Unresolved;
                }
            }
        }
    }

    /// The decision function: does this order achieve its effect?
    fn adjudicate(&mut self, id: usize) -> bool {
        match self.entries[id].order {
            Order::Hold { .. } => true,
            Order::Move { .. } => self.move_succeeds(id),
            Order::SupportHold { .. } | Order::SupportMove { .. } => self.support_given(id),
            Order::Convoy { .. } => self.convoy_survives(id),
            _ => false,
        }
    }

    fn move_succeeds(&mut self, id: usize) -> bool {
        let e = self.entries[id];
        let target = match e.target {
            Some(t) => t,
            None => return false,
        };

        if e.via && !self.convoy_path_exists(id) {
            return false;
        }

        let attack = self.attack_strength(id);

        // Head-to-head: the opposing move defends with its full support.
        if let Some(opp) = self.head_to_head_opponent(id) {
            if attack <= self.defend_strength(opp) {
                return false;
            }
        } else if attack <= self.hold_strength(target) {
            return false;
        }

        // Every other unit moving to the same destination must be beaten.
        for other in 0..self.entries.len() {
            if other == id {
                continue;
            }
            let o = self.entries[other];
            if matches!(o.order, Order::Move { .. }) && o.target == Some(target) {
                if attack <= self.prevent_strength(other) {
                    return false;
                }
            }
        }
        true
    }

    /// The non-convoyed move opposing this one, if both are direct.
    fn head_to_head_opponent(&self, id: usize) -> Option<usize> {
        let e = &self.entries[id];
        if e.via {
            return None;
        }
        let target = e.target?;
        let opp_id = self.id_at(target)?;
        let o = &self.entries[opp_id];
        if matches!(o.order, Order::Move { .. }) && !o.via && o.target == Some(e.prov) {
            Some(opp_id)
        } else {
            None
        }
    }

    fn attack_strength(&mut self, id: usize) -> i32 {
        let e = self.entries[id];
        let target = match e.target {
            Some(t) => t,
            None => return 0,
        };

        if e.via && !self.convoy_path_exists(id) {
            return 0;
        }

        // Is the destination being vacated? A head-to-head opponent never
        // vacates; a convoyed occupant can swap out even toward us.
        let occupant = self.state.units[target as usize];
        let vacated = if occupant.is_some() {
            match self.id_at(target) {
                Some(occ_id) => {
                    let o = self.entries[occ_id];
                    let leaves = matches!(o.order, Order::Move { .. })
                        && (o.target != Some(e.prov) || o.via || e.via);
                    leaves && self.resolve(occ_id)
                }
                None => false,
            }
        } else {
            true
        };

        if vacated {
            return 1 + self.count_move_supports(id, None);
        }

        let (occ_power, _) = match occupant {
            Some(p) => p,
            None => return 1 + self.count_move_supports(id, None),
        };
        if occ_power == e.power {
            // A power never dislodges its own unit.
            return 0;
        }
        // Supports from the defender's power do not help dislodge it.
        1 + self.count_move_supports(id, Some(occ_power))
    }

    fn defend_strength(&mut self, id: usize) -> i32 {
        1 + self.count_move_supports(id, None)
    }

    fn prevent_strength(&mut self, id: usize) -> i32 {
        let e = self.entries[id];
        if e.via && !self.convoy_path_exists(id) {
            return 0;
        }
        // The loser of a head-to-head battle no longer blocks the province.
        if let Some(opp) = self.head_to_head_opponent(id) {
            if self.resolve(opp) {
                return 0;
            }
        }
        1 + self.count_move_supports(id, None)
    }

    /// Uncut supports for the move at `id`, optionally ignoring a power.
    fn count_move_supports(&mut self, id: usize, exclude: Option<Power>) -> i32 {
        let e = self.entries[id];
        let target = e.target;
        let mut count = 0;
        for s in 0..self.entries.len() {
            let se = self.entries[s];
            if !matches!(se.order, Order::SupportMove { .. }) {
                continue;
            }
            if se.aux != Some(e.prov) || se.aux_target != target {
                continue;
            }
            if Some(se.power) == exclude {
                continue;
            }
            if self.resolve(s) {
                count += 1;
            }
        }
        count
    }

    fn hold_strength(&mut self, prov: Province) -> i32 {
        if self.state.units[prov as usize].is_none() {
            return 0;
        }
        let id = match self.id_at(prov) {
            Some(id) => id,
            // An occupied province with no order defends itself alone.
            None => return 1,
        };
        if matches!(self.entries[id].order, Order::Move { .. }) {
            return if self.resolve(id) { 0 } else { 1 };
        }

        let mut strength = 1;
        for s in 0..self.entries.len() {
            let se = self.entries[s];
            if !matches!(se.order, Order::SupportHold { .. }) {
                continue;
            }
            if se.aux != Some(prov) {
                continue;
            }
            if self.resolve(s) {
                strength += 1;
            }
        }
        strength
    }

    /// Is the support at `id` actually given? Cut by any hostile attack on
    /// the supporter with a workable path, except from the province the
    /// support is directed into; voided outright if the supporter is
    /// dislodged, even by an attack from that province.
    fn support_given(&mut self, id: usize) -> bool {
        let e = self.entries[id];
        let directed_at = match e.order {
            Order::SupportMove { .. } => e.aux_target,
            Order::SupportHold { .. } => e.aux,
            _ => None,
        };

        for m in 0..self.entries.len() {
            let me = self.entries[m];
            if !matches!(me.order, Order::Move { .. }) || me.target != Some(e.prov) {
                continue;
            }
            if me.power == e.power {
                continue;
            }
            if Some(me.prov) == directed_at {
                // Not cut from the target province, but a successful
                // attack from there still dislodges the supporter.
                if self.resolve(m) {
                    return false;
                }
                continue;
            }
            if self.path_ok(m) {
                return false;
            }
        }
        true
    }

    /// A convoying fleet keeps its chain alive while it is not dislodged.
    fn convoy_survives(&mut self, id: usize) -> bool {
        let prov = self.entries[id].prov;
        for m in 0..self.entries.len() {
            let me = self.entries[m];
            if matches!(me.order, Order::Move { .. }) && me.target == Some(prov) {
                if self.resolve(m) {
                    return false;
                }
            }
        }
        true
    }

    /// A move's path works if it is direct, or some convoy chain exists.
    fn path_ok(&mut self, id: usize) -> bool {
        if !self.entries[id].via {
            return true;
        }
        self.convoy_path_exists(id)
    }

    /// BFS across convoy orders matching this move whose fleets survive.
    fn convoy_path_exists(&mut self, id: usize) -> bool {
        let e = self.entries[id];
        let (src, dst) = match (Some(e.prov), e.target) {
            (Some(s), Some(d)) => (s, d),
            _ => return false,
        };

        let matching: Vec<usize> = (0..self.entries.len())
            .filter(|&c| {
                let ce = &self.entries[c];
                matches!(ce.order, Order::Convoy { .. })
                    && ce.aux == Some(src)
                    && ce.aux_target == Some(dst)
                    && ce.prov.terrain() == Terrain::Sea
            })
            .collect();

        let mut visited = [false; PROVINCE_COUNT];
        let mut queue: Vec<Province> = Vec::new();

        for &c in &matching {
            let sea = self.entries[c].prov;
            if !visited[sea as usize]
                && is_adjacent(Loc::new(src), Loc::new(sea), true)
                && self.resolve(c)
            {
                visited[sea as usize] = true;
                queue.push(sea);
            }
        }

        while let Some(sea) = queue.pop() {
            if is_adjacent(Loc::new(sea), Loc::new(dst), true) {
                return true;
            }
            for &c in &matching {
                let next = self.entries[c].prov;
                if !visited[next as usize]
                    && is_adjacent(Loc::new(sea), Loc::new(next), true)
                    && self.resolve(c)
                {
                    visited[next as usize] = true;
                    queue.push(next);
                }
            }
        }
        false
    }

    /// Translates final resolutions into the reported outcome.
    fn build_outcome(mut self) -> MovementOutcome {
        // Destination -> origin of each successful move.
        let mut moved_in_from: [Option<Province>; PROVINCE_COUNT] = [None; PROVINCE_COUNT];
        for e in &self.entries {
            if matches!(e.order, Order::Move { .. }) && e.resolution {
                if let Some(t) = e.target {
                    moved_in_from[t as usize] = Some(e.prov);
                }
            }
        }

        let mut contested = Vec::new();
        let ids: Vec<usize> = {
            let mut v: Vec<usize> = (0..self.entries.len()).collect();
            v.sort_by_key(|&i| self.entries[i].prov as u8);
            v
        };
        for &id in &ids {
            let e = self.entries[id];
            if matches!(e.order, Order::Move { .. }) && !e.resolution {
                // A standoff only contests the province if the attack
                // actually arrived; a convoyed move with no chain never
                // threatened it.
                if self.final_path_ok(id) {
                    if let Some(t) = e.target {
                        if !contested.contains(&t) {
                            contested.push(t);
                        }
                    }
                }
            }
        }

        let mut resolved = Vec::new();
        let mut dislodged = Vec::new();
        for &id in &ids {
            let e = self.entries[id];
            let mut result = match e.order {
                Order::Hold { .. } => OrderResult::Succeeded,
                Order::Move { .. } => {
                    if e.resolution {
                        OrderResult::Succeeded
                    } else {
                        OrderResult::Bounced
                    }
                }
                Order::SupportHold { .. } | Order::SupportMove { .. } => {
                    if e.resolution {
                        OrderResult::Succeeded
                    } else {
                        OrderResult::Cut
                    }
                }
                Order::Convoy { .. } => {
                    if e.resolution {
                        OrderResult::Succeeded
                    } else {
                        OrderResult::Failed
                    }
                }
                _ => OrderResult::Failed,
            };

            if let Some(attacker_from) = moved_in_from[e.prov as usize] {
                let moved_out = matches!(e.order, Order::Move { .. }) && e.resolution;
                if !moved_out {
                    result = OrderResult::Dislodged;
                    let (unit_type, coast) = match e.order.unit() {
                        Some(u) => (u.unit_type, u.loc.coast),
                        None => (UnitType::Army, Coast::None),
                    };
                    dislodged.push(Dislodgement {
                        power: e.power,
                        unit_type,
                        province: e.prov,
                        coast,
                        attacker_from,
                    });
                }
            }

            resolved.push(ResolvedOrder {
                order: e.order,
                power: e.power,
                result,
            });
        }

        // A unit the caller left orderless still defends its province
        // and can be forced out.
        for prov in ALL_PROVINCES {
            if self.lookup[prov as usize] >= 0 {
                continue;
            }
            if let (Some((power, unit_type)), Some(attacker_from)) =
                (self.state.units[prov as usize], moved_in_from[prov as usize])
            {
                let coast = self.state.fleet_coast[prov as usize].unwrap_or(Coast::None);
                dislodged.push(Dislodgement {
                    power,
                    unit_type,
                    province: prov,
                    coast,
                    attacker_from,
                });
            }
        }

        MovementOutcome {
            resolved,
            dislodged,
            contested,
            paradox: self.paradox,
        }
    }

    /// Path check against final resolutions only (no guessing left).
    fn final_path_ok(&mut self, id: usize) -> bool {
        self.path_ok(id)
    }
}

/// Applies a movement outcome to the board: removes dislodged units
/// (recording their legal retreat destinations), executes successful
/// moves, and marks contested provinces.
pub fn apply_movement(state: &mut GameState, outcome: &MovementOutcome) {
    // Dislodged units leave the board first so incoming moves can land.
    for d in &outcome.dislodged {
        state.remove_unit(d.province);
    }

    for ro in &outcome.resolved {
        if ro.result != OrderResult::Succeeded {
            continue;
        }
        if let Order::Move { unit, dest, .. } = ro.order {
            let src = unit.loc.province;
            let dst = dest.province;
            if let Some(u) = state.units[src as usize].take() {
                state.units[dst as usize] = Some(u);
                state.influence[dst as usize] = Some(u.0);
            }
            state.fleet_coast[src as usize] = None;
            state.fleet_coast[dst as usize] = if dest.coast != Coast::None {
                Some(dest.coast)
            } else {
                None
            };
        }
    }

    state.contested = [false; PROVINCE_COUNT];
    for prov in &outcome.contested {
        state.contested[*prov as usize] = true;
    }

    for d in &outcome.dislodged {
        let options = retreat_options(state, d);
        state.dislodged[d.province as usize] = Some(DislodgedUnit {
            power: d.power,
            unit_type: d.unit_type,
            coast: d.coast,
            retreat_options: options,
        });
    }
}

/// Legal retreat destinations: adjacent for the unit type, unoccupied,
/// not contested by a bounce, and not the attacker's province of origin.
fn retreat_options(state: &GameState, d: &Dislodgement) -> Vec<Loc> {
    let from = Loc::with_coast(d.province, d.coast);
    let is_fleet = d.unit_type == UnitType::Fleet;
    let mut options = Vec::new();

    for dest in ALL_PROVINCES {
        if dest == d.province || dest == d.attacker_from {
            continue;
        }
        if state.units[dest as usize].is_some() || state.contested[dest as usize] {
            continue;
        }
        if !d.unit_type.can_occupy(dest.terrain()) {
            continue;
        }
        if is_fleet && dest.has_coasts() {
            for coast in crate::board::adjacency::fleet_dest_coasts(from, dest) {
                options.push(Loc::with_coast(dest, coast));
            }
        } else if is_adjacent(from, Loc::new(dest), is_fleet) {
            options.push(Loc::new(dest));
        }
    }
    options
}
