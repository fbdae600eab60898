//! The top-level game aggregate.
//!
//! A `Game` owns the current mutable state, staged orders for the open
//! phase, and ordered histories of states, orders, messages, and logs
//! keyed by phase. `process()` archives the open phase, runs the solver
//! for its kind, installs the successor state, and advances the phase.
//! Histories are value snapshots: once archived a state never changes,
//! and rollback produces an independent copy.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, warn};

use crate::board::loc::Loc;
use crate::board::order::Order;
use crate::board::phase::{Phase, PhaseKind, Season};
use crate::board::province::{Power, ALL_POWERS, ALL_PROVINCES, POWER_COUNT, PROVINCE_COUNT};
use crate::board::state::GameState;
use crate::clock::{Clock, SystemClock};
use crate::error::GameError;
use crate::movegen;
use crate::protocol::orders::{normalize_order, parse_order, validate_order};
use crate::resolve;

/// A free-form message between two powers, stored under the phase it was
/// sent in and keyed by its timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: Power,
    pub recipient: Power,
    pub body: String,
    pub time_sent: u64,
}

/// One submitted order: the text as given, the parse if any, and whether
/// it validated against the board. Invalid submissions are kept for the
/// record and adjudicated as holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedOrder {
    pub raw: String,
    pub order: Option<Order>,
    pub valid: bool,
}

/// A complete Diplomacy game: current state plus replayable history.
#[derive(Clone)]
pub struct Game {
    pub game_id: String,
    rules: Vec<String>,
    state: GameState,
    staged: BTreeMap<Power, Vec<StagedOrder>>,
    state_history: BTreeMap<Phase, GameState>,
    order_history: BTreeMap<Phase, BTreeMap<Power, Vec<String>>>,
    message_history: BTreeMap<Phase, BTreeMap<u64, Message>>,
    log_history: BTreeMap<Phase, Vec<String>>,
    draw_on_stalemate_years: i32,
    exception_on_convoy_paradox: bool,
    possible_orders: Option<BTreeMap<Loc, Vec<Order>>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("game_id", &self.game_id)
            .field("phase", &self.state.phase.short())
            .field("archived_phases", &self.state_history.len())
            .finish()
    }
}

impl PartialEq for Game {
    /// Structural equality over everything a snapshot carries; the
    /// injected clock, configuration knobs, and memoized caches are not
    /// part of a game's identity.
    fn eq(&self, other: &Self) -> bool {
        self.game_id == other.game_id
            && self.rules == other.rules
            && self.state == other.state
            && self.state_history == other.state_history
            && self.order_history == other.order_history
            && self.message_history == other.message_history
            && self.log_history == other.log_history
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

impl Game {
    /// A fresh standard game at spring 1901 with a random id.
    pub fn new() -> Self {
        let mut rng = SmallRng::from_entropy();
        let game_id: String = (&mut rng)
            .sample_iter(Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        Game::with_id(game_id)
    }

    /// A fresh standard game under the given id.
    pub fn with_id(game_id: impl Into<String>) -> Self {
        Game {
            game_id: game_id.into(),
            rules: vec!["NO_PRESS".to_string(), "POWER_CHOICE".to_string()],
            state: GameState::initial(),
            staged: BTreeMap::new(),
            state_history: BTreeMap::new(),
            order_history: BTreeMap::new(),
            message_history: BTreeMap::new(),
            log_history: BTreeMap::new(),
            draw_on_stalemate_years: -1,
            exception_on_convoy_paradox: false,
            possible_orders: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Swaps the time source used for message timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // --- accessors ---

    pub fn map_name(&self) -> &'static str {
        "standard"
    }

    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    pub fn current_phase(&self) -> Phase {
        self.state.phase
    }

    pub fn phase_type(&self) -> char {
        self.state.phase.kind.letter()
    }

    pub fn get_state(&self) -> &GameState {
        &self.state
    }

    pub fn get_state_history(&self) -> &BTreeMap<Phase, GameState> {
        &self.state_history
    }

    pub fn get_order_history(&self) -> &BTreeMap<Phase, BTreeMap<Power, Vec<String>>> {
        &self.order_history
    }

    pub fn get_message_history(&self) -> &BTreeMap<Phase, BTreeMap<u64, Message>> {
        &self.message_history
    }

    pub fn get_log_history(&self) -> &BTreeMap<Phase, Vec<String>> {
        &self.log_history
    }

    pub fn get_staged_orders(&self) -> &BTreeMap<Power, Vec<StagedOrder>> {
        &self.staged
    }

    /// The most recently archived movement-phase state, if any.
    pub fn get_last_movement_phase(&self) -> Option<&GameState> {
        self.state_history
            .values()
            .rev()
            .find(|s| s.phase.kind == PhaseKind::Movement)
    }

    /// The phase after `from` in this game's line, the open phase
    /// counting as the tail.
    pub fn get_next_phase(&self, from: Phase) -> Option<Phase> {
        self.phase_line().into_iter().find(|p| *p > from)
    }

    /// The phase before `from` in this game's line.
    pub fn get_prev_phase(&self, from: Phase) -> Option<Phase> {
        self.phase_line().into_iter().rev().find(|p| *p < from)
    }

    fn phase_line(&self) -> Vec<Phase> {
        let mut line: Vec<Phase> = self.state_history.keys().copied().collect();
        line.push(self.state.phase);
        line
    }

    // --- configuration ---

    pub fn set_draw_on_stalemate_years(&mut self, years: i32) {
        self.draw_on_stalemate_years = years;
    }

    pub fn set_exception_on_convoy_paradox(&mut self) {
        self.exception_on_convoy_paradox = true;
    }

    // --- order staging ---

    /// Replaces the staged orders of one power for the open phase.
    ///
    /// Each string is parsed tolerantly and validated against the board;
    /// failures are kept with the validity flag cleared rather than
    /// rejected, so the archived record matches what was submitted.
    pub fn set_orders<S: AsRef<str>>(
        &mut self,
        power: &str,
        orders: &[S],
    ) -> Result<(), GameError> {
        let power = Power::from_name(power).ok_or_else(|| GameError::Lookup {
            kind: "power",
            value: power.to_string(),
        })?;

        let staged = orders
            .iter()
            .map(|raw| {
                let raw = raw.as_ref().trim().to_string();
                match parse_order(&raw) {
                    Ok(parsed) => {
                        let order = normalize_order(parsed, &self.state);
                        let valid = validate_order(&order, power, &self.state);
                        if !valid {
                            debug!(power = power.name(), order = %raw, "order rejected, will hold");
                        }
                        StagedOrder { raw, order: Some(order), valid }
                    }
                    Err(_) => {
                        debug!(power = power.name(), order = %raw, "order unparseable, will hold");
                        StagedOrder { raw, order: None, valid: false }
                    }
                }
            })
            .collect();
        self.staged.insert(power, staged);
        Ok(())
    }

    // --- possible orders ---

    /// Per power, the locations that must submit an order this phase.
    pub fn get_orderable_locations(&self) -> BTreeMap<Power, Vec<Loc>> {
        movegen::orderable_locations(&self.state)
    }

    /// Every legal order per location, memoized until the next
    /// `process()` or an explicit cache clear.
    pub fn get_all_possible_orders(&mut self) -> &BTreeMap<Loc, Vec<Order>> {
        if self.possible_orders.is_none() {
            self.possible_orders = Some(movegen::all_possible_orders(&self.state));
        }
        self.possible_orders.as_ref().unwrap()
    }

    pub fn clear_old_all_possible_orders(&mut self) {
        self.possible_orders = None;
    }

    // --- processing ---

    /// Adjudicates the open phase and advances to the next one.
    ///
    /// On error the game is left exactly as it was: the failed
    /// transition never mutates state or histories.
    pub fn process(&mut self) -> Result<(), GameError> {
        if self.is_game_done() {
            return Err(GameError::IllegalState(format!(
                "game {} is finished, cannot process {}",
                self.game_id,
                self.state.phase.short()
            )));
        }

        let phase = self.state.phase;
        let effective = self.effective_orders();
        let mut next = self.state.clone();
        let mut auto_logs: Vec<String> = Vec::new();

        match phase.kind {
            PhaseKind::Movement => {
                let outcome = resolve::resolve_movement(&effective, &self.state);
                if outcome.paradox {
                    warn!(phase = %phase.short(), "convoy paradox resolved by Szykman rule");
                    if self.exception_on_convoy_paradox {
                        self.crash_dump();
                        return Err(GameError::Paradox { phase: phase.short() });
                    }
                }
                resolve::apply_movement(&mut next, &outcome);
            }
            PhaseKind::Retreat => {
                let results = resolve::resolve_retreats(&effective, &self.state);
                for r in &results {
                    if r.order.unit().is_some()
                        && !effective.iter().any(|(o, _)| o == &r.order)
                    {
                        auto_logs.push(format!("{}: {} (civil disorder)", r.power.name(), r.order));
                    }
                }
                resolve::apply_retreats(&mut next, &results);
            }
            PhaseKind::Adjustment => {
                let outcome = resolve::resolve_adjustments(&effective, &self.state);
                for r in &outcome.resolved {
                    if outcome.civil_disorder.contains(&r.power)
                        && !effective.iter().any(|(o, _)| o == &r.order)
                    {
                        auto_logs.push(format!("{}: {} (civil disorder)", r.power.name(), r.order));
                    }
                }
                resolve::apply_adjustments(&mut next, &outcome);
            }
        }

        resolve::advance_phase(&mut next);
        debug!(from = %phase.short(), to = %next.phase.short(), "phase processed");

        // Commit: archive the open phase, then install the successor.
        self.state_history.insert(phase, std::mem::replace(&mut self.state, next));
        let raw_orders = self
            .staged
            .iter()
            .map(|(p, orders)| (*p, orders.iter().map(|o| o.raw.clone()).collect()))
            .collect();
        self.order_history.insert(phase, raw_orders);
        self.log_history.entry(phase).or_default().extend(auto_logs);
        self.staged.clear();
        self.possible_orders = None;
        Ok(())
    }

    /// The orders actually adjudicated: valid submissions, with a hold
    /// substituted for every unit that lacks one during movement.
    fn effective_orders(&self) -> Vec<(Order, Power)> {
        let mut effective: Vec<(Order, Power)> = Vec::new();
        let mut covered = [false; PROVINCE_COUNT];

        for (power, staged) in &self.staged {
            for s in staged {
                if !s.valid {
                    continue;
                }
                if let Some(order) = s.order {
                    if let Some(loc) = order.unit_loc() {
                        // One order per unit; the first valid one wins.
                        if covered[loc.province as usize] {
                            continue;
                        }
                        covered[loc.province as usize] = true;
                    }
                    effective.push((order, *power));
                }
            }
        }

        if self.state.phase.kind == PhaseKind::Movement {
            for prov in ALL_PROVINCES {
                if covered[prov as usize] {
                    continue;
                }
                if let Some((power, unit_type)) = self.state.units[prov as usize] {
                    let loc = self.state.unit_loc(prov).unwrap_or(Loc::new(prov));
                    effective.push((
                        Order::Hold {
                            unit: crate::board::unit::OrderUnit::new(unit_type, loc),
                        },
                        power,
                    ));
                }
            }
        }
        effective
    }

    // --- game termination ---

    /// Done iff a solo victor exists, a single power holds all owned
    /// centers, or the stalemate-draw horizon elapsed.
    pub fn is_game_done(&self) -> bool {
        if self.state.solo_winner().is_some() {
            return true;
        }
        if resolve::last_power_standing(&self.state).is_some() {
            return true;
        }
        self.draw_on_stalemate_years > 0
            && self.stalemate_years_elapsed() >= self.draw_on_stalemate_years
    }

    /// Consecutive completed game years with an identical supply-center
    /// map, counted back from the latest spring.
    fn stalemate_years_elapsed(&self) -> i32 {
        let mut springs: Vec<&GameState> = self
            .state_history
            .values()
            .chain(std::iter::once(&self.state))
            .filter(|s| s.phase.season == Season::Spring && s.phase.kind == PhaseKind::Movement)
            .collect();
        springs.sort_by_key(|s| s.phase.year);

        let mut elapsed = 0;
        for pair in springs.windows(2).rev() {
            if pair[0].sc_owner == pair[1].sc_owner {
                elapsed += 1;
            } else {
                break;
            }
        }
        elapsed
    }

    /// Length-7 score vector in power order, summing to 1.
    ///
    /// Solo victory puts the full score on the winner. Otherwise scores
    /// are proportional to supply-center counts; with no centers owned at
    /// all, the surviving powers split evenly.
    pub fn get_square_scores(&self) -> [f64; POWER_COUNT] {
        let mut scores = [0.0; POWER_COUNT];

        if let Some(winner) = self.state.solo_winner() {
            scores[winner as usize] = 1.0;
            return scores;
        }

        let counts: Vec<f64> = ALL_POWERS
            .iter()
            .map(|p| self.state.sc_count(*p) as f64)
            .collect();
        let total: f64 = counts.iter().sum();
        if total > 0.0 {
            for (i, c) in counts.iter().enumerate() {
                scores[i] = c / total;
            }
            return scores;
        }

        let survivors: Vec<usize> = ALL_POWERS
            .iter()
            .filter(|p| self.state.unit_count(**p) > 0)
            .map(|p| *p as usize)
            .collect();
        if survivors.is_empty() {
            for s in scores.iter_mut() {
                *s = 1.0 / POWER_COUNT as f64;
            }
        } else {
            for i in survivors.iter() {
                scores[*i] = 1.0 / survivors.len() as f64;
            }
        }
        scores
    }

    /// Stable 64-bit hash of the current board. See
    /// [`GameState::board_hash`].
    pub fn compute_board_hash(&self) -> u64 {
        self.state.board_hash()
    }

    // --- messages and logs ---

    /// Records a message under the open phase. A zero `time_sent` takes
    /// the injected clock's time; colliding timestamps are bumped to the
    /// next free microsecond so ordering follows submission order.
    pub fn add_message(
        &mut self,
        sender: Power,
        recipient: Power,
        body: impl Into<String>,
        time_sent: u64,
    ) -> u64 {
        let mut t = if time_sent == 0 {
            self.clock.now_micros()
        } else {
            time_sent
        };
        let phase_messages = self.message_history.entry(self.state.phase).or_default();
        while phase_messages.contains_key(&t) {
            t += 1;
        }
        phase_messages.insert(
            t,
            Message {
                sender,
                recipient,
                body: body.into(),
                time_sent: t,
            },
        );
        t
    }

    /// Appends a log line under the open phase.
    pub fn add_log(&mut self, body: impl Into<String>) {
        self.log_history
            .entry(self.state.phase)
            .or_default()
            .push(body.into());
    }

    // --- rollback ---

    /// A copy whose history is cut so that phase `p` is open again with
    /// no staged orders: its state is as-entered, and its orders,
    /// messages, and logs are gone along with every later phase.
    pub fn rolled_back_to_phase_start(&self, phase_s: &str) -> Result<Game, GameError> {
        let phase: Phase = phase_s.parse()?;
        let mut g = self.clone();
        g.staged.clear();
        g.possible_orders = None;

        if phase == self.state.phase {
            g.message_history.remove(&phase);
            g.log_history.remove(&phase);
            return Ok(g);
        }

        let entry = self.state_history.get(&phase).ok_or_else(|| {
            GameError::IllegalState(format!("phase {} is not in history", phase.short()))
        })?;
        g.state = entry.clone();
        g.truncate_from(phase);
        Ok(g)
    }

    /// A copy whose last processed phase is `p`: the archived resolution
    /// of `p` is kept and everything after it is dropped.
    pub fn rolled_back_to_phase_end(&self, phase_s: &str) -> Result<Game, GameError> {
        let phase: Phase = phase_s.parse()?;
        if !self.state_history.contains_key(&phase) {
            return Err(GameError::IllegalState(format!(
                "phase {} is not in history",
                phase.short()
            )));
        }

        let next_key = self
            .state_history
            .keys()
            .copied()
            .find(|k| *k > phase);
        match next_key {
            Some(nk) => self.rolled_back_to_phase_start(&nk.short()),
            None => {
                // `p` is the newest archived phase; the open phase is
                // already its resolution.
                let mut g = self.clone();
                g.staged.clear();
                g.possible_orders = None;
                g.message_history.remove(&self.state.phase);
                g.log_history.remove(&self.state.phase);
                Ok(g)
            }
        }
    }

    fn truncate_from(&mut self, phase: Phase) {
        self.state_history.retain(|k, _| *k < phase);
        self.order_history.retain(|k, _| *k < phase);
        self.message_history.retain(|k, _| *k < phase);
        self.log_history.retain(|k, _| *k < phase);
    }

    /// Deletes every message sent after `t`, across all phases.
    pub fn rollback_messages_to_timestamp(&mut self, t: u64) {
        for messages in self.message_history.values_mut() {
            messages.retain(|k, _| *k <= t);
        }
        self.message_history.retain(|_, m| !m.is_empty());
    }

    // --- persistence hooks (see protocol::snapshot) ---

    /// Serializes the whole game for a crash report before an error is
    /// surfaced. Failures here are swallowed; the original error matters
    /// more.
    pub(crate) fn crash_dump(&self) {
        match crate::protocol::snapshot::to_json(self) {
            Ok(json) => error!(target: "entente::crash", game_id = %self.game_id, dump = %json, "crash dump"),
            Err(e) => error!(target: "entente::crash", game_id = %self.game_id, "crash dump failed: {}", e),
        }
    }

    pub fn to_json(&self) -> Result<String, GameError> {
        crate::protocol::snapshot::to_json(self)
    }

    pub fn from_json(s: &str) -> Result<Game, GameError> {
        crate::protocol::snapshot::from_json(s)
    }

    // --- crate-internal construction used by the snapshot codec ---

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        game_id: String,
        rules: Vec<String>,
        state: GameState,
        state_history: BTreeMap<Phase, GameState>,
        order_history: BTreeMap<Phase, BTreeMap<Power, Vec<String>>>,
        message_history: BTreeMap<Phase, BTreeMap<u64, Message>>,
        log_history: BTreeMap<Phase, Vec<String>>,
    ) -> Game {
        Game {
            game_id,
            rules,
            state,
            staged: BTreeMap::new(),
            state_history,
            order_history,
            message_history,
            log_history,
            draw_on_stalemate_years: -1,
            exception_on_convoy_paradox: false,
            possible_orders: None,
            clock: Arc::new(SystemClock),
        }
    }
}
