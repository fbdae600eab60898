//! JSON snapshot codec.
//!
//! Serializes a whole game (current state, per-phase histories of
//! states, orders, messages, and logs) to a stable JSON document and
//! loads it back. The wire shape lives in dedicated mirror structs so
//! the in-memory layout can move without breaking saved games; loading
//! validates consistency and reports `CorruptSnapshot` on anything that
//! could not have come from a well-formed game.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::loc::Loc;
use crate::board::phase::Phase;
use crate::board::province::{Coast, Power, Province, ALL_POWERS, ALL_PROVINCES};
use crate::board::state::{DislodgedUnit, GameState};
use crate::board::unit::{OrderUnit, UnitType};
use crate::error::GameError;
use crate::game::{Game, Message};

#[derive(Debug, Serialize, Deserialize)]
struct GameJson {
    id: String,
    map: String,
    rules: Vec<String>,
    phase: String,
    state: StateJson,
    state_history: BTreeMap<String, StateJson>,
    order_history: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    messages: BTreeMap<String, BTreeMap<String, MessageJson>>,
    logs: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateJson {
    units: BTreeMap<String, Vec<String>>,
    retreats: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    centers: BTreeMap<String, Vec<String>>,
    homes: BTreeMap<String, Vec<String>>,
    influence: BTreeMap<String, Vec<String>>,
    civil_disorder: BTreeMap<String, u8>,
    builds: BTreeMap<String, BuildsJson>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BuildsJson {
    count: i32,
    homes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MessageJson {
    sender: String,
    recipient: String,
    body: String,
}

/// Serializes a game to its JSON document.
pub fn to_json(game: &Game) -> Result<String, GameError> {
    let doc = GameJson {
        id: game.game_id.clone(),
        map: game.map_name().to_string(),
        rules: game.rules().to_vec(),
        phase: game.current_phase().short(),
        state: state_to_json(game.get_state()),
        state_history: game
            .get_state_history()
            .iter()
            .map(|(phase, s)| (phase.short(), state_to_json(s)))
            .collect(),
        order_history: game
            .get_order_history()
            .iter()
            .map(|(phase, by_power)| {
                let inner = by_power
                    .iter()
                    .map(|(p, orders)| (p.name().to_string(), orders.clone()))
                    .collect();
                (phase.short(), inner)
            })
            .collect(),
        messages: game
            .get_message_history()
            .iter()
            .map(|(phase, by_time)| {
                let inner = by_time
                    .iter()
                    .map(|(t, m)| {
                        (
                            t.to_string(),
                            MessageJson {
                                sender: m.sender.name().to_string(),
                                recipient: m.recipient.name().to_string(),
                                body: m.body.clone(),
                            },
                        )
                    })
                    .collect();
                (phase.short(), inner)
            })
            .collect(),
        logs: game
            .get_log_history()
            .iter()
            .map(|(phase, lines)| (phase.short(), lines.clone()))
            .collect(),
    };

    serde_json::to_string(&doc).map_err(|e| GameError::CorruptSnapshot(e.to_string()))
}

/// Loads a game from its JSON document.
pub fn from_json(text: &str) -> Result<Game, GameError> {
    let doc: GameJson =
        serde_json::from_str(text).map_err(|e| GameError::CorruptSnapshot(e.to_string()))?;

    let current_phase = parse_phase(&doc.phase)?;
    let state = state_from_json(&doc.state, current_phase)?;

    let mut state_history = BTreeMap::new();
    for (phase_s, state_json) in &doc.state_history {
        let phase = parse_phase(phase_s)?;
        if phase >= current_phase {
            return Err(GameError::CorruptSnapshot(format!(
                "archived phase {} does not precede the open phase {}",
                phase_s, doc.phase
            )));
        }
        state_history.insert(phase, state_from_json(state_json, phase)?);
    }

    let mut order_history = BTreeMap::new();
    for (phase_s, by_power) in &doc.order_history {
        let phase = parse_phase(phase_s)?;
        if !state_history.contains_key(&phase) {
            return Err(GameError::CorruptSnapshot(format!(
                "orders recorded for phase {} with no archived state",
                phase_s
            )));
        }
        let mut inner = BTreeMap::new();
        for (power_s, orders) in by_power {
            inner.insert(parse_power(power_s)?, orders.clone());
        }
        order_history.insert(phase, inner);
    }

    let mut message_history = BTreeMap::new();
    for (phase_s, by_time) in &doc.messages {
        let phase = parse_phase(phase_s)?;
        let mut inner = BTreeMap::new();
        for (time_s, m) in by_time {
            let t: u64 = time_s.parse().map_err(|_| {
                GameError::CorruptSnapshot(format!("bad message timestamp '{}'", time_s))
            })?;
            inner.insert(
                t,
                Message {
                    sender: parse_power(&m.sender)?,
                    recipient: parse_power(&m.recipient)?,
                    body: m.body.clone(),
                    time_sent: t,
                },
            );
        }
        message_history.insert(phase, inner);
    }

    let mut log_history = BTreeMap::new();
    for (phase_s, lines) in &doc.logs {
        log_history.insert(parse_phase(phase_s)?, lines.clone());
    }

    Ok(Game::from_parts(
        doc.id,
        doc.rules,
        state,
        state_history,
        order_history,
        message_history,
        log_history,
    ))
}

fn state_to_json(state: &GameState) -> StateJson {
    let mut units: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut retreats: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
    let mut centers: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut homes: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut influence: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut civil_disorder: BTreeMap<String, u8> = BTreeMap::new();
    let mut builds: BTreeMap<String, BuildsJson> = BTreeMap::new();

    for power in ALL_POWERS {
        let name = power.name().to_string();

        units.insert(
            name.clone(),
            state
                .units_of(power)
                .map(|(prov, ut, coast)| {
                    OrderUnit::new(ut, Loc::with_coast(prov, coast)).to_string()
                })
                .collect(),
        );

        let mut power_retreats = BTreeMap::new();
        for prov in ALL_PROVINCES {
            if let Some(d) = &state.dislodged[prov as usize] {
                if d.power == power {
                    let unit = OrderUnit::new(d.unit_type, Loc::with_coast(prov, d.coast));
                    power_retreats.insert(
                        unit.to_string(),
                        d.retreat_options.iter().map(|l| l.to_string()).collect(),
                    );
                }
            }
        }
        retreats.insert(name.clone(), power_retreats);

        centers.insert(
            name.clone(),
            ALL_PROVINCES
                .into_iter()
                .filter(|p| state.sc_owner[*p as usize] == Some(power))
                .map(|p| p.abbr().to_string())
                .collect(),
        );

        homes.insert(
            name.clone(),
            power.home_centers().map(|p| p.abbr().to_string()).collect(),
        );

        influence.insert(
            name.clone(),
            ALL_PROVINCES
                .into_iter()
                .filter(|p| state.influence[*p as usize] == Some(power))
                .map(|p| p.abbr().to_string())
                .collect(),
        );

        civil_disorder.insert(name.clone(), u8::from(state.civil_disorder[power as usize]));

        let delta = state.adjustment_delta(power);
        let (count, open_homes) = if delta > 0 {
            let (count, open) = state.build_options(power);
            (count as i32, open.iter().map(|p| p.abbr().to_string()).collect())
        } else {
            (delta, Vec::new())
        };
        builds.insert(name, BuildsJson { count, homes: open_homes });
    }

    StateJson {
        units,
        retreats,
        centers,
        homes,
        influence,
        civil_disorder,
        builds,
    }
}

fn state_from_json(doc: &StateJson, phase: Phase) -> Result<GameState, GameError> {
    let mut state = GameState::empty(phase);

    for (power_s, unit_strs) in &doc.units {
        let power = parse_power(power_s)?;
        for unit_s in unit_strs {
            let unit = parse_unit(unit_s)?;
            if !state.place_unit(unit.loc.province, power, unit.unit_type, unit.loc.coast) {
                return Err(GameError::CorruptSnapshot(format!(
                    "two units occupy {}",
                    unit.loc.province.abbr()
                )));
            }
        }
    }

    for (power_s, by_unit) in &doc.retreats {
        let power = parse_power(power_s)?;
        for (unit_s, dests) in by_unit {
            let unit = parse_unit(unit_s)?;
            let mut retreat_options = Vec::new();
            for d in dests {
                retreat_options.push(parse_loc(d)?);
            }
            state.dislodged[unit.loc.province as usize] = Some(DislodgedUnit {
                power,
                unit_type: unit.unit_type,
                coast: unit.loc.coast,
                retreat_options,
            });
        }
    }

    for (power_s, provs) in &doc.centers {
        let power = parse_power(power_s)?;
        for prov_s in provs {
            let prov = parse_province(prov_s)?;
            if !prov.is_supply_center() {
                return Err(GameError::CorruptSnapshot(format!(
                    "{} is not a supply center",
                    prov_s
                )));
            }
            if state.sc_owner[prov as usize].is_some() {
                return Err(GameError::CorruptSnapshot(format!(
                    "{} is owned by two powers",
                    prov_s
                )));
            }
            state.sc_owner[prov as usize] = Some(power);
        }
    }

    // Placement seeded influence from units; the document's view wins.
    state.influence = [None; crate::board::PROVINCE_COUNT];
    for (power_s, provs) in &doc.influence {
        let power = parse_power(power_s)?;
        for prov_s in provs {
            state.influence[parse_province(prov_s)? as usize] = Some(power);
        }
    }

    for (power_s, flag) in &doc.civil_disorder {
        let power = parse_power(power_s)?;
        state.civil_disorder[power as usize] = *flag != 0;
    }

    // `homes` and `builds` are derived views; nothing to restore.
    Ok(state)
}

fn parse_phase(s: &str) -> Result<Phase, GameError> {
    s.parse()
        .map_err(|_| GameError::CorruptSnapshot(format!("bad phase '{}'", s)))
}

fn parse_power(s: &str) -> Result<Power, GameError> {
    Power::from_name(s).ok_or_else(|| GameError::CorruptSnapshot(format!("bad power '{}'", s)))
}

fn parse_province(s: &str) -> Result<Province, GameError> {
    Province::from_abbr(s)
        .ok_or_else(|| GameError::CorruptSnapshot(format!("bad province '{}'", s)))
}

fn parse_loc(s: &str) -> Result<Loc, GameError> {
    Loc::from_str_loose(s).ok_or_else(|| GameError::CorruptSnapshot(format!("bad loc '{}'", s)))
}

/// Parses a unit string such as `A PAR` or `F STP/SC`.
fn parse_unit(s: &str) -> Result<OrderUnit, GameError> {
    let bad = || GameError::CorruptSnapshot(format!("bad unit '{}'", s));
    let (ut, loc) = s.trim().split_once(' ').ok_or_else(bad)?;
    let unit_type = match ut {
        "A" => UnitType::Army,
        "F" => UnitType::Fleet,
        _ => return Err(bad()),
    };
    let loc = Loc::from_str_loose(loc.trim()).ok_or_else(bad)?;
    if loc.coast != Coast::None && unit_type == UnitType::Army {
        return Err(bad());
    }
    Ok(OrderUnit::new(unit_type, loc))
}
