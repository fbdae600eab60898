//! Whole-game lifecycle tests: phase sequencing with elision, winter
//! adjustments and civil disorder, scoring, snapshot round-trips, replay
//! determinism, and rollback.

use std::sync::Arc;

use entente::board::loc::Loc;
use entente::board::phase::Phase;
use entente::board::province::{Power, Province, ALL_POWERS};
use entente::board::unit::UnitType;
use entente::clock::CountingClock;
use entente::{Game, GameError};

fn phase(s: &str) -> Phase {
    s.parse().unwrap()
}

/// Plays 1901 so that France ends the year one unit short of its
/// centers: Burgundy and a captured Belgium force a winter build.
fn play_1901_with_french_capture(g: &mut Game) {
    g.set_orders("FRANCE", &["A PAR - PIC", "A MAR - BUR"]).unwrap();
    g.process().unwrap();
    assert_eq!(g.current_phase(), phase("F1901M"));
    g.set_orders("FRANCE", &["A PIC - BEL"]).unwrap();
    g.process().unwrap();
}

#[test]
fn quiet_year_skips_both_retreat_and_winter() {
    let mut g = Game::with_id("quiet");
    g.process().unwrap();
    assert_eq!(g.current_phase(), phase("F1901M"));
    g.process().unwrap();
    // No dislodgements and no deltas: straight to next spring.
    assert_eq!(g.current_phase(), phase("S1902M"));
}

#[test]
fn capture_forces_a_winter_and_a_build() {
    let mut g = Game::with_id("capture");
    play_1901_with_french_capture(&mut g);

    assert_eq!(g.current_phase(), phase("W1901A"));
    assert_eq!(g.get_state().sc_owner[Province::Bel as usize], Some(Power::France));
    assert_eq!(g.get_state().adjustment_delta(Power::France), 1);

    // Only France owes an adjustment; Marseilles and Paris were vacated
    // and stand open, while occupied Brest is no build site.
    let orderable = g.get_orderable_locations();
    assert!(orderable[&Power::France].contains(&Loc::new(Province::Par)));
    assert!(orderable[&Power::Germany].is_empty());

    g.set_orders("FRANCE", &["A PAR B"]).unwrap();
    g.process().unwrap();

    assert_eq!(g.current_phase(), phase("S1902M"));
    assert_eq!(g.get_state().unit_count(Power::France), 4);
    assert_eq!(
        g.get_state().units[Province::Par as usize],
        Some((Power::France, UnitType::Army))
    );
}

#[test]
fn waived_build_leaves_the_power_short() {
    let mut g = Game::with_id("waive");
    play_1901_with_french_capture(&mut g);
    g.set_orders("FRANCE", &["WAIVE"]).unwrap();
    g.process().unwrap();
    assert_eq!(g.current_phase(), phase("S1902M"));
    assert_eq!(g.get_state().unit_count(Power::France), 3);
    assert_eq!(g.get_state().sc_count(Power::France), 4);
}

#[test]
fn dislodgement_inserts_a_retreat_phase() {
    let mut g = Game::with_id("retreat");
    g.set_orders("FRANCE", &["A PAR - BUR"]).unwrap();
    g.set_orders("GERMANY", &["A MUN - RUH", "A BER - MUN"]).unwrap();
    g.process().unwrap();
    g.set_orders("GERMANY", &["A RUH - BUR", "A MUN S A RUH - BUR"]).unwrap();
    g.process().unwrap();

    assert_eq!(g.current_phase(), phase("F1901R"));
    let orderable = g.get_orderable_locations();
    assert_eq!(orderable[&Power::France], vec![Loc::new(Province::Bur)]);

    g.set_orders("FRANCE", &["A BUR R PAR"]).unwrap();
    g.process().unwrap();

    // France kept all three centers, so no winter is due for it; Germany
    // is balanced as well once ownership updates at fall retreat.
    assert_eq!(g.current_phase(), phase("S1902M"));
    assert_eq!(
        g.get_state().units[Province::Par as usize],
        Some((Power::France, UnitType::Army))
    );
}

#[test]
fn unordered_dislodged_unit_disbands_and_winter_rebuilds() {
    let mut g = Game::with_id("disband");
    g.set_orders("FRANCE", &["A PAR - BUR"]).unwrap();
    g.set_orders("GERMANY", &["A MUN - RUH", "A BER - MUN"]).unwrap();
    g.process().unwrap();
    g.set_orders("GERMANY", &["A RUH - BUR", "A MUN S A RUH - BUR"]).unwrap();
    g.process().unwrap();
    assert_eq!(g.current_phase(), phase("F1901R"));

    // France stays silent: the army disbands, and winter owes a build.
    g.process().unwrap();
    assert_eq!(g.current_phase(), phase("W1901A"));
    assert_eq!(g.get_state().adjustment_delta(Power::France), 1);
    // The auto-disband was logged against the retreat phase.
    let logs = &g.get_log_history()[&phase("F1901R")];
    assert!(logs.iter().any(|l| l.contains("FRANCE") && l.contains("D")), "{:?}", logs);
}

#[test]
fn civil_disorder_dismantles_the_deficit() {
    let mut g = Game::with_id("civil-disorder");
    // France hands Marseilles to Italy, ending 1901 with 2 centers and
    // 3 units and no disband submitted.
    g.set_orders("FRANCE", &["A MAR - PIE"]).unwrap();
    g.process().unwrap();
    g.set_orders("ITALY", &["A VEN - PIE"]).unwrap(); // bounces, stays home
    g.set_orders("FRANCE", &["A PIE H"]).unwrap();
    g.process().unwrap();

    // Marseilles is vacant but still French; no delta yet.
    assert_eq!(g.current_phase(), phase("S1902M"));

    // Italy walks into Marseilles over 1902.
    g.set_orders("ITALY", &["A VEN - PIE"]).unwrap();
    g.set_orders("FRANCE", &["A PIE - TUS"]).unwrap();
    g.process().unwrap();
    g.set_orders("ITALY", &["A PIE - MAR"]).unwrap();
    g.process().unwrap();

    assert_eq!(g.current_phase(), phase("W1902A"));
    assert_eq!(g.get_state().adjustment_delta(Power::France), -1);
    assert_eq!(g.get_state().adjustment_delta(Power::Italy), 1);

    g.set_orders("ITALY", &["WAIVE"]).unwrap();
    g.process().unwrap();

    // France never submitted a disband: civil disorder removed the unit
    // farthest from home (the army in Tuscany) and flagged the power.
    assert_eq!(g.get_state().unit_count(Power::France), 2);
    assert!(g.get_state().units[Province::Tus as usize].is_none());
    assert!(g.get_state().civil_disorder[Power::France as usize]);
    let logs = &g.get_log_history()[&phase("W1902A")];
    assert!(logs.iter().any(|l| l.contains("civil disorder")), "{:?}", logs);
}

#[test]
fn solo_victory_scores_a_unit_vector() {
    // Hand Russia 21 centers through a snapshot edit; the public API has
    // no other way to reach an arbitrary late-game position.
    let g = Game::with_id("solo");
    let json = g.to_json().unwrap();
    let mut v: serde_json::Value = serde_json::from_str(&json).unwrap();
    let scs: Vec<String> = [
        "ANK", "BEL", "BER", "BRE", "BUD", "BUL", "CON", "DEN", "EDI", "GRE", "HOL", "KIE",
        "LON", "LVP", "MAR", "MOS", "MUN", "NAP", "SEV", "STP", "WAR",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    v["state"]["centers"]["RUSSIA"] = serde_json::json!(scs);
    for p in ["AUSTRIA", "ENGLAND", "FRANCE", "GERMANY", "ITALY", "TURKEY"] {
        v["state"]["centers"][p] = serde_json::json!([] as [String; 0]);
    }
    let mut g = Game::from_json(&v.to_string()).unwrap();

    assert!(g.is_game_done());
    let scores = g.get_square_scores();
    assert_eq!(scores[Power::Russia as usize], 1.0);
    assert_eq!(scores.iter().sum::<f64>(), 1.0);
    assert!(matches!(g.process(), Err(GameError::IllegalState(_))));
}

#[test]
fn scores_track_center_shares() {
    let mut g = Game::with_id("scores");
    play_1901_with_french_capture(&mut g);
    g.set_orders("FRANCE", &["A PAR B"]).unwrap();
    g.process().unwrap();

    let scores = g.get_square_scores();
    let sum: f64 = scores.iter().sum();
    assert!((sum - 1.0).abs() < 1e-9);
    assert!((scores[Power::France as usize] - 4.0 / 23.0).abs() < 1e-9);
    for p in ALL_POWERS {
        if p != Power::France && p != Power::Russia {
            assert!((scores[p as usize] - 3.0 / 23.0).abs() < 1e-9);
        }
    }
}

#[test]
fn snapshot_roundtrip_preserves_everything() {
    let mut g = Game::with_id("roundtrip").with_clock(Arc::new(CountingClock::starting_at(7_000)));
    g.add_message(Power::England, Power::France, "entente?", 0);
    g.add_log("game opened");
    play_1901_with_french_capture(&mut g);
    g.set_orders("FRANCE", &["A PAR B"]).unwrap();
    g.process().unwrap();

    let json = g.to_json().unwrap();
    let loaded = Game::from_json(&json).unwrap();
    assert_eq!(loaded, g);
    assert_eq!(loaded.game_id, "roundtrip");
    assert_eq!(loaded.current_phase(), g.current_phase());
    assert_eq!(loaded.compute_board_hash(), g.compute_board_hash());
    for (p, s) in g.get_state_history() {
        assert_eq!(
            loaded.get_state_history()[p].board_hash(),
            s.board_hash(),
            "hash mismatch at {}",
            p.short()
        );
    }
    assert_eq!(loaded.get_order_history(), g.get_order_history());
    // A second trip is a fixed point.
    assert_eq!(loaded.to_json().unwrap(), json);
}

#[test]
fn replaying_recorded_orders_is_deterministic() {
    let mut g = Game::with_id("replay");
    g.set_orders("AUSTRIA", &["A VIE - GAL", "F TRI - ADR"]).unwrap();
    g.set_orders("RUSSIA", &["A WAR - GAL", "F SEV - BLA"]).unwrap();
    g.set_orders("TURKEY", &["F ANK - BLA"]).unwrap();
    g.process().unwrap();
    g.set_orders("AUSTRIA", &["F ADR - ION"]).unwrap();
    g.set_orders("ITALY", &["F NAP - ION"]).unwrap();
    g.process().unwrap();

    for p in ["S1901M", "F1901M"] {
        let rolled = g.rolled_back_to_phase_start(p).unwrap();
        assert_eq!(rolled.game_id, g.game_id);

        let mut replay = rolled.clone();
        for (power, orders) in &g.get_order_history()[&phase(p)] {
            replay.set_orders(power.name(), orders).unwrap();
        }
        replay.process().unwrap();

        let expected = g
            .get_next_phase(phase(p))
            .map(|np| g.get_state_history().get(&np).unwrap_or(g.get_state()).board_hash())
            .unwrap();
        assert_eq!(replay.compute_board_hash(), expected, "replay of {}", p);
    }
}

#[test]
fn shuffled_submission_order_changes_nothing() {
    let run = |flip: bool| {
        let mut g = Game::with_id("shuffle");
        let austria = ["A VIE - GAL", "A BUD - SER", "F TRI - ALB"];
        let russia = ["A WAR - GAL", "A MOS - UKR"];
        if flip {
            g.set_orders("RUSSIA", &russia).unwrap();
            let mut rev = austria;
            rev.reverse();
            g.set_orders("AUSTRIA", &rev).unwrap();
        } else {
            g.set_orders("AUSTRIA", &austria).unwrap();
            g.set_orders("RUSSIA", &russia).unwrap();
        }
        g.process().unwrap();
        g.compute_board_hash()
    };
    assert_eq!(run(false), run(true));
}

/// Loads the canonical Szykman position through a snapshot edit:
/// FRA A TUN + F TYS (its convoy), ITA F ION + F NAP poised to sink the
/// convoying sea with support from the landing province.
fn paradox_position() -> Game {
    let g = Game::with_id("paradox");
    let mut v: serde_json::Value = serde_json::from_str(&g.to_json().unwrap()).unwrap();
    v["state"]["units"]["FRANCE"] = serde_json::json!(["A TUN", "F TYS"]);
    v["state"]["units"]["ITALY"] = serde_json::json!(["F ION", "F NAP"]);
    for p in ["AUSTRIA", "ENGLAND", "GERMANY", "RUSSIA", "TURKEY"] {
        v["state"]["units"][p] = serde_json::json!([] as [String; 0]);
    }
    let mut g = Game::from_json(&v.to_string()).unwrap();
    g.set_orders("FRANCE", &["A TUN - NAP VIA", "F TYS C A TUN - NAP"]).unwrap();
    g.set_orders("ITALY", &["F ION - TYS", "F NAP S F ION - TYS"]).unwrap();
    g
}

#[test]
fn paradox_resolves_by_szykman_by_default() {
    let mut g = paradox_position();
    g.process().unwrap();

    // The convoyed move failed, the army stays, the convoying fleet is
    // sunk and must retreat.
    assert_eq!(g.current_phase(), phase("S1901R"));
    assert_eq!(
        g.get_state().units[Province::Tun as usize],
        Some((Power::France, UnitType::Army))
    );
    assert_eq!(
        g.get_state().units[Province::Tys as usize],
        Some((Power::Italy, UnitType::Fleet))
    );
    assert!(g.get_state().dislodged[Province::Tys as usize].is_some());
}

#[test]
fn paradox_exception_aborts_without_mutating() {
    let mut g = paradox_position();
    g.set_exception_on_convoy_paradox();

    let phase_before = g.current_phase();
    let hash_before = g.compute_board_hash();
    let err = g.process().unwrap_err();
    assert!(matches!(err, GameError::Paradox { .. }));

    // The failed transition left no trace: same phase, same board, no
    // archived history, staged orders intact for resubmission.
    assert_eq!(g.current_phase(), phase_before);
    assert_eq!(g.compute_board_hash(), hash_before);
    assert!(g.get_state_history().is_empty());
    assert!(!g.get_staged_orders().is_empty());

    // Amended orders resolve normally afterwards: Naples steps aside
    // and the convoy delivers.
    g.set_orders("ITALY", &["F ION - EAS", "F NAP - ROM"]).unwrap();
    g.process().unwrap();
    assert_eq!(
        g.get_state().units[Province::Nap as usize],
        Some((Power::France, UnitType::Army))
    );
}

#[test]
fn rollback_truncates_and_preserves_id() {
    let mut g = Game::with_id("rollback").with_clock(Arc::new(CountingClock::starting_at(50)));
    g.add_message(Power::France, Power::England, "s1901m message", 0);
    g.process().unwrap();
    g.add_message(Power::France, Power::England, "f1901m message", 0);
    g.process().unwrap();

    let rolled = g.rolled_back_to_phase_start("F1901M").unwrap();
    assert_eq!(rolled.game_id, "rollback");
    assert_eq!(rolled.current_phase(), phase("F1901M"));
    // The spring message survives, the fall one is gone.
    assert!(rolled.get_message_history().contains_key(&phase("S1901M")));
    assert!(!rolled.get_message_history().contains_key(&phase("F1901M")));
    assert!(rolled.get_order_history().contains_key(&phase("S1901M")));
    assert!(!rolled.get_order_history().contains_key(&phase("F1901M")));

    // The original is untouched.
    assert_eq!(g.current_phase(), phase("S1902M"));
    assert!(g.get_message_history().contains_key(&phase("F1901M")));
}

#[test]
fn message_timestamp_rollback_spans_phases() {
    let mut g = Game::with_id("messages").with_clock(Arc::new(CountingClock::starting_at(100)));
    g.add_message(Power::France, Power::England, "first", 0);
    g.process().unwrap();
    g.add_message(Power::England, Power::France, "second", 0);
    g.rollback_messages_to_timestamp(100);
    assert!(g.get_message_history().contains_key(&phase("S1901M")));
    assert!(!g.get_message_history().contains_key(&phase("F1901M")));
}

#[test]
fn no_unit_shares_a_province_after_any_process() {
    let mut g = Game::with_id("occupancy");
    g.set_orders("AUSTRIA", &["A VIE - GAL"]).unwrap();
    g.set_orders("RUSSIA", &["A WAR - GAL", "A MOS - WAR"]).unwrap();
    g.set_orders("ITALY", &["A VEN - TYR"]).unwrap();
    g.set_orders("GERMANY", &["A MUN - TYR"]).unwrap();
    g.process().unwrap();

    // Occupancy is one unit per province by construction of the state
    // arrays; check the unit totals came through instead.
    let total: usize = ALL_POWERS.iter().map(|p| g.get_state().unit_count(*p)).sum();
    assert_eq!(total, 22);
}
