//! Board-state snapshots.
//!
//! A `GameState` is one immutable-once-archived snapshot of the game:
//! unit positions, supply-center ownership, influence, dislodged units
//! with their legal retreat destinations, contested provinces from the
//! preceding movement phase, and per-power civil-disorder flags.
//!
//! Fixed-size arrays indexed by `Province as usize` give O(1) lookup and
//! keep cloning cheap; coast information for fleets on split-coast
//! provinces is carried in a parallel array.

use super::loc::Loc;
use super::phase::{Phase, PhaseKind, Season};
use super::province::{Coast, Power, Province, ALL_POWERS, POWER_COUNT, PROVINCE_COUNT};
use super::unit::UnitType;

/// A dislodged unit awaiting a retreat order.
///
/// `retreat_options` is fixed at movement resolution: destinations that
/// are adjacent for the unit type, unoccupied, not contested by a bounce,
/// and not the province the attacker came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DislodgedUnit {
    pub power: Power,
    pub unit_type: UnitType,
    pub coast: Coast,
    pub retreat_options: Vec<Loc>,
}

/// Complete board state at one point of the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub phase: Phase,
    /// Occupying unit per province.
    pub units: [Option<(Power, UnitType)>; PROVINCE_COUNT],
    /// Coast occupied by a fleet on a split-coast province.
    pub fleet_coast: [Option<Coast>; PROVINCE_COUNT],
    /// Supply-center owner; `None` for unowned centers and non-centers.
    pub sc_owner: [Option<Power>; PROVINCE_COUNT],
    /// Last power to occupy each province.
    pub influence: [Option<Power>; PROVINCE_COUNT],
    /// Units dislodged by the preceding movement phase.
    pub dislodged: [Option<DislodgedUnit>; PROVINCE_COUNT],
    /// Provinces where a move bounced; barred to retreats this turn.
    pub contested: [bool; PROVINCE_COUNT],
    /// Powers dismantled by civil disorder at some past adjustment.
    pub civil_disorder: [bool; POWER_COUNT],
}

impl GameState {
    /// An empty board with no units and no ownership.
    pub fn empty(phase: Phase) -> Self {
        GameState {
            phase,
            units: [None; PROVINCE_COUNT],
            fleet_coast: [None; PROVINCE_COUNT],
            sc_owner: [None; PROVINCE_COUNT],
            influence: [None; PROVINCE_COUNT],
            dislodged: std::array::from_fn(|_| None),
            contested: [false; PROVINCE_COUNT],
            civil_disorder: [false; POWER_COUNT],
        }
    }

    /// The standard 1901 starting position: 22 units, each home center
    /// owned by its power, influence seeded from the initial garrisons.
    pub fn initial() -> Self {
        use Province::*;
        let mut s = GameState::empty(Phase::initial());

        let setup: [(Power, UnitType, Province, Coast); 22] = [
            (Power::Austria, UnitType::Army, Vie, Coast::None),
            (Power::Austria, UnitType::Army, Bud, Coast::None),
            (Power::Austria, UnitType::Fleet, Tri, Coast::None),
            (Power::England, UnitType::Fleet, Lon, Coast::None),
            (Power::England, UnitType::Fleet, Edi, Coast::None),
            (Power::England, UnitType::Army, Lvp, Coast::None),
            (Power::France, UnitType::Fleet, Bre, Coast::None),
            (Power::France, UnitType::Army, Par, Coast::None),
            (Power::France, UnitType::Army, Mar, Coast::None),
            (Power::Germany, UnitType::Fleet, Kie, Coast::None),
            (Power::Germany, UnitType::Army, Ber, Coast::None),
            (Power::Germany, UnitType::Army, Mun, Coast::None),
            (Power::Italy, UnitType::Fleet, Nap, Coast::None),
            (Power::Italy, UnitType::Army, Rom, Coast::None),
            (Power::Italy, UnitType::Army, Ven, Coast::None),
            (Power::Russia, UnitType::Army, Mos, Coast::None),
            (Power::Russia, UnitType::Army, War, Coast::None),
            (Power::Russia, UnitType::Fleet, Sev, Coast::None),
            (Power::Russia, UnitType::Fleet, Stp, Coast::South),
            (Power::Turkey, UnitType::Fleet, Ank, Coast::None),
            (Power::Turkey, UnitType::Army, Con, Coast::None),
            (Power::Turkey, UnitType::Army, Smy, Coast::None),
        ];
        for (power, unit_type, prov, coast) in setup {
            s.place_unit(prov, power, unit_type, coast);
        }
        for prov in super::province::ALL_PROVINCES {
            if let Some(home) = prov.home_power() {
                s.sc_owner[prov as usize] = Some(home);
                s.influence[prov as usize] = Some(home);
            }
        }
        s
    }

    /// Places a unit; returns false if the province is already occupied.
    pub fn place_unit(
        &mut self,
        province: Province,
        power: Power,
        unit_type: UnitType,
        coast: Coast,
    ) -> bool {
        let idx = province as usize;
        if self.units[idx].is_some() {
            return false;
        }
        self.units[idx] = Some((power, unit_type));
        self.fleet_coast[idx] = if coast != Coast::None { Some(coast) } else { None };
        self.influence[idx] = Some(power);
        true
    }

    /// Removes the unit at a province, if any.
    pub fn remove_unit(&mut self, province: Province) {
        self.units[province as usize] = None;
        self.fleet_coast[province as usize] = None;
    }

    pub fn set_sc_owner(&mut self, province: Province, owner: Option<Power>) {
        self.sc_owner[province as usize] = owner;
    }

    /// The precise location of the unit at a province (coast included).
    pub fn unit_loc(&self, province: Province) -> Option<Loc> {
        self.units[province as usize].map(|_| {
            let coast = self.fleet_coast[province as usize].unwrap_or(Coast::None);
            Loc::with_coast(province, coast)
        })
    }

    /// Iterates the units of one power as (province, unit type, coast).
    pub fn units_of(&self, power: Power) -> impl Iterator<Item = (Province, UnitType, Coast)> + '_ {
        super::province::ALL_PROVINCES.into_iter().filter_map(move |prov| {
            match self.units[prov as usize] {
                Some((p, ut)) if p == power => {
                    let coast = self.fleet_coast[prov as usize].unwrap_or(Coast::None);
                    Some((prov, ut, coast))
                }
                _ => None,
            }
        })
    }

    /// Number of supply centers owned by a power.
    pub fn sc_count(&self, power: Power) -> usize {
        self.sc_owner.iter().filter(|o| **o == Some(power)).count()
    }

    /// Number of units fielded by a power.
    pub fn unit_count(&self, power: Power) -> usize {
        self.units
            .iter()
            .filter(|u| matches!(u, Some((p, _)) if *p == power))
            .count()
    }

    /// Winter delta: centers minus units. Positive means builds owed.
    pub fn adjustment_delta(&self, power: Power) -> i32 {
        self.sc_count(power) as i32 - self.unit_count(power) as i32
    }

    /// True if any power's delta is non-zero (an adjustment phase is due).
    pub fn any_adjustment_due(&self) -> bool {
        ALL_POWERS.iter().any(|p| self.adjustment_delta(*p) != 0)
    }

    /// True if any unit awaits a retreat order.
    pub fn has_dislodged(&self) -> bool {
        self.dislodged.iter().any(|d| d.is_some())
    }

    /// The power owning 18 or more supply centers, if any.
    pub fn solo_winner(&self) -> Option<Power> {
        ALL_POWERS.into_iter().find(|p| self.sc_count(*p) >= 18)
    }

    /// Stable 64-bit board hash over (phase, units, centers).
    ///
    /// FNV-1a over a canonical byte stream: the short phase name, then
    /// `(loc index, unit type, owner)` ascending by location, then
    /// `(loc index, owner)` for owned centers ascending. Independent of
    /// any insertion order by construction.
    pub fn board_hash(&self) -> u64 {
        const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

        let mut h = FNV_OFFSET;
        let mut eat = |byte: u8| {
            h ^= byte as u64;
            h = h.wrapping_mul(FNV_PRIME);
        };

        for b in self.phase.short().bytes() {
            eat(b);
        }
        for prov in super::province::ALL_PROVINCES {
            if let Some((power, unit_type)) = self.units[prov as usize] {
                let coast = self.fleet_coast[prov as usize].unwrap_or(Coast::None);
                eat(Loc::with_coast(prov, coast).index() as u8);
                eat(match unit_type {
                    UnitType::Army => 0,
                    UnitType::Fleet => 1,
                });
                eat(power as u8);
            }
        }
        for prov in super::province::ALL_PROVINCES {
            if let Some(owner) = self.sc_owner[prov as usize] {
                eat(Loc::new(prov).index() as u8);
                eat(owner as u8);
            }
        }
        h
    }

    /// Build allowance for a power this winter: the positive delta capped
    /// by its open home centers, plus the list of those centers.
    pub fn build_options(&self, power: Power) -> (usize, Vec<Province>) {
        let delta = self.adjustment_delta(power);
        if delta <= 0 {
            return (0, Vec::new());
        }
        let homes: Vec<Province> = power
            .home_centers()
            .filter(|p| {
                self.sc_owner[*p as usize] == Some(power) && self.units[*p as usize].is_none()
            })
            .collect();
        ((delta as usize).min(homes.len()), homes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::phase::PhaseKind;

    fn spring_1901() -> Phase {
        Phase::initial()
    }

    #[test]
    fn empty_state_has_nothing() {
        let s = GameState::empty(spring_1901());
        assert!(s.units.iter().all(|u| u.is_none()));
        assert!(s.sc_owner.iter().all(|o| o.is_none()));
        assert!(!s.has_dislodged());
        assert!(!s.any_adjustment_due());
    }

    #[test]
    fn initial_position_is_balanced() {
        let s = GameState::initial();
        for power in ALL_POWERS {
            let expected = if power == Power::Russia { 4 } else { 3 };
            assert_eq!(s.unit_count(power), expected, "{:?}", power);
            assert_eq!(s.sc_count(power), expected, "{:?}", power);
            assert_eq!(s.adjustment_delta(power), 0);
        }
        assert_eq!(
            s.fleet_coast[Province::Stp as usize],
            Some(Coast::South),
            "Russian fleet starts on the south coast"
        );
        assert!(s.solo_winner().is_none());
    }

    #[test]
    fn place_unit_rejects_double_occupancy() {
        let mut s = GameState::empty(spring_1901());
        assert!(s.place_unit(Province::Vie, Power::Austria, UnitType::Army, Coast::None));
        assert!(!s.place_unit(Province::Vie, Power::Germany, UnitType::Army, Coast::None));
        assert_eq!(s.influence[Province::Vie as usize], Some(Power::Austria));
    }

    #[test]
    fn unit_loc_carries_coast() {
        let mut s = GameState::empty(spring_1901());
        s.place_unit(Province::Stp, Power::Russia, UnitType::Fleet, Coast::South);
        assert_eq!(
            s.unit_loc(Province::Stp),
            Some(Loc::with_coast(Province::Stp, Coast::South))
        );
        assert_eq!(s.unit_loc(Province::Mos), None);
    }

    #[test]
    fn board_hash_ignores_insertion_order() {
        let mut a = GameState::empty(spring_1901());
        a.place_unit(Province::Vie, Power::Austria, UnitType::Army, Coast::None);
        a.place_unit(Province::Ber, Power::Germany, UnitType::Army, Coast::None);
        a.set_sc_owner(Province::Vie, Some(Power::Austria));
        a.set_sc_owner(Province::Ber, Some(Power::Germany));

        let mut b = GameState::empty(spring_1901());
        b.set_sc_owner(Province::Ber, Some(Power::Germany));
        b.place_unit(Province::Ber, Power::Germany, UnitType::Army, Coast::None);
        b.place_unit(Province::Vie, Power::Austria, UnitType::Army, Coast::None);
        b.set_sc_owner(Province::Vie, Some(Power::Austria));

        assert_eq!(a.board_hash(), b.board_hash());
    }

    #[test]
    fn board_hash_distinguishes_positions() {
        let a = GameState::initial();
        let mut b = GameState::initial();
        b.remove_unit(Province::Par);
        assert_ne!(a.board_hash(), b.board_hash());

        let mut c = GameState::initial();
        c.phase = Phase::new(Season::Fall, 1901, PhaseKind::Movement);
        assert_ne!(a.board_hash(), c.board_hash());
    }

    #[test]
    fn build_options_capped_by_open_homes() {
        let mut s = GameState::empty(Phase::new(Season::Winter, 1901, PhaseKind::Adjustment));
        // Austria: 3 owned centers, 1 unit sitting on Vie.
        for prov in [Province::Vie, Province::Bud, Province::Tri] {
            s.set_sc_owner(prov, Some(Power::Austria));
        }
        s.set_sc_owner(Province::Ser, Some(Power::Austria));
        s.place_unit(Province::Vie, Power::Austria, UnitType::Army, Coast::None);

        let (count, homes) = s.build_options(Power::Austria);
        // Delta is 3 but only Bud and Tri are open home centers.
        assert_eq!(count, 2);
        assert_eq!(homes, vec![Province::Bud, Province::Tri]);
    }
}
