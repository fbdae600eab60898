//! Civil-disorder distance tables.
//!
//! For each power there are two vectors of length 81 indexed by the
//! canonical loc index: one for armies, one for fleets. An entry is the
//! shortest graph distance from that location to the power's nearest home
//! supply center; `-1` marks locations the unit type can never occupy
//! (those units are ineligible for selection through that table).
//!
//! Army distances walk the full province graph regardless of edge type,
//! so seas get values too; fleet distances walk fleet edges at coast
//! granularity, starting from the power's coastal home centers. The
//! tables are derived once at startup from the adjacency graph and are
//! read-only afterwards.

use std::collections::VecDeque;
use std::sync::LazyLock;

use super::adjacency::edges_from;
use super::loc::{all_locs, Loc, LOC_COUNT};
use super::province::{Coast, Power, Province, Terrain, ALL_POWERS, ALL_PROVINCES, POWER_COUNT, PROVINCE_COUNT};
use super::unit::UnitType;

/// `-1` sentinel: this unit type can never be disbanded via this table.
pub const INELIGIBLE: i16 = -1;

struct DistanceTables {
    /// [power][unit_type][loc index]
    dists: [[[i16; LOC_COUNT]; 2]; POWER_COUNT],
}

static TABLES: LazyLock<DistanceTables> = LazyLock::new(|| {
    let mut dists = [[[INELIGIBLE; LOC_COUNT]; 2]; POWER_COUNT];
    for power in ALL_POWERS {
        dists[power as usize][UnitType::Army as usize] = army_distances(power);
        dists[power as usize][UnitType::Fleet as usize] = fleet_distances(power);
    }
    DistanceTables { dists }
});

/// The distance-to-home score consulted by the civil-disorder dismantler.
pub fn disband_distance(power: Power, unit_type: UnitType, loc: Loc) -> i16 {
    TABLES.dists[power as usize][unit_type as usize][loc.index()]
}

/// BFS over the whole province graph (any edge) from the power's homes.
fn army_distances(power: Power) -> [i16; LOC_COUNT] {
    let mut prov_dist = [INELIGIBLE; PROVINCE_COUNT];
    let mut queue = VecDeque::new();

    for prov in ALL_PROVINCES {
        if prov.home_power() == Some(power) {
            prov_dist[prov as usize] = 0;
            queue.push_back(prov);
        }
    }
    while let Some(prov) = queue.pop_front() {
        let d = prov_dist[prov as usize];
        for e in edges_from(prov) {
            if prov_dist[e.to as usize] == INELIGIBLE {
                prov_dist[e.to as usize] = d + 1;
                queue.push_back(e.to);
            }
        }
    }

    // Every loc inherits its parent province's distance.
    let mut out = [INELIGIBLE; LOC_COUNT];
    for loc in all_locs() {
        out[loc.index()] = prov_dist[loc.province as usize];
    }
    out
}

/// BFS over fleet edges at coast granularity from coastal home centers.
fn fleet_distances(power: Power) -> [i16; LOC_COUNT] {
    let mut out = [INELIGIBLE; LOC_COUNT];
    let mut queue = VecDeque::new();

    for loc in all_locs() {
        if loc.province.home_power() == Some(power) && fleet_can_sit(loc) {
            out[loc.index()] = 0;
            queue.push_back(loc);
        }
    }
    while let Some(loc) = queue.pop_front() {
        let d = out[loc.index()];
        for e in edges_from(loc.province) {
            if !e.fleet_ok {
                continue;
            }
            if loc.coast != Coast::None && e.from_coast != Coast::None && e.from_coast != loc.coast
            {
                continue;
            }
            let next = Loc::with_coast(e.to, e.to_coast);
            if fleet_can_sit(next) && out[next.index()] == INELIGIBLE {
                out[next.index()] = d + 1;
                queue.push_back(next);
            }
        }
    }
    out
}

/// True for the locations a fleet can actually occupy: seas, single-coast
/// coastal provinces, and the coasted variants of split-coast provinces.
fn fleet_can_sit(loc: Loc) -> bool {
    match loc.province.terrain() {
        Terrain::Inland => false,
        Terrain::Sea => loc.coast == Coast::None,
        Terrain::Coastal => {
            if loc.province.has_coasts() {
                loc.coast != Coast::None
            } else {
                loc.coast == Coast::None
            }
        }
    }
}
