//! Board representation and game-state types.
//!
//! Provinces, locations, the adjacency graph, units, orders, phases, and
//! the `GameState` snapshot, plus the startup-derived civil-disorder
//! distance tables.

pub mod adjacency;
pub mod distance;
pub mod loc;
pub mod order;
pub mod phase;
pub mod province;
pub mod state;
pub mod unit;

pub use adjacency::{edges_from, fleet_dest_coasts, is_adjacent, neighbors, Edge, EDGES, EDGE_COUNT};
pub use distance::{disband_distance, INELIGIBLE};
pub use loc::{all_locs, Loc, LOC_COUNT};
pub use order::Order;
pub use phase::{Phase, PhaseKind, Season};
pub use province::{
    Coast, Power, Province, Terrain, ALL_POWERS, ALL_PROVINCES, POWER_COUNT, PROVINCE_COUNT,
    SUPPLY_CENTER_COUNT,
};
pub use state::{DislodgedUnit, GameState};
pub use unit::{OrderUnit, Unit, UnitType};
