//! Board locations: a province plus an optional coast.
//!
//! The engine distinguishes 81 locations: the 75 provinces plus the six
//! coasted variants BUL/EC, BUL/SC, SPA/NC, SPA/SC, STP/NC and STP/SC.
//! Locations carry a canonical alphabetic index 0..81 that is externally
//! visible (scoring vectors, civil-disorder tables, board hashing): each
//! coasted variant sorts immediately after its parent province, so
//! `BUL < BUL/EC < BUL/SC < BUR`.

use std::fmt;

use super::province::{Coast, Province, PROVINCE_COUNT};

/// The number of distinct locations on the standard map.
pub const LOC_COUNT: usize = 81;

/// A location: a province with an optional coast specifier.
///
/// Armies always occupy the parent location; fleets occupy the coasted
/// variant when the province has split coasts. The derived ordering is the
/// canonical alphabetic order (coast variants follow their parent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Loc {
    pub province: Province,
    pub coast: Coast,
}

impl Loc {
    /// A coastless location.
    pub const fn new(province: Province) -> Self {
        Loc { province, coast: Coast::None }
    }

    /// A location with an explicit coast.
    pub const fn with_coast(province: Province, coast: Coast) -> Self {
        Loc { province, coast }
    }

    /// The parent location, stripping any coast specifier.
    pub const fn parent(self) -> Loc {
        Loc::new(self.province)
    }

    /// The canonical alphabetic index of this location, 0..81.
    ///
    /// Provinces up to BUL keep their province index; each split-coast
    /// province (BUL, SPA, STP) shifts everything after it by two.
    pub const fn index(self) -> usize {
        let p = self.province as usize;
        let base = if p <= Province::Bul as usize {
            p
        } else if p <= Province::Spa as usize {
            p + 2
        } else if p == Province::Stp as usize {
            p + 4
        } else {
            p + 6
        };
        base + match self.coast {
            Coast::None => 0,
            Coast::East | Coast::North => 1,
            Coast::South => 2,
        }
    }

    /// The location at the given canonical index.
    pub const fn from_index(idx: usize) -> Option<Loc> {
        if idx >= LOC_COUNT {
            return None;
        }
        let bul = Province::Bul as usize;
        let spa = Province::Spa as usize;
        let stp = Province::Stp as usize;
        let (prov_idx, coast) = if idx <= bul {
            (idx, Coast::None)
        } else if idx == bul + 1 {
            (bul, Coast::East)
        } else if idx == bul + 2 {
            (bul, Coast::South)
        } else if idx <= spa + 2 {
            (idx - 2, Coast::None)
        } else if idx == spa + 3 {
            (spa, Coast::North)
        } else if idx == spa + 4 {
            (spa, Coast::South)
        } else if idx == stp + 4 {
            (stp, Coast::None)
        } else if idx == stp + 5 {
            (stp, Coast::North)
        } else if idx == stp + 6 {
            (stp, Coast::South)
        } else {
            (idx - 6, Coast::None)
        };
        match Province::from_u8(prov_idx as u8) {
            Some(province) => Some(Loc { province, coast }),
            None => None,
        }
    }

    /// Parses a location from text like `PAR` or `STP/NC`, case-insensitively.
    pub fn from_str_loose(s: &str) -> Option<Loc> {
        let (prov, coast) = match s.split_once('/') {
            Some((p, c)) => (p, Coast::from_abbr(c)?),
            None => (s, Coast::None),
        };
        let province = Province::from_abbr(prov)?;
        if coast != Coast::None && !coast_is_valid(province, coast) {
            return None;
        }
        Some(Loc { province, coast })
    }
}

/// True if `coast` is one of the province's declared split coasts.
fn coast_is_valid(province: Province, coast: Coast) -> bool {
    province.coasts().contains(&coast)
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.coast == Coast::None {
            write!(f, "{}", self.province.abbr())
        } else {
            write!(f, "{}/{}", self.province.abbr(), self.coast.abbr())
        }
    }
}

/// Iterates all 81 locations in canonical index order.
pub fn all_locs() -> impl Iterator<Item = Loc> {
    (0..LOC_COUNT).filter_map(Loc::from_index)
}

/// The canonical index of a province's coastless location.
pub const fn province_loc_index(province: Province) -> usize {
    Loc::new(province).index()
}
