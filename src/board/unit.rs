//! Unit types and unit references.

use std::fmt;

use super::loc::Loc;
use super::province::{Power, Terrain};

/// The type of a military unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitType {
    Army,
    Fleet,
}

impl UnitType {
    /// Canonical single-letter abbreviation used in order text.
    pub const fn letter(self) -> char {
        match self {
            UnitType::Army => 'A',
            UnitType::Fleet => 'F',
        }
    }

    /// Parses the single-letter abbreviation, case-insensitively.
    pub fn from_letter(c: char) -> Option<UnitType> {
        match c.to_ascii_uppercase() {
            'A' => Some(UnitType::Army),
            'F' => Some(UnitType::Fleet),
            _ => None,
        }
    }

    /// True if a unit of this type may occupy the given terrain.
    pub const fn can_occupy(self, terrain: Terrain) -> bool {
        !matches!(
            (self, terrain),
            (UnitType::Army, Terrain::Sea) | (UnitType::Fleet, Terrain::Inland)
        )
    }
}

/// A unit reference as it appears inside an order: type plus location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderUnit {
    pub unit_type: UnitType,
    pub loc: Loc,
}

impl OrderUnit {
    pub const fn new(unit_type: UnitType, loc: Loc) -> Self {
        OrderUnit { unit_type, loc }
    }
}

impl fmt::Display for OrderUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.unit_type.letter(), self.loc)
    }
}

/// A unit on the board together with its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unit {
    pub power: Power,
    pub unit_type: UnitType,
    pub loc: Loc,
}
