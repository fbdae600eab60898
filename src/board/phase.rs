//! Game phases.
//!
//! A phase is a (season, year, kind) triple. The derived ordering is the
//! play order within and across years: `S1901M < S1901R < F1901M <
//! F1901R < W1901A < S1902M`, which makes phases usable as sorted history
//! keys. Retreat and adjustment phases are elided by the sequencer when
//! nothing needs to happen in them.

use std::fmt;
use std::str::FromStr;

use crate::error::GameError;

/// The season of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Spring,
    Fall,
    Winter,
}

impl Season {
    pub const fn letter(self) -> char {
        match self {
            Season::Spring => 'S',
            Season::Fall => 'F',
            Season::Winter => 'W',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Season::Spring => "SPRING",
            Season::Fall => "FALL",
            Season::Winter => "WINTER",
        }
    }
}

/// The kind of a phase, deciding which solver adjudicates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PhaseKind {
    Movement,
    Retreat,
    Adjustment,
}

impl PhaseKind {
    pub const fn letter(self) -> char {
        match self {
            PhaseKind::Movement => 'M',
            PhaseKind::Retreat => 'R',
            PhaseKind::Adjustment => 'A',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PhaseKind::Movement => "MOVEMENT",
            PhaseKind::Retreat => "RETREAT",
            PhaseKind::Adjustment => "ADJUSTMENT",
        }
    }
}

/// A fully qualified phase such as spring 1901 movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Phase {
    pub season: Season,
    pub year: u16,
    pub kind: PhaseKind,
}

impl Phase {
    pub const fn new(season: Season, year: u16, kind: PhaseKind) -> Self {
        Phase { season, year, kind }
    }

    /// The opening phase of a standard game.
    pub const fn initial() -> Self {
        Phase::new(Season::Spring, 1901, PhaseKind::Movement)
    }

    /// Short form, e.g. `S1901M`.
    pub fn short(&self) -> String {
        format!("{}{}{}", self.season.letter(), self.year, self.kind.letter())
    }

    /// Long form, e.g. `SPRING 1901 MOVEMENT`.
    pub fn long(&self) -> String {
        format!("{} {} {}", self.season.name(), self.year, self.kind.name())
    }
}

impl PartialOrd for Phase {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Phase {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.year, self.season, self.kind).cmp(&(other.year, other.season, other.kind))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short())
    }
}

impl FromStr for Phase {
    type Err = GameError;

    /// Accepts either the short form `S1901M` or the long form
    /// `SPRING 1901 MOVEMENT`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || GameError::Lookup {
            kind: "phase",
            value: s.to_string(),
        };
        let t = s.trim().to_ascii_uppercase();

        let parts: Vec<&str> = t.split_whitespace().collect();
        if parts.len() == 3 {
            let season = match parts[0] {
                "SPRING" => Season::Spring,
                "FALL" => Season::Fall,
                "WINTER" => Season::Winter,
                _ => return Err(bad()),
            };
            let year: u16 = parts[1].parse().map_err(|_| bad())?;
            let kind = match parts[2] {
                "MOVEMENT" => PhaseKind::Movement,
                "RETREAT" => PhaseKind::Retreat,
                "ADJUSTMENT" => PhaseKind::Adjustment,
                _ => return Err(bad()),
            };
            return Ok(Phase::new(season, year, kind));
        }

        if parts.len() != 1 || t.len() < 3 {
            return Err(bad());
        }
        let mut chars = t.chars();
        let season = match chars.next() {
            Some('S') => Season::Spring,
            Some('F') => Season::Fall,
            Some('W') => Season::Winter,
            _ => return Err(bad()),
        };
        let kind = match t.chars().last() {
            Some('M') => PhaseKind::Movement,
            Some('R') => PhaseKind::Retreat,
            Some('A') => PhaseKind::Adjustment,
            _ => return Err(bad()),
        };
        let year: u16 = t[1..t.len() - 1].parse().map_err(|_| bad())?;
        Ok(Phase::new(season, year, kind))
    }
}
