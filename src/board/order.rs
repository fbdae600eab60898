//! Order types for all three phase kinds.
//!
//! An order is a tagged sum covering movement (hold, move, support,
//! convoy), retreat (retreat, disband) and winter adjustment (build,
//! disband, waive). `Display` emits the canonical text form that the
//! parser in `protocol::orders` accepts; equality and hashing are derived
//! per variant.

use std::fmt;

use super::loc::Loc;
use super::unit::OrderUnit;

/// A Diplomacy order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Order {
    /// `A VIE H`
    Hold { unit: OrderUnit },

    /// `A PAR - BUR`, `F NRG - STP/NC`, or `A LON - NWY VIA` for a move
    /// that must travel by convoy.
    Move {
        unit: OrderUnit,
        dest: Loc,
        via_convoy: bool,
    },

    /// `A MUN S F KIE` -- support the target unit holding in place.
    SupportHold { unit: OrderUnit, target: OrderUnit },

    /// `A MUN S F KIE - BER` -- support the target unit's move.
    SupportMove {
        unit: OrderUnit,
        target: OrderUnit,
        dest: Loc,
    },

    /// `F MAO C A BRE - LON` -- ferry an army across this fleet's sea.
    Convoy {
        unit: OrderUnit,
        army: Loc,
        dest: Loc,
    },

    /// `A SER R ALB`
    Retreat { unit: OrderUnit, dest: Loc },

    /// `F TRI D` -- remove the unit (retreat phase or winter).
    Disband { unit: OrderUnit },

    /// `F STP/SC B` -- place a new unit at a home center.
    Build { unit: OrderUnit },

    /// `WAIVE` -- voluntarily skip one build.
    Waive,
}

impl Order {
    /// The location of the unit issuing this order, if any.
    pub fn unit_loc(&self) -> Option<Loc> {
        self.unit().map(|u| u.loc)
    }

    /// The unit issuing this order; `None` for waives.
    pub fn unit(&self) -> Option<OrderUnit> {
        match *self {
            Order::Hold { unit }
            | Order::Move { unit, .. }
            | Order::SupportHold { unit, .. }
            | Order::SupportMove { unit, .. }
            | Order::Convoy { unit, .. }
            | Order::Retreat { unit, .. }
            | Order::Disband { unit }
            | Order::Build { unit } => Some(unit),
            Order::Waive => None,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Order::Hold { unit } => write!(f, "{} H", unit),
            Order::Move { unit, dest, via_convoy } => {
                write!(f, "{} - {}", unit, dest)?;
                if via_convoy {
                    write!(f, " VIA")?;
                }
                Ok(())
            }
            Order::SupportHold { unit, target } => write!(f, "{} S {}", unit, target),
            Order::SupportMove { unit, target, dest } => {
                write!(f, "{} S {} - {}", unit, target, dest)
            }
            Order::Convoy { unit, army, dest } => {
                write!(f, "{} C A {} - {}", unit, army, dest)
            }
            Order::Retreat { unit, dest } => write!(f, "{} R {}", unit, dest),
            Order::Disband { unit } => write!(f, "{} D", unit),
            Order::Build { unit } => write!(f, "{} B", unit),
            Order::Waive => write!(f, "WAIVE"),
        }
    }
}
