//! Engine error types.
//!
//! A solver failure is fatal to the in-progress transition only: the game
//! stays in its pre-transition state and callers may roll back or resubmit.
//! Individual malformed orders never surface here; they are retained with
//! their validity flag cleared and adjudicated as holds.

use thiserror::Error;

/// Errors produced by the public engine API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// Malformed order text. Only returned by direct parser entry points;
    /// `set_orders` stores the order as invalid instead.
    #[error("cannot parse order '{0}'")]
    Parse(String),

    /// Unknown power or phase name in an API call.
    #[error("unknown {kind} '{value}'")]
    Lookup { kind: &'static str, value: String },

    /// Operation not legal in the game's current situation, e.g. processing
    /// a finished game or rolling back to a phase that is not in history.
    #[error("{0}")]
    IllegalState(String),

    /// A convoy paradox was hit while `exception_on_convoy_paradox` is set.
    #[error("convoy paradox in {phase}")]
    Paradox { phase: String },

    /// A JSON snapshot failed to load or was internally inconsistent.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}
