//! Entente rules-engine library.
//!
//! Exposes the board representation, the three phase solvers, legal-order
//! enumeration, and the top-level `Game` aggregate that stages orders,
//! adjudicates one phase at a time, and keeps a replayable history.

pub mod board;
pub mod clock;
pub mod error;
pub mod game;
pub mod movegen;
pub mod protocol;
pub mod resolve;

pub use error::GameError;
pub use game::Game;
