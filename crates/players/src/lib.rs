//! Synthetic players.
//!
//! - [`Fish`] — Presses random slots
//! - [`Shark`] — Reads the board and presses a set when it sees one
mod fish;
mod shark;

pub use fish::*;
pub use shark::*;
