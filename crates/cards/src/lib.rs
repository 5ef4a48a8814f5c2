//! Card identity, deck handling, and the set validity predicate.
//!
//! The game engine treats cards as opaque comparable values. Everything that
//! knows what a card *means* lives here, behind the [`Rules`] trait.
//!
//! ## Core Types
//!
//! - [`Card`] — A single card encoded in one byte, with four ternary features
//! - [`Deck`] — The cards not currently on the board
//! - [`Rules`] — The validity predicate for three cards
//! - [`Classic`] — The standard all-same-or-all-different predicate
mod card;
mod deck;
mod rules;

pub use card::*;
pub use deck::*;
pub use rules::*;
