//! Async runtime for live set games.
//!
//! One dealer task arbitrates claims from many concurrent player tasks that
//! race for cards on a small shared board, under a round timer.
//!
//! ## Architecture
//!
//! - [`Game`] / [`GameHandle`] — Entry points: seat players, start, press, terminate
//! - [`Dealer`] — Round lifecycle and single-consumer claim adjudication
//! - [`Board`] — Shared card slots and tokens, bulk access via [`Exclusive`]
//! - [`Player`] — Per-player agent turning presses into tokens and claims
//! - [`Driver`] — Feeds a [`Bot`]'s choices into its player's pending queue
//! - [`Seat`] — Shared handle on a player: score, availability, input gate
//! - [`Channel`] — The claim queue
//!
//! ## Protocol
//!
//! - [`Claim`] — Three (slot, card) picks, answered through a one-shot [`Verdict`]
//! - [`Timer`] — Round deadline
//! - [`Screen`] — Display capability, with [`Event`] as its wire form
mod board;
mod bot;
mod channel;
mod claim;
mod config;
mod dealer;
mod driver;
mod error;
mod event;
mod game;
mod player;
mod screen;
mod seat;
mod timer;

pub use board::*;
pub use bot::*;
pub use channel::*;
pub use claim::*;
pub use config::*;
pub use dealer::*;
pub use driver::*;
pub use error::*;
pub use event::*;
pub use game::*;
pub use player::*;
pub use screen::*;
pub use seat::*;
pub use timer::*;
