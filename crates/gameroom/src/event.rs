use rbs_cards::*;
use rbs_core::*;
use serde::Serialize;
use std::time::Duration;

/// Display events emitted by the board, the dealer, and the players.
/// Each variant is one call on the display capability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A card was dealt into a slot.
    CardShown { slot: Slot, card: Card },
    /// A slot lost its card.
    SlotCleared { slot: Slot },
    /// A player marked a slot.
    TokenShown { player: PlayerId, slot: Slot },
    /// A player's mark was removed.
    TokenCleared { player: PlayerId, slot: Slot },
    /// A player's score changed.
    Score { player: PlayerId, score: Score },
    /// A player is frozen for this much longer (zero when released).
    Freeze {
        player: PlayerId,
        #[serde(with = "crate::config::millis")]
        remaining: Duration,
    },
    /// Time left until the board is reshuffled.
    Countdown {
        #[serde(with = "crate::config::millis")]
        remaining: Duration,
        warning: bool,
    },
    /// The game ended with these players sharing the best score.
    Winners { players: Vec<PlayerId> },
}

impl Event {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Event::CardShown { slot, card } => write!(f, "#{}: {}", slot, card),
            Event::SlotCleared { slot } => write!(f, "#{}: empty", slot),
            Event::TokenShown { player, slot } => write!(f, "P{} marks #{}", player, slot),
            Event::TokenCleared { player, slot } => write!(f, "P{} unmarks #{}", player, slot),
            Event::Score { player, score } => write!(f, "P{} scores {}", player, score),
            Event::Freeze { player, remaining } if remaining.is_zero() => {
                write!(f, "P{} thawed", player)
            }
            Event::Freeze { player, remaining } => {
                write!(f, "P{} frozen {}s", player, remaining.as_secs_f32().ceil())
            }
            Event::Countdown { remaining, warning } => write!(
                f,
                "{}{:.1}s left",
                if *warning { "!! " } else { "" },
                remaining.as_secs_f32()
            ),
            Event::Winners { players } => {
                let s = players
                    .iter()
                    .map(|p| format!("P{}", p))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Winners: {}", s)
            }
        }
    }
}
