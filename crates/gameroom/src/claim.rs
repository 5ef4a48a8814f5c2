use super::*;
use rbs_cards::*;
use rbs_core::*;
use tokio::sync::oneshot;

/// One token of a claim: the slot and the card seen there when the token
/// was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pick {
    pub slot: Slot,
    pub card: Card,
}

impl From<Mark> for Pick {
    fn from(mark: Mark) -> Self {
        Self {
            slot: mark.slot,
            card: mark.card,
        }
    }
}

impl std::fmt::Display for Pick {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "#{}={}", self.slot, self.card)
    }
}

/// Outcome of an adjudication, handed back to the claiming player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The board changed under the claim. The listed slots no longer show
    /// the card the player saw; drop exactly those tokens and carry on.
    Stale(Vec<Slot>),
    /// Accepted. The three cards have left the board.
    Point,
    /// Rejected by the rules.
    Penalty,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Verdict::Stale(slots) => write!(f, "stale {:?}", slots),
            Verdict::Point => write!(f, "point"),
            Verdict::Penalty => write!(f, "penalty"),
        }
    }
}

/// A player's snapshot of three tokens, submitted for adjudication.
///
/// Consumed exactly once: [`Claim::resolve`] takes it by value. Dropping an
/// unresolved claim wakes the player with a closed channel, which it treats
/// like cancellation.
#[derive(Debug)]
pub struct Claim {
    player: PlayerId,
    picks: [Pick; SET_SIZE],
    reply: oneshot::Sender<Verdict>,
}

impl Claim {
    pub fn new(player: PlayerId, picks: [Pick; SET_SIZE]) -> (Self, oneshot::Receiver<Verdict>) {
        let (reply, verdict) = oneshot::channel();
        let claim = Self {
            player,
            picks,
            reply,
        };
        (claim, verdict)
    }
    pub fn player(&self) -> PlayerId {
        self.player
    }
    pub fn picks(&self) -> &[Pick; SET_SIZE] {
        &self.picks
    }
    pub fn slots(&self) -> [Slot; SET_SIZE] {
        self.picks.map(|p| p.slot)
    }
    /// The claimed cards in submission order.
    pub fn cards(&self) -> Triple {
        self.picks.map(|p| p.card)
    }
    pub fn resolve(self, verdict: Verdict) {
        if self.reply.send(verdict).is_err() {
            log::debug!("[dealer] P{} left before its verdict", self.player);
        }
    }
}

impl std::fmt::Display for Claim {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let [a, b, c] = &self.picks;
        write!(f, "P{} claims {} {} {}", self.player, a, b, c)
    }
}
