use super::*;
use rbs_core::*;
use std::sync::Arc;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tokio_util::sync::WaitForCancellationFuture;

/// Why a press was not queued. None of these are failures; they are the
/// ordinary outcome of contention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Refusal {
    #[error("player has left the table")]
    Gone,
    #[error("board is being dealt")]
    Locked,
    #[error("player is frozen or awaiting a verdict")]
    Frozen,
    #[error("slot holds no card")]
    Vacant,
    #[error("pending queue is full")]
    Full,
}

/// Result of feeding a slot press to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    Queued,
    Dropped(Refusal),
}

/// The shared face of one player: identity, score, availability, the
/// sending half of its pending queue, and its termination token.
///
/// The player agent, its driver, the dealer, and the game handle all hold
/// an `Arc<Seat>`. Only the player agent writes `ready` and `score`.
pub struct Seat {
    id: PlayerId,
    human: bool,
    score: AtomicU32,
    ready: watch::Sender<bool>,
    inbox: mpsc::Sender<Slot>,
    board: Arc<Board>,
    token: CancellationToken,
}

impl Seat {
    pub fn new(
        id: PlayerId,
        human: bool,
        board: Arc<Board>,
        token: CancellationToken,
    ) -> (Self, mpsc::Receiver<Slot>) {
        let (inbox, rx) = mpsc::channel(PENDING);
        let seat = Self {
            id,
            human,
            score: AtomicU32::new(0),
            ready: watch::Sender::new(true),
            inbox,
            board,
            token,
        };
        (seat, rx)
    }
    pub fn id(&self) -> PlayerId {
        self.id
    }
    pub fn is_human(&self) -> bool {
        self.human
    }
    pub fn score(&self) -> Score {
        self.score.load(Ordering::Acquire)
    }
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }
    /// Free slots in the pending queue.
    #[cfg(test)]
    pub(crate) fn room(&self) -> usize {
        self.inbox.capacity()
    }
}

/// Input.
impl Seat {
    /// Whether a press on `slot` would be accepted right now, ignoring
    /// queue capacity.
    pub fn admits(&self, slot: Slot) -> Result<(), Refusal> {
        if self.token.is_cancelled() {
            Err(Refusal::Gone)
        } else if !self.board.is_open() {
            Err(Refusal::Locked)
        } else if !self.is_ready() {
            Err(Refusal::Frozen)
        } else if self.board.card(slot).is_none() {
            Err(Refusal::Vacant)
        } else {
            Ok(())
        }
    }
    /// Queues a press if the player can take it, dropping it otherwise.
    pub fn press(&self, slot: Slot) -> Press {
        let queued = self.admits(slot).and_then(|()| {
            self.inbox.try_send(slot).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => Refusal::Full,
                mpsc::error::TrySendError::Closed(_) => Refusal::Gone,
            })
        });
        match queued {
            Ok(()) => {
                log::trace!("[player P{}] queued #{}", self.id, slot);
                Press::Queued
            }
            Err(refusal) => {
                log::trace!("[player P{}] dropped #{}: {}", self.id, slot, refusal);
                Press::Dropped(refusal)
            }
        }
    }
    /// Waits until the board is open and the player is ready.
    /// Returns false if the seat is terminated first.
    pub async fn available(&self) -> bool {
        let mut open = self.board.opened();
        let mut ready = self.ready.subscribe();
        loop {
            if self.token.is_cancelled() {
                return false;
            }
            if *open.borrow_and_update() && *ready.borrow_and_update() {
                return true;
            }
            tokio::select! {
                biased;
                _ = self.token.cancelled() => return false,
                r = open.changed() => if r.is_err() { return false },
                r = ready.changed() => if r.is_err() { return false },
            }
        }
    }
    /// Waits for a free place in the pending queue.
    /// Returns `None` once the player has stopped listening.
    pub async fn reserve(&self) -> Option<mpsc::Permit<'_, Slot>> {
        self.inbox.reserve().await.ok()
    }
}

/// State owned by the player agent.
impl Seat {
    pub(crate) fn set_ready(&self, ready: bool) {
        self.ready.send_replace(ready);
    }
    /// Adds one point and returns the new score.
    pub(crate) fn reward(&self) -> Score {
        self.score.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Termination.
impl Seat {
    pub fn terminate(&self) {
        self.token.cancel();
    }
    pub fn is_terminated(&self) -> bool {
        self.token.is_cancelled()
    }
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

impl std::fmt::Debug for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Seat")
            .field("id", &self.id)
            .field("human", &self.human)
            .field("score", &self.score())
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbs_cards::Card;

    fn seat() -> (Seat, mpsc::Receiver<Slot>) {
        let board = Arc::new(Board::new(4, Arc::new(Silent)));
        board.place_card(Card::from(0), 0).unwrap();
        board.place_card(Card::from(1), 1).unwrap();
        Seat::new(0, true, board, CancellationToken::new())
    }

    #[test]
    fn locked_until_board_opens() {
        let (seat, _rx) = seat();
        assert_eq!(seat.press(0), Press::Dropped(Refusal::Locked));
        seat.board.open();
        assert_eq!(seat.press(0), Press::Queued);
    }

    #[test]
    fn empty_slots_are_ignored() {
        let (seat, _rx) = seat();
        seat.board.open();
        assert_eq!(seat.press(3), Press::Dropped(Refusal::Vacant));
        assert_eq!(seat.press(42), Press::Dropped(Refusal::Vacant));
    }

    #[test]
    fn pending_queue_holds_three() {
        let (seat, mut rx) = seat();
        seat.board.open();
        assert_eq!(seat.press(0), Press::Queued);
        assert_eq!(seat.press(1), Press::Queued);
        assert_eq!(seat.press(0), Press::Queued);
        assert_eq!(seat.room(), 0);
        assert_eq!(seat.press(1), Press::Dropped(Refusal::Full));
        assert_eq!(rx.try_recv().ok(), Some(0));
        assert_eq!(seat.press(1), Press::Queued);
    }

    #[test]
    fn frozen_and_gone_players_drop_input() {
        let (seat, _rx) = seat();
        seat.board.open();
        seat.set_ready(false);
        assert_eq!(seat.press(0), Press::Dropped(Refusal::Frozen));
        seat.set_ready(true);
        seat.terminate();
        assert_eq!(seat.press(0), Press::Dropped(Refusal::Gone));
    }

    #[test]
    fn reward_counts_up() {
        let (seat, _rx) = seat();
        assert_eq!(seat.reward(), 1);
        assert_eq!(seat.reward(), 2);
        assert_eq!(seat.score(), 2);
    }

    #[tokio::test]
    async fn available_waits_for_gate_and_readiness() {
        let (seat, _rx) = seat();
        let seat = Arc::new(seat);
        seat.set_ready(false);
        let waiter = tokio::spawn({
            let seat = seat.clone();
            async move { seat.available().await }
        });
        tokio::task::yield_now().await;
        seat.board.open();
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());
        seat.set_ready(true);
        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn available_yields_to_termination() {
        let (seat, _rx) = seat();
        let seat = Arc::new(seat);
        let waiter = tokio::spawn({
            let seat = seat.clone();
            async move { seat.available().await }
        });
        tokio::task::yield_now().await;
        seat.terminate();
        assert!(!waiter.await.unwrap());
    }
}
