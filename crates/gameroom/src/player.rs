use super::*;
use rbs_core::*;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;
use tokio::sync::mpsc::UnboundedSender;

/// The tokens a player believes it holds, tagged with the board epoch they
/// were placed under. A newer board epoch means the dealer swept them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tokens {
    epoch: Epoch,
    picks: Vec<Pick>,
}

impl Tokens {
    /// Forgets every token placed before `epoch`.
    pub fn sync(&mut self, epoch: Epoch) {
        if epoch != self.epoch {
            self.epoch = epoch;
            self.picks.clear();
        }
    }
    pub fn contains(&self, slot: Slot) -> bool {
        self.picks.iter().any(|p| p.slot == slot)
    }
    pub fn remove(&mut self, slot: Slot) -> bool {
        let before = self.picks.len();
        self.picks.retain(|p| p.slot != slot);
        self.picks.len() < before
    }
    pub fn push(&mut self, pick: Pick) {
        debug_assert!(!self.is_full());
        debug_assert!(!self.contains(pick.slot));
        self.picks.push(pick);
    }
    pub fn clear(&mut self) {
        self.picks.clear();
    }
    pub fn len(&self) -> usize {
        self.picks.len()
    }
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }
    pub fn is_full(&self) -> bool {
        self.picks.len() >= SET_SIZE
    }
    pub fn slots(&self) -> Vec<Slot> {
        self.picks.iter().map(|p| p.slot).collect()
    }
    /// The three picks in placement order, once complete.
    pub fn triple(&self) -> Option<[Pick; SET_SIZE]> {
        <[Pick; SET_SIZE]>::try_from(self.picks.as_slice()).ok()
    }
}

/// Player agent. Runs as its own task.
///
/// Drains the pending queue one slot at a time, toggling tokens on the
/// board. The third token turns into a [`Claim`]; the agent then stops
/// taking input until the dealer's [`Verdict`] arrives, serves any freeze,
/// and becomes ready again.
pub struct Player {
    seat: Arc<Seat>,
    inbox: Receiver<Slot>,
    claims: UnboundedSender<Claim>,
    board: Arc<Board>,
    screen: Arc<dyn Screen>,
    point_freeze: Duration,
    penalty_freeze: Duration,
    tokens: Tokens,
}

impl Player {
    pub fn new(
        seat: Arc<Seat>,
        inbox: Receiver<Slot>,
        claims: UnboundedSender<Claim>,
        board: Arc<Board>,
        screen: Arc<dyn Screen>,
        config: &Config,
    ) -> Self {
        Self {
            seat,
            inbox,
            claims,
            board,
            screen,
            point_freeze: config.point_freeze,
            penalty_freeze: config.penalty_freeze,
            tokens: Tokens::default(),
        }
    }
    pub fn id(&self) -> PlayerId {
        self.seat.id()
    }
    pub fn tokens(&self) -> &Tokens {
        &self.tokens
    }
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }
    pub async fn run(mut self) {
        log::info!("[player P{}] started", self.id());
        loop {
            let slot = tokio::select! {
                biased;
                _ = self.seat.cancelled() => break,
                slot = self.inbox.recv() => match slot {
                    Some(slot) => slot,
                    None => break,
                },
            };
            if self.handle(slot).await.is_break() {
                break;
            }
        }
        log::info!("[player P{}] stopped", self.id());
    }
}

impl Player {
    /// Toggles the token on `slot`, claiming when it is the third.
    pub async fn handle(&mut self, slot: Slot) -> ControlFlow<()> {
        let id = self.id();
        self.tokens.sync(self.board.epoch());
        if self.tokens.remove(slot) {
            self.board.remove_token(id, slot);
            log::trace!("[player P{}] lifted #{}", id, slot);
            return ControlFlow::Continue(());
        }
        if self.tokens.is_full() {
            log::trace!("[player P{}] fourth token on #{} ignored", id, slot);
            return ControlFlow::Continue(());
        }
        let Some(mark) = self.board.place_token(id, slot) else {
            log::trace!("[player P{}] #{} emptied before the token landed", id, slot);
            return ControlFlow::Continue(());
        };
        self.tokens.sync(mark.epoch);
        self.tokens.push(Pick::from(mark));
        log::trace!("[player P{}] marked #{} ({})", id, slot, mark.card);
        match self.tokens.triple() {
            Some(picks) => self.claim(picks).await,
            None => ControlFlow::Continue(()),
        }
    }

    async fn claim(&mut self, picks: [Pick; SET_SIZE]) -> ControlFlow<()> {
        let id = self.id();
        self.seat.set_ready(false);
        let (claim, verdict) = Claim::new(id, picks);
        log::debug!("[player P{}] submits {}", id, claim);
        if self.claims.send(claim).is_err() {
            log::debug!("[player P{}] dealer is gone", id);
            return ControlFlow::Break(());
        }
        let verdict = tokio::select! {
            biased;
            _ = self.seat.cancelled() => return ControlFlow::Break(()),
            verdict = verdict => match verdict {
                Ok(verdict) => verdict,
                Err(_) => return ControlFlow::Break(()),
            },
        };
        log::debug!("[player P{}] verdict: {}", id, verdict);
        match verdict {
            Verdict::Stale(slots) => slots.into_iter().for_each(|slot| {
                self.tokens.remove(slot);
                self.board.remove_token(id, slot);
            }),
            Verdict::Point => {
                let flow = self.freeze(self.point_freeze).await;
                self.tokens.clear();
                let score = self.seat.reward();
                self.screen.set_score(id, score);
                flow?;
            }
            Verdict::Penalty => self.freeze(self.penalty_freeze).await?,
        }
        self.seat.set_ready(true);
        ControlFlow::Continue(())
    }

    /// Sleeps through a freeze, showing the remaining time once per
    /// [`FREEZE_TICK`].
    async fn freeze(&self, duration: Duration) -> ControlFlow<()> {
        let id = self.id();
        let tick = Duration::from_millis(FREEZE_TICK);
        let mut remaining = duration;
        while !remaining.is_zero() {
            self.screen.set_freeze(id, remaining);
            let step = remaining.min(tick);
            tokio::select! {
                biased;
                _ = self.seat.cancelled() => return ControlFlow::Break(()),
                _ = tokio::time::sleep(step) => remaining -= step,
            }
        }
        self.screen.set_freeze(id, Duration::ZERO);
        ControlFlow::Continue(())
    }
}
