use super::*;
use rbs_core::*;
use std::sync::Arc;
use std::time::Duration;

/// Task that feeds a [`Bot`]'s choices into its player's pending queue.
///
/// - waits while the board is closed or the player is frozen
/// - waits for queue room, woken as soon as the player drains a press
/// - asks the bot for a slot and queues it through the same gate as a human
pub struct Driver {
    seat: Arc<Seat>,
    board: Arc<Board>,
    bot: Box<dyn Bot>,
}

impl Driver {
    pub fn new(seat: Arc<Seat>, board: Arc<Board>, bot: Box<dyn Bot>) -> Self {
        Self { seat, board, bot }
    }
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }
    async fn run(mut self) {
        let id = self.seat.id();
        log::info!("[driver P{}] started", id);
        while self.step().await {}
        log::info!("[driver P{}] stopped", id);
    }
    /// One press. Returns false once the seat is terminated.
    async fn step(&mut self) -> bool {
        let id = self.seat.id();
        if !self.seat.available().await {
            return false;
        }
        let permit = tokio::select! {
            biased;
            _ = self.seat.cancelled() => return false,
            permit = self.seat.reserve() => match permit {
                Some(permit) => permit,
                None => return false,
            },
        };
        let choice = tokio::select! {
            biased;
            _ = self.seat.cancelled() => return false,
            choice = self.bot.choose(id, &self.board) => choice,
        };
        match choice.map(|slot| (slot, self.seat.admits(slot))) {
            Some((slot, Ok(()))) => {
                log::trace!("[driver P{}] presses #{}", id, slot);
                permit.send(slot);
                true
            }
            Some((slot, Err(refusal))) => {
                log::trace!("[driver P{}] #{} refused: {}", id, slot, refusal);
                drop(permit);
                self.backoff().await
            }
            None => {
                drop(permit);
                self.backoff().await
            }
        }
    }
    async fn backoff(&mut self) -> bool {
        tokio::select! {
            biased;
            _ = self.seat.cancelled() => false,
            _ = tokio::time::sleep(Duration::from_millis(BOT_BACKOFF)) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbs_cards::Card;
    use tokio_util::sync::CancellationToken;

    /// Presses the same slot forever.
    struct Stubborn(Slot);

    #[async_trait::async_trait]
    impl Bot for Stubborn {
        async fn choose(&mut self, _: PlayerId, _: &Board) -> Option<Slot> {
            Some(self.0)
        }
    }

    /// Passes a few times before settling on a slot. Not `Sync`.
    struct Hesitant {
        passes: std::cell::Cell<usize>,
        slot: Slot,
    }

    #[async_trait::async_trait]
    impl Bot for Hesitant {
        async fn choose(&mut self, _: PlayerId, _: &Board) -> Option<Slot> {
            let passes = self.passes.get();
            self.passes.set(passes.saturating_sub(1));
            (passes == 0).then_some(self.slot)
        }
    }

    struct Table {
        board: Arc<Board>,
        seat: Arc<Seat>,
        inbox: tokio::sync::mpsc::Receiver<Slot>,
        driver: Driver,
    }

    fn table(slot: Slot) -> Table {
        let board = Arc::new(Board::new(3, Arc::new(Silent)));
        board.place_card(Card::from(0), 0).unwrap();
        let (seat, inbox) = Seat::new(0, false, board.clone(), CancellationToken::new());
        let seat = Arc::new(seat);
        let driver = Driver::new(seat.clone(), board.clone(), Box::new(Stubborn(slot)));
        Table {
            board,
            seat,
            inbox,
            driver,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fills_the_queue_then_waits() {
        let Table {
            board,
            seat,
            mut inbox,
            driver,
        } = table(0);
        board.open();
        let task = driver.spawn();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(seat.room(), 0);
        assert_eq!(inbox.recv().await, Some(0));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(seat.room(), 0);
        seat.terminate();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn idles_while_the_board_is_closed() {
        let Table {
            seat,
            inbox,
            driver,
            ..
        } = table(0);
        let task = driver.spawn();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(inbox.len(), 0);
        seat.terminate();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn backs_off_until_the_bot_decides() {
        let Table {
            board, seat, mut inbox, ..
        } = table(0);
        board.open();
        let bot = Hesitant {
            passes: std::cell::Cell::new(2),
            slot: 0,
        };
        let task = Driver::new(seat.clone(), board.clone(), Box::new(bot)).spawn();
        tokio::time::sleep(Duration::from_millis(BOT_BACKOFF)).await;
        assert_eq!(inbox.len(), 0);
        assert_eq!(inbox.recv().await, Some(0));
        seat.terminate();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn refused_choices_are_not_queued() {
        let Table {
            board,
            seat,
            inbox,
            driver,
        } = table(2);
        board.open();
        let task = driver.spawn();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(inbox.len(), 0);
        seat.terminate();
        task.await.unwrap();
    }
}
