use super::*;
use rand::seq::SliceRandom;
use rbs_cards::*;
use rbs_core::*;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// The arbiter. Owns the deck, the round timer, and the receiving end of
/// the claim queue, and runs as a single task.
///
/// Each round: deal under exclusive board access, open the board, count
/// down while adjudicating claims one at a time in submission order, close
/// the board, and sweep every card back into the deck. The game ends when
/// the deck holds no set or termination is requested; the best scores are
/// announced and every player is stopped and joined in reverse seating
/// order.
pub struct Dealer {
    config: Config,
    rules: Arc<dyn Rules>,
    screen: Arc<dyn Screen>,
    board: Arc<Board>,
    deck: Deck,
    discard: Vec<Card>,
    timer: Timer,
    claims: Channel<Claim>,
    seats: Vec<Arc<Seat>>,
    lineup: Vec<(Player, Option<Driver>)>,
    tasks: Vec<(JoinHandle<()>, Option<JoinHandle<()>>)>,
    token: CancellationToken,
    round: usize,
}

impl Dealer {
    pub fn new(
        config: Config,
        rules: Arc<dyn Rules>,
        screen: Arc<dyn Screen>,
        token: CancellationToken,
    ) -> Self {
        Self {
            board: Arc::new(Board::new(config.slots, screen.clone())),
            deck: Deck::new(config.deck_size),
            discard: Vec::new(),
            timer: Timer::new(&config),
            claims: Channel::default(),
            seats: Vec::new(),
            lineup: Vec::new(),
            tasks: Vec::new(),
            round: 0,
            config,
            rules,
            screen,
            token,
        }
    }
    /// Seats a player, driven by `bot` or by a human through
    /// [`Seat::press`]. Ids are handed out in seating order from zero.
    pub fn sit(&mut self, bot: Option<Box<dyn Bot>>) -> Arc<Seat> {
        let id = self.seats.len();
        let (seat, inbox) = Seat::new(
            id,
            bot.is_none(),
            self.board.clone(),
            self.token.child_token(),
        );
        let seat = Arc::new(seat);
        let player = Player::new(
            seat.clone(),
            inbox,
            self.claims.sender(),
            self.board.clone(),
            self.screen.clone(),
            &self.config,
        );
        let driver = bot.map(|bot| Driver::new(seat.clone(), self.board.clone(), bot));
        self.seats.push(seat.clone());
        self.lineup.push((player, driver));
        seat
    }
    pub fn board(&self) -> Arc<Board> {
        self.board.clone()
    }
    pub fn seats(&self) -> &[Arc<Seat>] {
        &self.seats
    }
    /// Cards on the board, in the deck, and won so far. Always sums to the
    /// configured deck size.
    pub fn census(&self) -> (usize, usize, usize) {
        (self.board.occupied(), self.deck.len(), self.discard.len())
    }
}

/// Round lifecycle.
impl Dealer {
    /// Plays until the deck is out of sets or the game is cancelled.
    /// Returns the winners.
    pub async fn run(mut self) -> Vec<PlayerId> {
        log::info!(
            "[dealer] {} players, {} cards, {} slots",
            self.seats.len(),
            self.deck.len(),
            self.board.slots()
        );
        while !self.should_finish() {
            self.deal();
            self.launch();
            self.board.open();
            self.timer.reset();
            self.screen.set_countdown(self.timer.remaining(), false);
            self.countdown().await;
            self.board.close();
            self.timer.clear();
            self.reshuffle();
        }
        let winners = self.winners();
        log::info!("[dealer] game over after {} rounds, winners {:?}", self.round, winners);
        self.screen.announce_winners(&winners);
        self.shutdown().await;
        winners
    }

    fn should_finish(&self) -> bool {
        if self.token.is_cancelled() {
            log::info!("[dealer] termination requested");
            true
        } else if !self.rules.has_set(self.deck.cards()) {
            log::info!("[dealer] no set left among {} cards", self.deck.len());
            true
        } else {
            false
        }
    }

    /// Clears every token and deals into every empty slot, in random order.
    fn deal(&mut self) {
        self.round += 1;
        let mut bulk = self.board.exclusive();
        bulk.wipe_tokens();
        self.deck.shuffle();
        let mut vacant = bulk.vacant();
        vacant.shuffle(&mut rand::rng());
        for slot in vacant {
            let Some(card) = self.deck.draw() else {
                break;
            };
            if let Err(e) = bulk.place_card(card, slot) {
                log::warn!("[dealer] {}", e);
                self.deck.push(card);
            }
        }
        log::info!(
            "[dealer] round {} dealt, {} cards left in deck",
            self.round,
            self.deck.len()
        );
    }

    /// Clears every token and returns every card to the deck.
    fn reshuffle(&mut self) {
        let mut bulk = self.board.exclusive();
        bulk.wipe_tokens();
        let mut slots = (0..self.board.slots()).collect::<Vec<Slot>>();
        slots.shuffle(&mut rand::rng());
        self.deck
            .extend(slots.into_iter().filter_map(|slot| bulk.remove_card(slot)));
        drop(bulk);
        self.deck.shuffle();
        log::debug!("[dealer] reshuffled, {} cards in deck", self.deck.len());
    }

    /// Starts every player that has not started yet.
    fn launch(&mut self) {
        for (player, driver) in self.lineup.drain(..) {
            self.tasks.push((player.spawn(), driver.map(Driver::spawn)));
        }
    }

    /// Runs the round clock, waking for every claim and every tick.
    async fn countdown(&mut self) {
        while !self.timer.expired() {
            let wake = self.next_tick();
            let claim = tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                claim = self.claims.rx().recv() => claim,
                _ = tokio::time::sleep_until(wake) => None,
            };
            if let Some(claim) = claim {
                self.adjudicate(claim);
            }
            self.screen
                .set_countdown(self.timer.remaining(), self.timer.warning());
        }
    }

    fn next_tick(&self) -> Instant {
        let tick = match self.timer.warning() {
            true => self.config.warning_tick,
            false => self.config.tick,
        };
        let next = Instant::now() + tick;
        self.timer.deadline().map_or(next, |deadline| deadline.min(next))
    }

    /// Judges one claim against the board as it is now and hands the
    /// verdict back to the waiting player.
    pub fn adjudicate(&mut self, claim: Claim) {
        let verdict = {
            let mut bulk = self.board.exclusive();
            let stale = claim
                .picks()
                .iter()
                .filter(|pick| bulk.card(pick.slot) != Some(pick.card))
                .map(|pick| pick.slot)
                .collect::<Vec<Slot>>();
            let [a, b, c] = claim.cards();
            if !stale.is_empty() {
                Verdict::Stale(stale)
            } else if !self.rules.is_valid_set(a, b, c) {
                Verdict::Penalty
            } else {
                for slot in claim.slots() {
                    self.discard.extend(bulk.remove_card(slot));
                }
                for slot in claim.slots() {
                    let Some(card) = self.deck.draw() else {
                        break;
                    };
                    if let Err(e) = bulk.place_card(card, slot) {
                        log::warn!("[dealer] {}", e);
                        self.deck.push(card);
                    }
                }
                self.timer.reset();
                Verdict::Point
            }
        };
        log::debug!("[dealer] {} -> {}", claim, verdict);
        claim.resolve(verdict);
    }

    /// Every player sharing the highest score, ascending by id.
    pub fn winners(&self) -> Vec<PlayerId> {
        let best = self.seats.iter().map(|s| s.score()).max();
        self.seats
            .iter()
            .filter(|s| Some(s.score()) == best)
            .map(|s| s.id())
            .collect()
    }

    /// Stops and joins every player and driver, last seated first.
    async fn shutdown(&mut self) {
        for (id, (player, driver)) in self.tasks.drain(..).enumerate().rev() {
            self.seats[id].terminate();
            if let Some(driver) = driver {
                if let Err(e) = driver.await {
                    log::warn!("[dealer] driver P{} failed: {}", id, e);
                }
            }
            if let Err(e) = player.await {
                log::warn!("[dealer] player P{} failed: {}", id, e);
            }
        }
        self.seats.iter().for_each(|seat| seat.terminate());
        self.lineup.clear();
        log::info!("[dealer] all players stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    fn dealer<R>(rules: R, deck_size: usize) -> Dealer
    where
        R: Fn(Card, Card, Card) -> bool + Send + Sync + 'static,
    {
        let config = Config {
            slots: 6,
            deck_size,
            ..Config::default()
        };
        Dealer::new(
            config,
            Arc::new(rules),
            Arc::new(Silent),
            CancellationToken::new(),
        )
    }

    fn claim(
        dealer: &Dealer,
        player: PlayerId,
        slots: [Slot; 3],
    ) -> (Claim, tokio::sync::oneshot::Receiver<Verdict>) {
        let picks = slots.map(|slot| Pick {
            slot,
            card: dealer.board.card(slot).unwrap(),
        });
        Claim::new(player, picks)
    }

    fn conserved(dealer: &Dealer) -> bool {
        let (board, deck, discard) = dealer.census();
        board + deck + discard == dealer.config.deck_size
    }

    #[test]
    fn deal_fills_every_slot() {
        let mut dealer = dealer(|_, _, _| true, 20);
        dealer.deal();
        assert_eq!(dealer.census(), (6, 14, 0));
        dealer.reshuffle();
        assert_eq!(dealer.census(), (0, 20, 0));
    }

    #[test]
    fn deal_stops_when_the_deck_runs_dry() {
        let mut dealer = dealer(|_, _, _| true, 4);
        dealer.deal();
        assert_eq!(dealer.census(), (4, 0, 0));
    }

    #[test]
    fn deal_sweeps_tokens() {
        let mut dealer = dealer(|_, _, _| true, 20);
        dealer.deal();
        dealer.board.place_token(0, 0).unwrap();
        let epoch = dealer.board.epoch();
        dealer.reshuffle();
        dealer.deal();
        assert!(dealer.board.tokens(0).is_empty());
        assert!(dealer.board.epoch() > epoch);
    }

    #[tokio::test]
    async fn valid_claim_scores_and_replaces() {
        let mut dealer = dealer(|_, _, _| true, 20);
        dealer.deal();
        let before = dealer.board.cards();
        let (claim, verdict) = claim(&dealer, 0, [0, 1, 2]);
        dealer.adjudicate(claim);
        assert_eq!(verdict.await, Ok(Verdict::Point));
        let after = dealer.board.cards();
        (0..3).for_each(|s| assert!(after[s].is_some() && after[s] != before[s]));
        (3..6).for_each(|s| assert_eq!(after[s], before[s]));
        assert_eq!(dealer.census(), (6, 11, 3));
        assert!(dealer.timer.deadline().is_some());
        assert!(conserved(&dealer));
    }

    #[tokio::test]
    async fn valid_claim_on_an_empty_deck_leaves_holes() {
        let mut dealer = dealer(|_, _, _| true, 7);
        dealer.deal();
        let (claim, verdict) = claim(&dealer, 0, [3, 4, 5]);
        dealer.adjudicate(claim);
        assert_eq!(verdict.await, Ok(Verdict::Point));
        let cards = dealer.board.cards();
        assert!(cards[3].is_some());
        assert!(cards[4].is_none());
        assert!(cards[5].is_none());
        assert_eq!(dealer.census(), (4, 0, 3));
    }

    #[tokio::test]
    async fn invalid_claim_is_penalized_in_place() {
        let mut dealer = dealer(|_, _, _| false, 20);
        dealer.deal();
        let before = dealer.board.cards();
        let (claim, verdict) = claim(&dealer, 1, [0, 1, 2]);
        dealer.adjudicate(claim);
        assert_eq!(verdict.await, Ok(Verdict::Penalty));
        assert_eq!(dealer.board.cards(), before);
        assert_eq!(dealer.census(), (6, 14, 0));
    }

    #[tokio::test]
    async fn changed_slot_makes_the_claim_stale() {
        let mut dealer = dealer(|_, _, _| true, 20);
        dealer.deal();
        let (claim, verdict) = claim(&dealer, 0, [0, 1, 2]);
        let old = dealer.board.remove_card(1).unwrap().unwrap();
        let new = dealer.deck.draw().unwrap();
        dealer.board.place_card(new, 1).unwrap();
        dealer.deck.push(old);
        let before = dealer.board.cards();
        dealer.adjudicate(claim);
        assert_eq!(verdict.await, Ok(Verdict::Stale(vec![1])));
        assert_eq!(dealer.board.cards(), before);
        assert!(conserved(&dealer));
    }

    #[tokio::test]
    async fn vanished_cards_make_the_claim_stale() {
        let mut dealer = dealer(|_, _, _| true, 20);
        dealer.deal();
        let (claim, verdict) = claim(&dealer, 0, [0, 1, 2]);
        dealer.reshuffle();
        dealer.adjudicate(claim);
        assert_eq!(verdict.await, Ok(Verdict::Stale(vec![0, 1, 2])));
        assert_eq!(dealer.census(), (0, 20, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn claims_are_judged_in_submission_order() {
        let judged = Arc::new(Mutex::new(Vec::new()));
        let seen = judged.clone();
        let mut dealer = dealer(
            move |a: Card, _: Card, _: Card| {
                seen.lock().unwrap().push(a);
                false
            },
            20,
        );
        dealer.deal();
        let queue = dealer.claims.sender();
        let mut verdicts = Vec::new();
        for (player, first) in [(2, 3), (0, 0), (1, 5)] {
            let (claim, verdict) = claim(&dealer, player, [first, 1, 2]);
            queue.send(claim).unwrap();
            verdicts.push(verdict);
        }
        let expected = [3, 0, 5].map(|s| dealer.board.card(s).unwrap()).to_vec();
        dealer.timer.reset();
        dealer.countdown().await;
        assert_eq!(*judged.lock().unwrap(), expected);
        for verdict in verdicts {
            assert_eq!(verdict.await, Ok(Verdict::Penalty));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_ends_at_the_deadline() {
        let mut dealer = dealer(|_, _, _| true, 20);
        dealer.timer.reset();
        let start = Instant::now();
        dealer.countdown().await;
        assert!(start.elapsed() >= dealer.config.turn_timeout);
        assert!(start.elapsed() < dealer.config.turn_timeout + dealer.config.tick);
    }

    #[tokio::test(start_paused = true)]
    async fn accepted_claim_extends_the_round() {
        let mut dealer = dealer(|_, _, _| true, 20);
        dealer.deal();
        dealer.timer.reset();
        let start = Instant::now();
        let queue = dealer.claims.sender();
        let (claim, _verdict) = claim(&dealer, 0, [0, 1, 2]);
        let late = Duration::from_secs(30);
        tokio::spawn(async move {
            tokio::time::sleep(late).await;
            queue.send(claim).unwrap();
        });
        dealer.countdown().await;
        assert!(start.elapsed() >= late + dealer.config.turn_timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_cuts_the_round_short() {
        let mut dealer = dealer(|_, _, _| true, 20);
        dealer.timer.reset();
        let token = dealer.token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            token.cancel();
        });
        let start = Instant::now();
        dealer.countdown().await;
        assert!(start.elapsed() < dealer.config.turn_timeout);
    }

    #[test]
    fn ties_share_the_win() {
        let mut dealer = dealer(|_, _, _| true, 20);
        let seats = (0..3).map(|_| dealer.sit(None)).collect::<Vec<_>>();
        assert_eq!(dealer.winners(), vec![0, 1, 2]);
        seats[2].reward();
        seats[0].reward();
        assert_eq!(dealer.winners(), vec![0, 2]);
        seats[2].reward();
        assert_eq!(dealer.winners(), vec![2]);
    }

    #[tokio::test]
    async fn exhausted_deck_ends_the_game_at_once() {
        let mut dealer = dealer(|_, _, _| false, 20);
        dealer.sit(None);
        dealer.sit(None);
        let winners = dealer.run().await;
        assert_eq!(winners, vec![0, 1]);
    }
}
