use super::*;
use rbs_cards::Rules;
use rbs_core::*;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A table being set up: configuration, rules, display, and the players
/// in seating order.
pub struct Game {
    config: Config,
    rules: Arc<dyn Rules>,
    screen: Arc<dyn Screen>,
    lineup: Vec<Option<Box<dyn Bot>>>,
}

impl Game {
    pub fn new<R, S>(config: Config, rules: R, screen: S) -> Self
    where
        R: Rules + 'static,
        S: Screen + 'static,
    {
        Self {
            config,
            rules: Arc::new(rules),
            screen: Arc::new(screen),
            lineup: Vec::new(),
        }
    }
    /// Seats a player fed through [`GameHandle::press`].
    pub fn sit_human(&mut self) -> PlayerId {
        self.lineup.push(None);
        self.lineup.len() - 1
    }
    /// Seats a player fed by `bot`.
    pub fn sit_robot<B>(&mut self, bot: B) -> PlayerId
    where
        B: Bot + 'static,
    {
        self.lineup.push(Some(Box::new(bot)));
        self.lineup.len() - 1
    }
    pub fn players(&self) -> usize {
        self.lineup.len()
    }
    /// Spawns the dealer, which deals the first round and starts every
    /// player. Must be called from within a tokio runtime.
    pub fn start(self) -> Result<GameHandle, GameError> {
        self.config.validate(self.lineup.len())?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| GameError::NoRuntime)?;
        let token = CancellationToken::new();
        let mut dealer = Dealer::new(self.config, self.rules, self.screen, token.clone());
        let seats = self
            .lineup
            .into_iter()
            .map(|bot| dealer.sit(bot))
            .collect::<Vec<_>>();
        let board = dealer.board();
        log::info!(
            "[game] starting with {} humans, {} robots",
            seats.iter().filter(|s| s.is_human()).count(),
            seats.iter().filter(|s| !s.is_human()).count()
        );
        let dealer = runtime.spawn(dealer.run());
        Ok(GameHandle {
            token,
            board,
            seats,
            dealer,
        })
    }
}

/// A running game.
pub struct GameHandle {
    token: CancellationToken,
    board: Arc<Board>,
    seats: Vec<Arc<Seat>>,
    dealer: JoinHandle<Vec<PlayerId>>,
}

impl GameHandle {
    /// Feeds a slot press to `player`.
    pub fn press(&self, player: PlayerId, slot: Slot) -> Result<Press, GameError> {
        self.seats
            .get(player)
            .map(|seat| seat.press(slot))
            .ok_or(GameError::NoSuchPlayer(player))
    }
    /// Asks the game to end. Idempotent.
    pub fn terminate(&self) {
        if !self.token.is_cancelled() {
            log::info!("[game] termination requested");
            self.token.cancel();
        }
    }
    pub fn is_finished(&self) -> bool {
        self.dealer.is_finished()
    }
    pub fn scores(&self) -> Vec<Score> {
        self.seats.iter().map(|s| s.score()).collect()
    }
    pub fn seats(&self) -> &[Arc<Seat>] {
        &self.seats
    }
    pub fn board(&self) -> Arc<Board> {
        self.board.clone()
    }
    /// Waits for the game to end, every player stopped, and returns the
    /// players sharing the best score. Must not be awaited again once it
    /// has returned.
    pub async fn wait(&mut self) -> Result<Vec<PlayerId>, GameError> {
        Ok((&mut self.dealer).await?)
    }
    pub async fn winners(mut self) -> Result<Vec<PlayerId>, GameError> {
        self.wait().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbs_cards::Card;

    fn never(_: Card, _: Card, _: Card) -> bool {
        false
    }

    #[test]
    fn start_needs_a_runtime() {
        let mut game = Game::new(Config::default(), never, Silent);
        game.sit_human();
        assert!(matches!(game.start(), Err(GameError::NoRuntime)));
    }

    #[tokio::test]
    async fn start_needs_players() {
        let game = Game::new(Config::default(), never, Silent);
        assert!(matches!(
            game.start(),
            Err(GameError::Config(ConfigError::NoPlayers))
        ));
    }

    #[tokio::test]
    async fn seats_are_numbered_in_order() {
        let mut game = Game::new(Config::default(), never, Silent);
        assert_eq!(game.sit_human(), 0);
        assert_eq!(game.sit_human(), 1);
        assert_eq!(game.players(), 2);
        let handle = game.start().unwrap();
        assert!(matches!(handle.press(5, 0), Err(GameError::NoSuchPlayer(5))));
        assert_eq!(handle.winners().await.unwrap(), vec![0, 1]);
    }
}
