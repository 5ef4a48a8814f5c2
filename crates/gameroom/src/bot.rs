use super::*;
use rbs_core::*;

/// A synthetic brain that chooses slots to press.
///
/// Called by the player's [`Driver`] whenever the player can take another
/// press. Returning `None` skips a beat. The board may change between the
/// choice and the press, like it would for a human.
#[async_trait::async_trait]
pub trait Bot: Send {
    async fn choose(&mut self, me: PlayerId, board: &Board) -> Option<Slot>;
}

#[async_trait::async_trait]
impl Bot for Box<dyn Bot> {
    async fn choose(&mut self, me: PlayerId, board: &Board) -> Option<Slot> {
        self.as_mut().choose(me, board).await
    }
}
