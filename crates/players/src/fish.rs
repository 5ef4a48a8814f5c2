use rand::Rng;
use rbs_core::*;
use rbs_gameroom::*;

/// Presses uniformly random slots, occupied or not.
pub struct Fish;

#[async_trait::async_trait]
impl Bot for Fish {
    async fn choose(&mut self, _: PlayerId, board: &Board) -> Option<Slot> {
        match board.slots() {
            0 => None,
            n => Some(rand::rng().random_range(0..n)),
        }
    }
}
