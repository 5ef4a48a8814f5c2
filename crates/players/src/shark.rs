use rand::Rng;
use rbs_cards::*;
use rbs_core::*;
use rbs_gameroom::*;
use std::collections::VecDeque;
use std::sync::Arc;

/// Reads the board, finds a set, and presses it.
///
/// Keeps a plan of presses, dropped as soon as any planned slot stops
/// showing the card it was planned for. Lifts its own stray tokens before
/// marking the set. Falls back to random presses when the board holds no
/// set.
pub struct Shark {
    rules: Arc<dyn Rules>,
    plan: VecDeque<Pick>,
}

impl Shark {
    pub fn new<R>(rules: R) -> Self
    where
        R: Rules + 'static,
    {
        Self::from(Arc::new(rules) as Arc<dyn Rules>)
    }

    fn plan(&self, me: PlayerId, board: &Board) -> VecDeque<Pick> {
        let shown = board
            .cards()
            .into_iter()
            .enumerate()
            .filter_map(|(slot, card)| card.map(|card| Pick { slot, card }))
            .collect::<Vec<Pick>>();
        let cards = shown.iter().map(|p| p.card).collect::<Vec<Card>>();
        let Some(triple) = self.rules.find_sets(&cards, 1).into_iter().next() else {
            return VecDeque::new();
        };
        let target = shown
            .iter()
            .filter(|p| triple.contains(&p.card))
            .copied()
            .collect::<Vec<Pick>>();
        let held = board.tokens(me);
        let lift = shown
            .iter()
            .filter(|p| held.contains(&p.slot))
            .filter(|p| !target.contains(p))
            .copied();
        let mark = target.iter().filter(|p| !held.contains(&p.slot)).copied();
        lift.chain(mark).collect()
    }

    fn current(&self, board: &Board) -> bool {
        self.plan.iter().all(|p| board.card(p.slot) == Some(p.card))
    }
}

impl From<Arc<dyn Rules>> for Shark {
    fn from(rules: Arc<dyn Rules>) -> Self {
        Self {
            rules,
            plan: VecDeque::new(),
        }
    }
}

#[async_trait::async_trait]
impl Bot for Shark {
    async fn choose(&mut self, me: PlayerId, board: &Board) -> Option<Slot> {
        if !self.current(board) {
            log::trace!("[shark P{}] plan went stale", me);
            self.plan.clear();
        }
        if self.plan.is_empty() {
            self.plan = self.plan(me, board);
        }
        match self.plan.pop_front() {
            Some(pick) => Some(pick.slot),
            None if board.slots() > 0 => Some(rand::rng().random_range(0..board.slots())),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        let board = Board::new(6, Arc::new(Silent));
        [
            (3, [0, 0, 0, 0]),
            (0, [1, 1, 1, 1]),
            (5, [2, 2, 2, 2]),
            (1, [0, 0, 0, 1]),
        ]
        .into_iter()
        .for_each(|(slot, features)| board.place_card(Card::from(features), slot).unwrap());
        board
    }

    async fn presses(shark: &mut Shark, me: PlayerId, board: &Board, n: usize) -> Vec<Slot> {
        let mut slots = Vec::new();
        for _ in 0..n {
            slots.push(shark.choose(me, board).await.unwrap());
        }
        slots
    }

    #[tokio::test]
    async fn presses_the_set() {
        let board = board();
        let mut shark = Shark::new(Classic);
        let mut slots = presses(&mut shark, 0, &board, 3).await;
        slots.sort();
        assert_eq!(slots, vec![0, 3, 5]);
    }

    #[tokio::test]
    async fn lifts_stray_tokens_first() {
        let board = board();
        board.place_token(2, 1).unwrap();
        board.place_token(2, 5).unwrap();
        let mut shark = Shark::new(Classic);
        let slots = presses(&mut shark, 2, &board, 3).await;
        assert_eq!(slots[0], 1);
        let mut rest = slots[1..].to_vec();
        rest.sort();
        assert_eq!(rest, vec![0, 3]);
    }

    #[tokio::test]
    async fn replans_when_the_board_changes() {
        let board = board();
        let mut shark = Shark::new(Classic);
        shark.choose(0, &board).await.unwrap();
        board.remove_card(3).unwrap();
        board.remove_card(0).unwrap();
        board.remove_card(5).unwrap();
        let slot = shark.choose(0, &board).await.unwrap();
        assert!(slot < 6);
        assert!(shark.plan.is_empty());
    }
}
