use super::card::Card;
use rbs_core::SET_SIZE;

/// Three cards submitted together.
pub type Triple = [Card; SET_SIZE];

/// The set validity predicate.
///
/// Implementations must be pure: the dealer calls it while holding the board
/// exclusively, and bots may call it concurrently from their own tasks.
/// Any `Fn(Card, Card, Card) -> bool` closure qualifies, which keeps tests
/// free to plug in arbitrary predicates.
pub trait Rules: Send + Sync {
    /// Whether the three cards, in this order, form a set.
    fn is_valid_set(&self, a: Card, b: Card, c: Card) -> bool;

    /// Up to `limit` sets among `cards`, in lexicographic index order.
    fn find_sets(&self, cards: &[Card], limit: usize) -> Vec<Triple> {
        let n = cards.len();
        (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .flat_map(|(i, j)| (j + 1..n).map(move |k| (i, j, k)))
            .map(|(i, j, k)| [cards[i], cards[j], cards[k]])
            .filter(|&[a, b, c]| self.is_valid_set(a, b, c))
            .take(limit)
            .collect()
    }

    /// Whether any three of `cards` form a set.
    fn has_set(&self, cards: &[Card]) -> bool {
        !self.find_sets(cards, 1).is_empty()
    }
}

impl<F> Rules for F
where
    F: Fn(Card, Card, Card) -> bool + Send + Sync,
{
    fn is_valid_set(&self, a: Card, b: Card, c: Card) -> bool {
        self(a, b, c)
    }
}

/// The standard game: for every feature, the three values are either all
/// equal or all distinct.
#[derive(Debug, Default, Clone, Copy)]
pub struct Classic;

impl Rules for Classic {
    fn is_valid_set(&self, a: Card, b: Card, c: Card) -> bool {
        (0..Card::FEATURES)
            .map(|i| (a.feature(i), b.feature(i), c.feature(i)))
            .all(|(x, y, z)| (x + y + z) % Card::VALUES == 0)
    }
}
