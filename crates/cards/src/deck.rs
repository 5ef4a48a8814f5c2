use super::card::Card;
use rand::seq::SliceRandom;

/// An ordered bag of cards that are not on the board.
///
/// Cards are drawn from the top. The dealer shuffles before every deal, so
/// order only matters within a round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck(Vec<Card>);

impl Deck {
    /// Creates a deck holding cards `0..size`, in order.
    pub fn new(size: usize) -> Self {
        debug_assert!(size <= Card::COUNT);
        Self((0..size as u8).map(Card::from).collect())
    }
    /// Randomly permutes the remaining cards.
    pub fn shuffle(&mut self) {
        self.0.shuffle(&mut rand::rng());
    }
    /// Removes and returns the top card.
    pub fn draw(&mut self) -> Option<Card> {
        self.0.pop()
    }
    /// Returns a card to the deck.
    pub fn push(&mut self, card: Card) {
        debug_assert!(!self.0.contains(&card));
        self.0.push(card);
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn contains(&self, card: &Card) -> bool {
        self.0.contains(card)
    }
    pub fn cards(&self) -> &[Card] {
        &self.0
    }
}

impl Extend<Card> for Deck {
    fn extend<I: IntoIterator<Item = Card>>(&mut self, iter: I) {
        iter.into_iter().for_each(|card| self.push(card));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_deck_holds_every_card_once() {
        let deck = Deck::new(Card::COUNT);
        assert_eq!(deck.len(), Card::COUNT);
        (0..Card::COUNT as u8)
            .map(Card::from)
            .for_each(|card| assert!(deck.contains(&card)));
    }

    #[test]
    fn shuffle_preserves_cards() {
        let mut deck = Deck::new(27);
        deck.shuffle();
        let mut cards = deck.cards().to_vec();
        cards.sort();
        assert_eq!(cards, Deck::new(27).cards());
    }

    #[test]
    fn draw_until_empty() {
        let mut deck = Deck::new(3);
        assert!(deck.draw().is_some());
        assert!(deck.draw().is_some());
        assert!(deck.draw().is_some());
        assert!(deck.draw().is_none());
        assert!(deck.is_empty());
    }

    #[test]
    fn extend_returns_cards() {
        let mut deck = Deck::default();
        deck.extend([Card::from(4), Card::from(9)]);
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.draw(), Some(Card::from(9)));
    }
}
