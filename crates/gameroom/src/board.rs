use super::*;
use rbs_cards::Card;
use rbs_core::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;
use tokio::sync::watch;

/// One position on the board.
#[derive(Debug, Default)]
struct Spot {
    card: Option<Card>,
    tokens: BTreeSet<PlayerId>,
}

#[derive(Debug)]
struct Grid {
    epoch: Epoch,
    spots: Vec<Mutex<Spot>>,
}

/// Receipt for a placed token: which card the player saw, and under which
/// deal epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pub slot: Slot,
    pub card: Card,
    pub epoch: Epoch,
}

/// Shared board of card slots and player tokens.
///
/// Lock discipline:
/// - individual operations (token placement, single card reads and writes)
///   take the grid's read side and then lock only the slot they touch, so
///   players working on different slots never wait on each other;
/// - bulk operations go through [`Board::exclusive`], which takes the write
///   side. Nobody observes a half-dealt board, and no token can land while
///   the dealer reshuffles or adjudicates.
///
/// Every token wipe bumps the epoch, which is how players learn that tokens
/// they still remember have been swept off the board.
///
/// The board also carries the table-wide input gate: closed between the end
/// of a round and the next deal.
pub struct Board {
    size: usize,
    grid: RwLock<Grid>,
    open: watch::Sender<bool>,
    screen: Arc<dyn Screen>,
}

impl Board {
    pub fn new(size: usize, screen: Arc<dyn Screen>) -> Self {
        Self {
            size,
            grid: RwLock::new(Grid {
                epoch: 0,
                spots: (0..size).map(|_| Mutex::default()).collect(),
            }),
            open: watch::Sender::new(false),
            screen,
        }
    }
    pub fn slots(&self) -> usize {
        self.size
    }
    pub fn epoch(&self) -> Epoch {
        self.shared().epoch
    }
    /// Point-in-time read of one slot.
    pub fn card(&self, slot: Slot) -> Option<Card> {
        self.with(slot, |spot| spot.card).ok().flatten()
    }
    /// Point-in-time read of every slot.
    pub fn cards(&self) -> Vec<Option<Card>> {
        let grid = self.shared();
        grid.spots.iter().map(|s| Self::lock(s).card).collect()
    }
    pub fn occupied(&self) -> usize {
        self.cards().iter().flatten().count()
    }
    /// Slots currently marked by `player`, ascending.
    pub fn tokens(&self, player: PlayerId) -> Vec<Slot> {
        let grid = self.shared();
        grid.spots
            .iter()
            .enumerate()
            .filter(|(_, s)| Self::lock(s).tokens.contains(&player))
            .map(|(i, _)| i)
            .collect()
    }
    /// Players with a token on `slot`, ascending.
    #[cfg(test)]
    fn holders(&self, slot: Slot) -> Vec<PlayerId> {
        self.with(slot, |spot| spot.tokens.iter().copied().collect())
            .unwrap_or_default()
    }
}

/// Individual operations.
impl Board {
    /// Deals `card` into an empty slot.
    pub fn place_card(&self, card: Card, slot: Slot) -> Result<(), BoardError> {
        self.with(slot, |spot| match spot.card {
            Some(held) => Err(BoardError::Occupied(slot, held)),
            None => {
                spot.card = Some(card);
                self.screen.show_card(slot, card);
                Ok(())
            }
        })?
    }
    /// Takes the card out of `slot` along with every token on it.
    /// Idempotent on an empty slot.
    pub fn remove_card(&self, slot: Slot) -> Result<Option<Card>, BoardError> {
        self.with(slot, |spot| Self::vacate(spot, slot, self.screen.as_ref()))
    }
    /// Marks `slot` for `player` and reports the card seen there.
    /// Returns `None`, placing nothing, if the slot is off the board or empty.
    pub fn place_token(&self, player: PlayerId, slot: Slot) -> Option<Mark> {
        let grid = self.shared();
        let mut spot = Self::lock(grid.spots.get(slot)?);
        let card = spot.card?;
        if spot.tokens.insert(player) {
            self.screen.show_token(player, slot);
        }
        Some(Mark {
            slot,
            card,
            epoch: grid.epoch,
        })
    }
    /// Removes `player`'s token from `slot`, reporting whether there was one.
    pub fn remove_token(&self, player: PlayerId, slot: Slot) -> bool {
        self.with(slot, |spot| spot.tokens.remove(&player))
            .inspect(|removed| {
                if *removed {
                    self.screen.clear_token(player, slot)
                }
            })
            .unwrap_or(false)
    }
}

/// Input gate.
impl Board {
    pub fn open(&self) {
        log::debug!("[board] input open");
        self.open.send_replace(true);
    }
    pub fn close(&self) {
        log::debug!("[board] input closed");
        self.open.send_replace(false);
    }
    pub fn is_open(&self) -> bool {
        *self.open.borrow()
    }
    pub fn opened(&self) -> watch::Receiver<bool> {
        self.open.subscribe()
    }
}

/// Bulk access.
impl Board {
    /// Locks the whole board. Every individual operation waits until the
    /// returned guard is dropped. Never hold it across an `.await`.
    pub fn exclusive(&self) -> Exclusive<'_> {
        Exclusive {
            grid: self.grid.write().unwrap_or_else(PoisonError::into_inner),
            screen: self.screen.as_ref(),
        }
    }
}

impl Board {
    fn shared(&self) -> RwLockReadGuard<'_, Grid> {
        self.grid.read().unwrap_or_else(PoisonError::into_inner)
    }
    fn lock(spot: &Mutex<Spot>) -> MutexGuard<'_, Spot> {
        spot.lock().unwrap_or_else(PoisonError::into_inner)
    }
    fn with<T>(&self, slot: Slot, f: impl FnOnce(&mut Spot) -> T) -> Result<T, BoardError> {
        let grid = self.shared();
        let spot = grid.spots.get(slot).ok_or(BoardError::OutOfRange(slot))?;
        Ok(f(&mut *Self::lock(spot)))
    }
    fn vacate(spot: &mut Spot, slot: Slot, screen: &dyn Screen) -> Option<Card> {
        std::mem::take(&mut spot.tokens)
            .into_iter()
            .for_each(|player| screen.clear_token(player, slot));
        spot.card.take().inspect(|_| screen.clear_slot(slot))
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("epoch", &self.epoch())
            .field("cards", &self.cards())
            .field("open", &self.is_open())
            .finish()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cards = self
            .cards()
            .iter()
            .map(|c| c.map_or_else(|| String::from("----"), |c| c.to_string()))
            .collect::<Vec<_>>();
        write!(f, "{}", cards.join(" "))
    }
}

/// Write access to the whole board, held by the dealer for the duration of
/// a deal, a reshuffle, or an adjudication.
pub struct Exclusive<'b> {
    grid: RwLockWriteGuard<'b, Grid>,
    screen: &'b dyn Screen,
}

impl Exclusive<'_> {
    pub fn epoch(&self) -> Epoch {
        self.grid.epoch
    }
    pub fn card(&self, slot: Slot) -> Option<Card> {
        self.grid
            .spots
            .get(slot)
            .and_then(|s| Board::lock(s).card)
    }
    /// Empty slots, ascending.
    pub fn vacant(&self) -> Vec<Slot> {
        self.grid
            .spots
            .iter()
            .enumerate()
            .filter(|(_, s)| Board::lock(s).card.is_none())
            .map(|(i, _)| i)
            .collect()
    }
    pub fn place_card(&mut self, card: Card, slot: Slot) -> Result<(), BoardError> {
        let spot = self.spot(slot)?;
        match spot.card {
            Some(held) => Err(BoardError::Occupied(slot, held)),
            None => {
                spot.card = Some(card);
                self.screen.show_card(slot, card);
                Ok(())
            }
        }
    }
    /// Takes the card out of `slot` along with every token on it.
    pub fn remove_card(&mut self, slot: Slot) -> Option<Card> {
        let screen = self.screen;
        self.spot(slot)
            .ok()
            .and_then(|spot| Board::vacate(spot, slot, screen))
    }
    /// Sweeps every token off the board and starts a new epoch.
    pub fn wipe_tokens(&mut self) {
        let screen = self.screen;
        self.grid.epoch += 1;
        self.grid
            .spots
            .iter_mut()
            .map(|s| s.get_mut().unwrap_or_else(PoisonError::into_inner))
            .enumerate()
            .for_each(|(slot, spot)| {
                std::mem::take(&mut spot.tokens)
                    .into_iter()
                    .for_each(|player| screen.clear_token(player, slot))
            });
    }
    fn spot(&mut self, slot: Slot) -> Result<&mut Spot, BoardError> {
        self.grid
            .spots
            .get_mut(slot)
            .map(|s| s.get_mut().unwrap_or_else(PoisonError::into_inner))
            .ok_or(BoardError::OutOfRange(slot))
    }
}
