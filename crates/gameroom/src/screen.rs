use super::*;
use rbs_cards::Card;
use rbs_core::*;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// The display capability.
///
/// The board, the dealer, and every player report visible changes here.
/// Calls arrive from many tasks, some while the board is locked, so
/// implementations must return promptly and must never call back into the
/// board. Everything funnels through [`Screen::render`]; the named methods
/// only build the corresponding [`Event`].
pub trait Screen: Send + Sync {
    fn render(&self, event: Event);

    fn show_card(&self, slot: Slot, card: Card) {
        self.render(Event::CardShown { slot, card });
    }
    fn clear_slot(&self, slot: Slot) {
        self.render(Event::SlotCleared { slot });
    }
    fn show_token(&self, player: PlayerId, slot: Slot) {
        self.render(Event::TokenShown { player, slot });
    }
    fn clear_token(&self, player: PlayerId, slot: Slot) {
        self.render(Event::TokenCleared { player, slot });
    }
    fn set_score(&self, player: PlayerId, score: Score) {
        self.render(Event::Score { player, score });
    }
    fn set_freeze(&self, player: PlayerId, remaining: Duration) {
        self.render(Event::Freeze { player, remaining });
    }
    fn set_countdown(&self, remaining: Duration, warning: bool) {
        self.render(Event::Countdown { remaining, warning });
    }
    fn announce_winners(&self, players: &[PlayerId]) {
        self.render(Event::Winners {
            players: players.to_vec(),
        });
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Screen for Silent {
    fn render(&self, _: Event) {}
}

/// Renders through the `log` facade: results at info, board traffic at
/// debug, marks at trace.
#[derive(Debug, Default, Clone, Copy)]
pub struct Console;

impl Screen for Console {
    fn render(&self, event: Event) {
        match event {
            Event::Winners { .. } | Event::Score { .. } => log::info!("[screen] {}", event),
            Event::Countdown { warning: true, .. } => log::info!("[screen] {}", event),
            Event::TokenShown { .. } | Event::TokenCleared { .. } => {
                log::trace!("[screen] {}", event)
            }
            _ => log::debug!("[screen] {}", event),
        }
    }
}

/// Forwards every event to a channel, for external renderers and tests.
impl Screen for UnboundedSender<Event> {
    fn render(&self, event: Event) {
        if let Err(e) = self.send(event) {
            log::trace!("[screen] receiver gone, dropped {}", e.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;
    #[test]
    fn channel_screen_forwards_calls() {
        let (tx, mut rx) = unbounded_channel::<Event>();
        tx.show_card(3, Card::from(10));
        tx.set_score(1, 4);
        tx.announce_winners(&[1]);
        assert_eq!(
            rx.try_recv().ok(),
            Some(Event::CardShown {
                slot: 3,
                card: Card::from(10)
            })
        );
        assert_eq!(rx.try_recv().ok(), Some(Event::Score { player: 1, score: 4 }));
        assert_eq!(
            rx.try_recv().ok(),
            Some(Event::Winners { players: vec![1] })
        );
        assert!(rx.try_recv().is_err());
    }
    #[test]
    fn closed_channel_is_harmless() {
        let (tx, rx) = unbounded_channel::<Event>();
        drop(rx);
        tx.clear_slot(0);
    }
}
