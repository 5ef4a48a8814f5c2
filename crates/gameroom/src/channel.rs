use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// Coupled sender/receiver pair with a single consumer.
///
/// The owner keeps the receiving end and hands out sender clones. Sending
/// never blocks. This is the claim queue: many players submit, the dealer
/// alone drains, in submission order.
#[derive(Debug)]
pub struct Channel<T> {
    tx: UnboundedSender<T>,
    rx: UnboundedReceiver<T>,
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        let (tx, rx) = unbounded_channel();
        Self { tx, rx }
    }
}

impl<T> Channel<T> {
    pub fn sender(&self) -> UnboundedSender<T> {
        self.tx.clone()
    }
    pub fn rx(&mut self) -> &mut UnboundedReceiver<T> {
        &mut self.rx
    }
}
