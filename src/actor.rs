//! Actors run on their own threads and own their state outright. They talk
//! through unbounded channels whose messages carry the sender's span, so a
//! reactor log line nests under whatever produced the event.

use tokio::sync::mpsc::error::SendError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::Span;

pub mod config_watcher;
pub mod drag_dock;
pub mod hover;
pub mod poller;
pub mod reactor;

pub struct Sender<Event>(UnboundedSender<(Span, Event)>);
pub type Receiver<Event> = UnboundedReceiver<(Span, Event)>;

pub fn channel<Event>() -> (Sender<Event>, Receiver<Event>) {
    let (tx, rx) = unbounded_channel();
    (Sender(tx), rx)
}

impl<Event> Sender<Event> {
    /// Sends `event`, ignoring a closed channel.
    pub fn send(&self, event: Event) { _ = self.try_send(event) }

    pub fn try_send(&self, event: Event) -> Result<(), SendError<(Span, Event)>> {
        self.0.send((Span::current(), event))
    }

    /// Whether the receiving actor has shut down.
    pub fn is_closed(&self) -> bool { self.0.is_closed() }
}

impl<Event> Clone for Sender<Event> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<Event> std::fmt::Debug for Sender<Event> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sender").field("closed", &self.is_closed()).finish()
    }
}
