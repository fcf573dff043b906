//! Samples the cursor at the hover poll rate and drives the reactor's
//! timers. Every period sends one [`Event::HoverPoll`] followed by one
//! [`Event::Tick`].

use std::thread;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

use crate::actor::reactor::{self, Event};
use crate::sys::host::CursorSource;

pub struct Poller {
    cursor: Box<dyn CursorSource>,
    events_tx: reactor::Sender,
    period: Duration,
}

impl Poller {
    pub fn new(cursor: Box<dyn CursorSource>, events_tx: reactor::Sender, period: Duration) -> Self {
        Poller { cursor, events_tx, period }
    }

    pub fn spawn(self) -> std::io::Result<thread::JoinHandle<()>> {
        thread::Builder::new().name("poller".to_string()).spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!("failed to start poller runtime: {e}");
                    return;
                }
            };
            runtime.block_on(self.run());
        })
    }

    pub async fn run(self) {
        debug!(period = ?self.period, "polling cursor");
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        while !self.events_tx.is_closed() {
            interval.tick().await;
            let cursor = self.cursor.cursor_location();
            self.events_tx.send(Event::HoverPoll(cursor));
            self.events_tx.send(Event::Tick);
        }
        debug!("reactor gone, poller exiting");
    }
}
