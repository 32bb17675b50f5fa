// src/events/stream.rs
// =============================================================================
// Live delivery of the event log to subscribers.
//
// Each subscriber gets its own cursor, starting at the oldest retained event.
// On every tick of a fixed poll interval the cursor is checked:
// - behind the log  -> emit the event under the cursor, move forward by one
// - caught up       -> emit nothing, wait for the next tick
//
// A subscription ends when:
// - the consumer goes away (the transport drops the stream), or
// - the process signals shutdown through the ShutdownHandle
//
// New subscribers always replay the retained backlog before going live.
// =============================================================================

use super::log::{Event, EventLog};
use futures::stream::{self, BoxStream, StreamExt};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::debug;

/// Default delay between two cursor checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Hands out independent subscriptions to one event log.
#[derive(Debug, Clone)]
pub struct EventStreamer {
    log: EventLog,
    poll_interval: Duration,
    shutdown: watch::Receiver<bool>,
}

/// Ends every subscription created by the paired streamer.
///
/// Dropping the handle counts as shutdown too.
#[derive(Debug)]
pub struct ShutdownHandle {
    sender: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }
}

// Per-subscriber state, moved through the stream
struct Cursor {
    log: EventLog,
    position: usize,
    poll_interval: Duration,
    // Created on first poll so subscribe() can be called outside the runtime
    ticker: Option<Interval>,
    shutdown: watch::Receiver<bool>,
}

impl EventStreamer {
    pub fn new(log: EventLog, poll_interval: Duration) -> (Self, ShutdownHandle) {
        let (sender, shutdown) = watch::channel(false);
        let streamer = Self {
            log,
            poll_interval,
            shutdown,
        };
        (streamer, ShutdownHandle { sender })
    }

    #[cfg(test)]
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Opens a new subscription with its cursor at the start of the backlog.
    pub fn subscribe(&self) -> BoxStream<'static, Event> {
        let cursor = Cursor {
            log: self.log.clone(),
            position: self.log.first_index(),
            poll_interval: self.poll_interval,
            ticker: None,
            shutdown: self.shutdown.clone(),
        };

        stream::unfold(cursor, |mut cursor| async move {
            let event = cursor.next_event().await?;
            Some((event, cursor))
        })
        .boxed()
    }
}

impl Cursor {
    async fn next_event(&mut self) -> Option<Event> {
        let period = self.poll_interval;
        let ticker = self.ticker.get_or_insert_with(|| {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            if *self.shutdown.borrow() {
                return None;
            }

            tokio::select! {
                changed = self.shutdown.changed() => {
                    // Sender gone means the process is going down
                    if changed.is_err() {
                        return None;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            // A bounded log may have evicted entries this cursor never saw
            let oldest = self.log.first_index();
            if self.position < oldest {
                debug!(from = self.position, to = oldest, "subscriber fell behind retention window");
                self.position = oldest;
            }

            // Caught up: nothing to emit on this tick
            if self.position >= self.log.len() {
                continue;
            }
            if let Some(event) = self.log.get(self.position) {
                self.position += 1;
                return Some(event);
            }
        }
    }
}
