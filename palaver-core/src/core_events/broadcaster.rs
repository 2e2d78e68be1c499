//! Topic-scoped event broadcasting
//!
//! Fans message and typing events out to every live subscriber of a
//! topic. Delivery is best-effort: at-least-once per connected
//! subscriber, nothing buffered for the disconnected. The broadcaster
//! performs no authorization — callers gate subscriptions through the
//! membership authority before opening them.

use super::envelope::EventEnvelope;
use super::topic::Topic;
use futures::stream::{Stream, StreamExt};
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::trace;

/// Default per-topic channel capacity (events buffered per subscriber)
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Per-topic broadcast hub
///
/// One `tokio::sync::broadcast` channel per live topic; senders for
/// topics whose last receiver dropped are reaped on the next publish.
pub struct EventBroadcaster {
    capacity: usize,
    topics: RwLock<HashMap<Topic, broadcast::Sender<EventEnvelope>>>,
}

impl EventBroadcaster {
    /// Create a broadcaster with the given per-topic capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Publish an event to every current subscriber of `topic`.
    ///
    /// Returns the number of subscribers that received the event.
    /// Publishing to a topic nobody listens to is not an error.
    pub fn publish(&self, topic: Topic, event: EventEnvelope) -> usize {
        let sender = {
            let topics = self.topics.read().unwrap();
            topics.get(&topic).cloned()
        };

        let Some(sender) = sender else {
            trace!(%topic, "publish with no subscribers");
            return 0;
        };

        let delivered = sender.send(event).unwrap_or(0);
        if delivered == 0 {
            // Last receiver is gone; drop the idle sender
            let mut topics = self.topics.write().unwrap();
            if let Some(sender) = topics.get(&topic) {
                if sender.receiver_count() == 0 {
                    topics.remove(&topic);
                }
            }
        }

        crate::metrics::record_events_published(delivered);
        trace!(%topic, delivered, "event published");
        delivered
    }

    /// Subscribe to a single topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<EventEnvelope> {
        let mut topics = self.topics.write().unwrap();
        topics
            .entry(topic)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Subscribe to several topics at once, merged into one handle
    pub fn subscribe_many(&self, topics: &[Topic]) -> Subscription {
        Subscription {
            receivers: topics.iter().map(|t| self.subscribe(*t)).collect(),
        }
    }

    /// Number of live subscribers for a topic
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.topics
            .read()
            .unwrap()
            .get(&topic)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }

    /// Number of topics with a live sender
    pub fn topic_count(&self) -> usize {
        self.topics.read().unwrap().len()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// A handle over one or more topic subscriptions
///
/// Dropping the handle (or the stream made from it) is the whole
/// disconnect protocol: the subscriber simply stops receiving.
pub struct Subscription {
    receivers: Vec<broadcast::Receiver<EventEnvelope>>,
}

impl Subscription {
    /// Number of underlying topic receivers
    pub fn len(&self) -> usize {
        self.receivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receivers.is_empty()
    }

    /// Merge the topic receivers into a single event stream. Lagged
    /// receivers skip ahead rather than erroring out — events lost to
    /// lag are recoverable from the message log, or meaningless
    /// (typing) by design.
    pub fn into_stream(self) -> impl Stream<Item = EventEnvelope> + Send {
        let streams = self.receivers.into_iter().map(BroadcastStream::new);
        futures::stream::select_all(streams).filter_map(|item| async move { item.ok() })
    }
}
