//! Ephemeral "who is typing" state
//!
//! Typing signals live only in process memory and expire on a TTL;
//! nothing here ever touches durable storage. Expiry is client-observed:
//! subscribers hide a typing indicator once no refresh arrives within
//! the TTL, and the tracker prunes stale entries for its own hygiene
//! without publishing a removal event.

use crate::core_events::{EventBroadcaster, EventEnvelope, Topic};
use crate::core_users::UserRecord;
use crate::core_workspace::{
    ChannelId, MembershipAuthority, MembershipError, StorageError, Timestamp, UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::trace;

/// Default time-to-live for an unrefreshed typing signal
pub const DEFAULT_TYPING_TTL: Duration = Duration::from_millis(2_500);

/// How often a well-behaved client refreshes its typing signal while
/// the user keeps typing. Caller-side contract, not enforced here.
pub const TYPING_THROTTLE_HINT: Duration = Duration::from_millis(800);

/// A live typing signal for (channel, user)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingSignal {
    pub channel_id: ChannelId,
    pub user_id: UserId,
    pub username: String,
    pub last_seen_at: Timestamp,
}

/// Normalized typing payload broadcast to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingRecord {
    pub user_id: UserId,
    pub username: String,
    pub channel_id: ChannelId,
}

/// Presence errors
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    #[error("channel not found")]
    ChannelNotFound,

    #[error("forbidden")]
    Forbidden,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<MembershipError> for PresenceError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::ChannelNotFound | MembershipError::WorkspaceNotFound => {
                PresenceError::ChannelNotFound
            }
            MembershipError::Storage(e) => PresenceError::Storage(e),
            MembershipError::OwnerRemovalForbidden | MembershipError::NotWorkspaceMember => {
                PresenceError::Forbidden
            }
        }
    }
}

/// Per-channel typing state with TTL-based expiry
pub struct PresenceTracker {
    ttl: Duration,
    authority: Arc<MembershipAuthority>,
    broadcaster: Arc<EventBroadcaster>,
    signals: Mutex<HashMap<(ChannelId, UserId), TypingSignal>>,
}

impl PresenceTracker {
    pub fn new(
        authority: Arc<MembershipAuthority>,
        broadcaster: Arc<EventBroadcaster>,
        ttl: Duration,
    ) -> Self {
        Self {
            ttl,
            authority,
            broadcaster,
            signals: Mutex::new(HashMap::new()),
        }
    }

    /// The configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, signal: &TypingSignal, now: Timestamp) -> bool {
        (now.millis_since(signal.last_seen_at) as u128) < self.ttl.as_millis()
    }

    /// Record or refresh a typing signal for (channel, user) and
    /// broadcast it to `typing/channel/{id}` subscribers.
    pub fn signal(&self, channel: ChannelId, user: &UserRecord) -> Result<(), PresenceError> {
        if !self.authority.can_view_channel(user.id, channel)? {
            return Err(PresenceError::Forbidden);
        }

        let now = Timestamp::now();
        {
            let mut signals = self.signals.lock().unwrap();
            signals.insert(
                (channel, user.id),
                TypingSignal {
                    channel_id: channel,
                    user_id: user.id,
                    username: user.username.clone(),
                    last_seen_at: now,
                },
            );
            // Opportunistic hygiene while the lock is held
            signals.retain(|_, s| self.is_fresh(s, now));
        }
        crate::metrics::record_typing_signal();

        let delivered = self.broadcaster.publish(
            Topic::Typing(channel),
            EventEnvelope::Typing(TypingRecord {
                user_id: user.id,
                username: user.username.clone(),
                channel_id: channel,
            }),
        );
        trace!(%channel, user = %user.id, delivered, "typing signal");

        Ok(())
    }

    /// Signals for a channel still inside the TTL, ordered by user id
    pub fn typing_in(&self, channel: ChannelId) -> Vec<TypingSignal> {
        let now = Timestamp::now();
        let signals = self.signals.lock().unwrap();
        let mut fresh: Vec<TypingSignal> = signals
            .values()
            .filter(|s| s.channel_id == channel && self.is_fresh(s, now))
            .cloned()
            .collect();
        fresh.sort_by_key(|s| s.user_id);
        fresh
    }

    /// Drop every expired signal; returns how many were removed
    pub fn sweep(&self) -> usize {
        let now = Timestamp::now();
        let mut signals = self.signals.lock().unwrap();
        let before = signals.len();
        signals.retain(|_, s| self.is_fresh(s, now));
        before - signals.len()
    }

    /// Number of signals currently held (fresh or not yet pruned)
    pub fn len(&self) -> usize {
        self.signals.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_workspace::ChatStore;

    struct Fixture {
        store: Arc<ChatStore>,
        authority: Arc<MembershipAuthority>,
        broadcaster: Arc<EventBroadcaster>,
        alice: UserRecord,
        bob: UserRecord,
    }

    fn user(id: i64, name: &str) -> UserRecord {
        UserRecord {
            id: UserId::new(id),
            email: format!("{}@example.com", name),
            username: name.to_string(),
        }
    }

    fn setup() -> Fixture {
        let store = Arc::new(ChatStore::memory().unwrap());
        let authority = Arc::new(MembershipAuthority::new(store.clone(), false));
        let broadcaster = Arc::new(EventBroadcaster::default());
        Fixture {
            store,
            authority,
            broadcaster,
            alice: user(1, "alice"),
            bob: user(2, "bob"),
        }
    }

    fn tracker(fx: &Fixture, ttl: Duration) -> PresenceTracker {
        PresenceTracker::new(fx.authority.clone(), fx.broadcaster.clone(), ttl)
    }

    fn channel_for(fx: &Fixture) -> ChannelId {
        let ws = fx
            .store
            .create_workspace("Engineering", fx.alice.id, Timestamp::now())
            .unwrap();
        fx.store
            .create_channel(ws.id, "general", fx.alice.id, Timestamp::now())
            .unwrap()
            .id
    }

    #[test]
    fn test_signal_requires_channel_membership() {
        let fx = setup();
        let tracker = tracker(&fx, DEFAULT_TYPING_TTL);
        let channel = channel_for(&fx);

        let result = tracker.signal(channel, &fx.bob);
        assert!(matches!(result, Err(PresenceError::Forbidden)));
        assert!(tracker.typing_in(channel).is_empty());
    }

    #[test]
    fn test_signal_records_and_refreshes() {
        let fx = setup();
        let tracker = tracker(&fx, DEFAULT_TYPING_TTL);
        let channel = channel_for(&fx);

        tracker.signal(channel, &fx.alice).unwrap();
        let first = tracker.typing_in(channel);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].username, "alice");

        // A refresh replaces, never duplicates
        tracker.signal(channel, &fx.alice).unwrap();
        let second = tracker.typing_in(channel);
        assert_eq!(second.len(), 1);
        assert!(second[0].last_seen_at >= first[0].last_seen_at);
    }

    #[test]
    fn test_signals_expire_after_ttl() {
        let fx = setup();
        let tracker = tracker(&fx, Duration::from_millis(30));
        let channel = channel_for(&fx);

        tracker.signal(channel, &fx.alice).unwrap();
        assert_eq!(tracker.typing_in(channel).len(), 1);

        std::thread::sleep(Duration::from_millis(50));
        assert!(tracker.typing_in(channel).is_empty());
    }

    #[test]
    fn test_sweep_drops_expired() {
        let fx = setup();
        let tracker = tracker(&fx, Duration::from_millis(30));
        let channel = channel_for(&fx);

        tracker.signal(channel, &fx.alice).unwrap();
        assert_eq!(tracker.len(), 1);

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(tracker.sweep(), 1);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_missing_channel_reported() {
        let fx = setup();
        let tracker = tracker(&fx, DEFAULT_TYPING_TTL);
        let result = tracker.signal(ChannelId::new(404), &fx.alice);
        assert!(matches!(result, Err(PresenceError::ChannelNotFound)));
    }

    #[tokio::test]
    async fn test_signal_broadcasts_typing_event() {
        let fx = setup();
        let tracker = tracker(&fx, DEFAULT_TYPING_TTL);
        let channel = channel_for(&fx);

        let mut rx = fx.broadcaster.subscribe(Topic::Typing(channel));
        tracker.signal(channel, &fx.alice).unwrap();

        let event = rx.recv().await.unwrap();
        match event {
            EventEnvelope::Typing(record) => {
                assert_eq!(record.user_id, fx.alice.id);
                assert_eq!(record.username, "alice");
                assert_eq!(record.channel_id, channel);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
