//! Transient typing presence, never persisted

pub mod tracker;

pub use tracker::{
    PresenceError, PresenceTracker, TypingRecord, TypingSignal, DEFAULT_TYPING_TTL,
    TYPING_THROTTLE_HINT,
};
