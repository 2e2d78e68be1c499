//! Palaver core: a multi-tenant chat engine
//!
//! Users organize into workspaces, workspaces contain channels, and
//! channels carry ordered messages. The core couples a nested,
//! invariant-preserving membership model with a topic-based event
//! layer that fans persisted messages and ephemeral typing signals out
//! to subscribed clients.
//!
//! - [`core_workspace`] — workspaces, channels, the membership
//!   authority, and durable storage
//! - [`core_message`] — the append-only per-channel message log
//! - [`core_presence`] — TTL-expiring typing state
//! - [`core_events`] — topic-scoped pub-sub fan-out
//! - [`core_users`] — the external user directory boundary
//! - [`service`] — the inbound command façade protocol layers call

pub mod config;
pub mod core_events;
pub mod core_message;
pub mod core_presence;
pub mod core_users;
pub mod core_workspace;
pub mod logging;
pub mod metrics;
pub mod service;

pub use config::Config;
pub use logging::{init_logging, LogLevel};
pub use service::{ChatError, ChatService, MemberAddOutcome, MemberRef};
