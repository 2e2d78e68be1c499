//! Ordered, append-only message history per channel

pub mod log;
pub mod message;

pub use log::{MessageError, MessageLog, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
pub use message::{AuthorRecord, Message, MessageRecord};
