//! Server state shared across requests

use palaver_core::core_users::InMemoryUserDirectory;
use palaver_core::ChatService;
use std::sync::Arc;

/// Everything a handler needs: the chat core and the user directory
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ChatService>,
    pub users: Arc<InMemoryUserDirectory>,
}

impl AppState {
    pub fn new(service: Arc<ChatService>, users: Arc<InMemoryUserDirectory>) -> Self {
        Self { service, users }
    }
}
