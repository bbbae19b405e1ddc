use std::env;

use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Prefix stripped from commands, e.g. `!w bread`.
    pub command_prefix: String,
    /// The one user id allowed to touch the flashcard store.
    pub admin_user: String,
    /// Outbound messages are chunked to this many characters.
    pub chunk_limit: usize,
    /// How long an interactive selection waits before timing out.
    pub select_timeout_secs: u64,
}

impl AppConfig {
    pub fn new() -> Self {
        let command_prefix = env::var("COMMAND_PREFIX").unwrap_or_else(|_| "!".to_string());

        let admin_user = env::var("ADMIN_USER").unwrap_or_else(|_| "admin".to_string());

        let chunk_limit = env::var("CHUNK_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2000); // chat platform message limit

        let select_timeout_secs = env::var("SELECT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        Self {
            command_prefix,
            admin_user,
            chunk_limit,
            select_timeout_secs,
        }
    }
}
