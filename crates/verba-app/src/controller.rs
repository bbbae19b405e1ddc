use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::{ChatMessage, Reply, event_loop};
use crate::io::console_io;
use crate::state::AppState;

/// Centralized channel management
pub struct ChannelSet {
    pub chat: (AsyncSender<ChatMessage>, AsyncReceiver<ChatMessage>),
    pub replies: (AsyncSender<Reply>, AsyncReceiver<Reply>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            chat: kanal::bounded_async(64),     // inbound user lines
            replies: kanal::bounded_async(256), // lookups burst replies
        }
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn chat_sender(&self) -> AsyncSender<ChatMessage> {
        self.channels.chat.0.clone()
    }

    pub fn spawn_tasks(&self, user: String, chunk_limit: usize) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        tasks.spawn(event_loop(
            self.state.clone(),
            self.channels.chat.1.clone(),
            self.channels.replies.0.clone(),
            self.cancel_token.child_token(),
        ));

        tasks.spawn(console_io(
            self.channels.chat.0.clone(),
            self.channels.replies.1.clone(),
            user,
            chunk_limit,
            self.cancel_token.child_token(),
        ));

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
