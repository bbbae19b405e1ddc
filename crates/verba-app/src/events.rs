use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use verba_core::select::ChoicePrompt;

use crate::handler;
use crate::select::ChannelSelectPort;
use crate::state::AppState;

/// One inbound chat line.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub user: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub enum ReplyBody {
    Text(String),
    Menu { token: Uuid, prompt: ChoicePrompt },
    File { name: String, content: String },
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub user: String,
    pub body: ReplyBody,
}

impl Reply {
    pub fn text(user: &str, body: impl Into<String>) -> Self {
        Reply {
            user: user.to_string(),
            body: ReplyBody::Text(body.into()),
        }
    }
}

/// App main loop: replies to pending selections are resolved inline;
/// everything else is handed to a per-message handler task so a lookup
/// blocked on selection never stalls the loop.
pub async fn event_loop(
    state: Arc<AppState>,
    in_rx: AsyncReceiver<ChatMessage>,
    out_tx: AsyncSender<Reply>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let select_port = Arc::new(ChannelSelectPort::new(
        state.pending.clone(),
        out_tx.clone(),
    ));

    tracing::info!("event loop started");
    loop {
        let msg = tokio::select! {
            _ = cancel.cancelled() => break,
            msg = in_rx.recv() => msg?,
        };

        if state.pending.try_resolve(&msg.user, &msg.text).await {
            continue;
        }

        let state = state.clone();
        let out = out_tx.clone();
        let port = select_port.clone();
        tokio::spawn(async move {
            if let Err(e) =
                handler::handle_message(state, &msg.user, &msg.text, &out, port.as_ref()).await
            {
                tracing::error!(error = %e, user = msg.user, "message handler failed");
                let _ = out
                    .send(Reply::text(
                        &msg.user,
                        format!("Invalid input! Critical error: {e}"),
                    ))
                    .await;
            }
        });
    }

    tracing::info!("event loop stopped");
    Ok(())
}
