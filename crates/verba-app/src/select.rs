use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kanal::AsyncSender;
use tokio::sync::{Mutex, oneshot};
use uuid::Uuid;

use verba_core::select::{ChoiceOutcome, ChoicePrompt, SelectPort};

use crate::events::{Reply, ReplyBody};

#[derive(Debug, Clone, Copy)]
pub enum SelectionReply {
    Pick(usize),
    Cancel,
}

struct Pending {
    token: Uuid,
    choice_count: usize,
    tx: oneshot::Sender<SelectionReply>,
}

/// In-flight selection prompts, one per user, resolved by correlation
/// token rather than by filtering a shared event stream.
#[derive(Default)]
pub struct PendingSelections {
    inner: Mutex<HashMap<String, Pending>>,
}

impl PendingSelections {
    pub fn new() -> Self {
        Self::default()
    }

    /// A newer prompt supersedes the user's older one: dropping the old
    /// sender resolves the superseded wait as cancelled.
    pub async fn register(
        &self,
        user: &str,
        choice_count: usize,
    ) -> (Uuid, oneshot::Receiver<SelectionReply>) {
        let token = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        self.inner.lock().await.insert(
            user.to_string(),
            Pending {
                token,
                choice_count,
                tx,
            },
        );
        (token, rx)
    }

    /// Consume the message if it answers the user's pending prompt: a
    /// number within range picks, `c`/`cancel` cancels. Anything else is
    /// left for command parsing.
    pub async fn try_resolve(&self, user: &str, text: &str) -> bool {
        let trimmed = text.trim();
        let mut map = self.inner.lock().await;
        let Some(pending) = map.get(user) else {
            return false;
        };

        let reply = if trimmed.eq_ignore_ascii_case("c") || trimmed.eq_ignore_ascii_case("cancel")
        {
            Some(SelectionReply::Cancel)
        } else if let Ok(n) = trimmed.parse::<usize>() {
            (1..=pending.choice_count)
                .contains(&n)
                .then_some(SelectionReply::Pick(n - 1))
        } else {
            None
        };

        match reply {
            Some(reply) => {
                let pending = map.remove(user).unwrap();
                let _ = pending.tx.send(reply);
                true
            }
            None => false,
        }
    }

    /// Drop the prompt if it is still the one identified by `token`.
    pub async fn abandon(&self, user: &str, token: Uuid) {
        let mut map = self.inner.lock().await;
        if map.get(user).is_some_and(|p| p.token == token) {
            map.remove(user);
        }
    }
}

/// `SelectPort` over the outbound reply channel: sends the prompt as a
/// menu, then suspends on a oneshot until the user answers, cancels, a
/// newer prompt supersedes this one, or the timeout elapses.
pub struct ChannelSelectPort {
    pending: Arc<PendingSelections>,
    out_tx: AsyncSender<Reply>,
}

impl ChannelSelectPort {
    pub fn new(pending: Arc<PendingSelections>, out_tx: AsyncSender<Reply>) -> Self {
        Self { pending, out_tx }
    }
}

#[async_trait]
impl SelectPort for ChannelSelectPort {
    async fn present_choices(&self, user: &str, prompt: ChoicePrompt) -> ChoiceOutcome {
        let wait = prompt.timeout;
        let (token, rx) = self.pending.register(user, prompt.choices.len()).await;

        let sent = self
            .out_tx
            .send(Reply {
                user: user.to_string(),
                body: ReplyBody::Menu { token, prompt },
            })
            .await;
        if sent.is_err() {
            self.pending.abandon(user, token).await;
            return ChoiceOutcome::Cancelled;
        }

        match tokio::time::timeout(wait, rx).await {
            Ok(Ok(SelectionReply::Pick(index))) => ChoiceOutcome::Selected(index),
            Ok(Ok(SelectionReply::Cancel)) => ChoiceOutcome::Cancelled,
            // superseded by a newer prompt
            Ok(Err(_)) => ChoiceOutcome::Cancelled,
            Err(_) => {
                self.pending.abandon(user, token).await;
                ChoiceOutcome::TimedOut
            }
        }
    }
}
