use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use verba_core::select::{Choice, ChoiceOutcome, ChoicePrompt, SelectPort};

use crate::events::ReplyBody;
use crate::select::{ChannelSelectPort, PendingSelections};

fn prompt(choices: usize, wait: Duration) -> ChoicePrompt {
    ChoicePrompt {
        title: "Multiple meanings of \"bread\" found:".to_string(),
        choices: (0..choices)
            .map(|i| Choice {
                label: format!("{}. noun", i + 1),
                description: None,
            })
            .collect(),
        truncated: false,
        timeout: wait,
    }
}

#[tokio::test]
async fn numeric_reply_resolves_the_pending_prompt() {
    let pending = Arc::new(PendingSelections::new());
    let (out_tx, out_rx) = kanal::bounded_async(8);
    let port = Arc::new(ChannelSelectPort::new(pending.clone(), out_tx));

    let presented = {
        let port = port.clone();
        tokio::spawn(async move {
            port.present_choices("alice", prompt(3, Duration::from_secs(2)))
                .await
        })
    };

    // the prompt goes out as a menu before any resolution
    let reply = timeout(Duration::from_secs(2), out_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(reply.body, ReplyBody::Menu { .. }));

    assert!(pending.try_resolve("alice", "2").await);
    let outcome = timeout(Duration::from_secs(2), presented)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome, ChoiceOutcome::Selected(1));
}

#[tokio::test]
async fn cancel_reply_cancels() {
    let pending = Arc::new(PendingSelections::new());
    let (out_tx, out_rx) = kanal::bounded_async(8);
    let port = Arc::new(ChannelSelectPort::new(pending.clone(), out_tx));

    let presented = {
        let port = port.clone();
        tokio::spawn(async move {
            port.present_choices("alice", prompt(3, Duration::from_secs(2)))
                .await
        })
    };

    let _ = timeout(Duration::from_secs(2), out_rx.recv()).await.unwrap();
    assert!(pending.try_resolve("alice", "c").await);

    let outcome = timeout(Duration::from_secs(2), presented)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome, ChoiceOutcome::Cancelled);
}

#[tokio::test]
async fn unanswered_prompt_times_out_and_clears() {
    let pending = Arc::new(PendingSelections::new());
    let (out_tx, out_rx) = kanal::bounded_async(8);
    let port = ChannelSelectPort::new(pending.clone(), out_tx);

    let outcome = timeout(
        Duration::from_secs(2),
        port.present_choices("alice", prompt(3, Duration::from_millis(50))),
    )
    .await
    .unwrap();
    assert_eq!(outcome, ChoiceOutcome::TimedOut);
    drop(out_rx);

    // nothing pending anymore; a late numeric line is a normal message
    assert!(!pending.try_resolve("alice", "1").await);
}

#[tokio::test]
async fn irrelevant_messages_do_not_consume_the_prompt() {
    let pending = Arc::new(PendingSelections::new());
    let (_token, _rx) = pending.register("alice", 3).await;

    assert!(!pending.try_resolve("alice", "!ping").await);
    assert!(!pending.try_resolve("alice", "9").await); // out of range
    assert!(!pending.try_resolve("bob", "1").await); // someone else
    assert!(pending.try_resolve("alice", "1").await);
}

#[tokio::test]
async fn newer_prompt_supersedes_the_older_one() {
    let pending = Arc::new(PendingSelections::new());
    let (_old_token, old_rx) = pending.register("alice", 3).await;
    let (_new_token, new_rx) = pending.register("alice", 2).await;

    // the superseded wait resolves as closed
    assert!(
        timeout(Duration::from_secs(2), old_rx)
            .await
            .unwrap()
            .is_err()
    );

    assert!(pending.try_resolve("alice", "2").await);
    assert!(
        timeout(Duration::from_secs(2), new_rx)
            .await
            .unwrap()
            .is_ok()
    );
}
