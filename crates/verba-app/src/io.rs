use kanal::{AsyncReceiver, AsyncSender};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use verba_core::select::ChoicePrompt;

use crate::events::{ChatMessage, Reply, ReplyBody};

/// Console chat transport: stdin lines become messages from `user`,
/// replies are printed to stdout, long texts chunked to the chat-size
/// limit.
pub async fn console_io(
    in_tx: AsyncSender<ChatMessage>,
    out_rx: AsyncReceiver<Reply>,
    user: String,
    chunk_limit: usize,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => {
                match line? {
                    Some(text) if !text.trim().is_empty() => {
                        in_tx
                            .send(ChatMessage {
                                user: user.clone(),
                                text,
                            })
                            .await?;
                    }
                    Some(_) => {}
                    // stdin closed
                    None => break,
                }
            }
            reply = out_rx.recv() => print_reply(reply?, chunk_limit),
        }
    }

    tracing::info!("console transport stopped");
    Ok(())
}

fn print_reply(reply: Reply, chunk_limit: usize) {
    match reply.body {
        ReplyBody::Text(body) => {
            for chunk in chunk_message(&body, chunk_limit) {
                println!("{chunk}");
            }
        }
        ReplyBody::Menu { prompt, .. } => println!("{}", render_menu(&prompt)),
        ReplyBody::File { name, content } => {
            println!("--- {name} ---");
            print!("{content}");
            println!("--- end of {name} ---");
        }
    }
}

/// Splits a long body into `>>> `-prefixed chunks; every chunk but the
/// last carries a continuation ellipsis.
pub fn chunk_message(body: &str, chunk_limit: usize) -> Vec<String> {
    const PREFIX: &str = ">>> ";
    let budget = chunk_limit.saturating_sub(1 + PREFIX.len()).max(1);

    let chars: Vec<char> = body.chars().collect();
    let mut chunks: Vec<String> = chars
        .chunks(budget)
        .map(|chunk| format!("{PREFIX}{}…", chunk.iter().collect::<String>()))
        .collect();

    if let Some(last) = chunks.last_mut() {
        last.pop();
    }
    chunks
}

fn render_menu(prompt: &ChoicePrompt) -> String {
    let mut out = String::new();
    out.push_str(&prompt.title);
    for choice in &prompt.choices {
        out.push('\n');
        out.push_str(&choice.label);
        if let Some(description) = &choice.description {
            out.push_str(" — ");
            out.push_str(description);
        }
    }
    if prompt.truncated {
        out.push_str("\n(more candidates exist)");
    }
    out.push_str("\nc. Cancel");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_stay_one_chunk() {
        let chunks = chunk_message("hello", 2000);
        assert_eq!(chunks, [">>> hello"]);
    }

    #[test]
    fn long_bodies_split_with_continuation_markers() {
        let body = "x".repeat(4000);
        let chunks = chunk_message(&body, 2000);
        assert!(chunks.len() > 1);
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.starts_with(">>> "));
            assert!(chunk.ends_with('…'));
            assert!(chunk.chars().count() <= 2000);
        }
        assert!(!chunks.last().unwrap().ends_with('…'));

        let total: usize = chunks
            .iter()
            .map(|c| {
                c.trim_start_matches(">>> ")
                    .trim_end_matches('…')
                    .chars()
                    .count()
            })
            .sum();
        assert_eq!(total, 4000);
    }
}
