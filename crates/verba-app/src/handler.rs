use std::sync::Arc;
use std::time::Duration;

use kanal::AsyncSender;
use tokio::sync::Mutex;

use verba_anki::{CardStore, StoreError};
use verba_config::Config;
use verba_core::render::{to_card, to_display_text};
use verba_core::select::{ChoiceOutcome, SelectPort, meaning_choices, translation_choices};
use verba_core::{Card, FinalizedWord, Word, WordError};

use crate::commands::{Command, WordSpec, parse};
use crate::docs;
use crate::events::{Reply, ReplyBody};
use crate::session::UserSession;
use crate::state::AppState;

/// Entry point for one inbound message. Domain errors (`WordError`,
/// `StoreError`) are reported to the user per word; anything else
/// propagates to the event loop as a critical error.
pub async fn handle_message(
    state: Arc<AppState>,
    user: &str,
    content: &str,
    out: &AsyncSender<Reply>,
    select: &dyn SelectPort,
) -> anyhow::Result<()> {
    let config = state.config.read().await.clone();
    let session = state
        .sessions
        .get_or_create(user, &config, &state.registry)
        .await;
    let reading_mode = session.lock().await.settings.reading_mode;

    let Some(command) = parse(content, &config.app.command_prefix, reading_mode) else {
        return Ok(());
    };

    let mut handler = MessageHandler {
        config: &config,
        session,
        user,
        out,
        select,
        store_modified: false,
    };
    handler.dispatch(command).await?;

    if handler.store_modified {
        if let Some(store) = handler.session.lock().await.opened_store() {
            store.sync().await?;
        }
    }

    Ok(())
}

/// Transient per-message handler.
struct MessageHandler<'a> {
    config: &'a Config,
    session: Arc<Mutex<UserSession>>,
    user: &'a str,
    out: &'a AsyncSender<Reply>,
    select: &'a dyn SelectPort,
    store_modified: bool,
}

/// Messages for errors about the word, not the code.
fn domain_message(e: &anyhow::Error) -> Option<String> {
    if let Some(word_error) = e.downcast_ref::<WordError>() {
        Some(word_error.to_string())
    } else {
        e.downcast_ref::<StoreError>().map(|s| s.to_string())
    }
}

impl MessageHandler<'_> {
    async fn dispatch(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Help => self.send(docs::HELP).await?,
            Command::Ping => {
                self.send(format!("Pong! Version = {}", env!("CARGO_PKG_VERSION")))
                    .await?
            }
            Command::ReadingMode => self.toggle_reading_mode().await?,
            Command::PrintSettings => self.print_settings().await?,
            Command::ChangeSettings(fragment) => self.change_settings(&fragment).await?,
            Command::ChangeDeck(deck) => {
                if self.require_admin().await? {
                    self.change_deck(&deck).await?;
                }
            }
            Command::ListWords => {
                if self.require_admin().await? {
                    self.caught(Self::list_words(self)).await?;
                }
            }
            Command::DownloadWords => {
                if self.require_admin().await? {
                    self.caught(Self::download_words(self)).await?;
                }
            }
            Command::Define {
                extended,
                lucky,
                words,
            } => {
                for spec in &words {
                    self.caught(Self::define_word(self, spec, extended, lucky))
                        .await?;
                }
            }
            Command::AddWord {
                force,
                extended,
                lucky,
                words,
            } => {
                if self.require_admin().await? {
                    for spec in words {
                        let result = self.add_word(&spec, force, extended, lucky).await;
                        self.report(result).await?;
                    }
                }
            }
            Command::ManualWord { force, cards } => {
                if self.require_admin().await? {
                    for raw in cards {
                        let result = self.manual_word(&raw, force).await;
                        self.report(result).await?;
                    }
                }
            }
            Command::FindWord(words) => {
                if self.require_admin().await? {
                    for raw in &words {
                        self.caught(Self::find_word(self, raw)).await?;
                    }
                }
            }
            Command::DeleteWord(words) => {
                if self.require_admin().await? {
                    for raw in words {
                        let result = self.delete_word(&raw).await;
                        self.report(result).await?;
                    }
                }
            }
            Command::Unknown(command) => {
                self.send(format!(
                    "Unknown command \"{command}\". Try {}help.",
                    self.config.app.command_prefix
                ))
                .await?
            }
        }
        Ok(())
    }

    async fn send(&self, body: impl Into<String>) -> anyhow::Result<()> {
        self.out.send(Reply::text(self.user, body)).await?;
        Ok(())
    }

    /// Run a per-word operation, reporting domain errors instead of
    /// aborting the remaining words.
    async fn caught(
        &self,
        op: impl Future<Output = anyhow::Result<()>>,
    ) -> anyhow::Result<()> {
        self.report(op.await).await
    }

    async fn report(&self, result: anyhow::Result<()>) -> anyhow::Result<()> {
        if let Err(e) = result {
            match domain_message(&e) {
                Some(message) => {
                    tracing::warn!(user = self.user, %message, "word errored");
                    self.send(format!("Error: {message}")).await?;
                }
                None => return Err(e),
            }
        }
        Ok(())
    }

    async fn require_admin(&self) -> anyhow::Result<bool> {
        let is_admin = self.session.lock().await.is_admin;
        if !is_admin {
            self.send("Sorry, only the deck owner can manage cards.")
                .await?;
        }
        Ok(is_admin)
    }

    async fn store(&self) -> anyhow::Result<Arc<dyn CardStore>> {
        let mut session = self.session.lock().await;
        Ok(session.store(self.config).await?)
    }

    async fn toggle_reading_mode(&self) -> anyhow::Result<()> {
        let mut session = self.session.lock().await;
        session.settings.reading_mode = !session.settings.reading_mode;
        let message = if session.settings.reading_mode {
            "Reading mode activated."
        } else {
            "Reading mode deactivated."
        };
        drop(session);
        self.send(message).await
    }

    async fn change_deck(&self, deck: &str) -> anyhow::Result<()> {
        self.session.lock().await.change_deck(deck);
        self.send(format!("Deck name changed to \"{deck}\".")).await
    }

    async fn print_settings(&self) -> anyhow::Result<()> {
        let settings = self.session.lock().await.settings.clone();
        let json = serde_json::to_string_pretty(&settings)?;
        self.send(format!("{}: \n```\n{json}\n```", self.user)).await
    }

    async fn change_settings(&self, fragment: &str) -> anyhow::Result<()> {
        let updated = self.session.lock().await.apply_settings(fragment);
        if updated {
            self.send("Settings updated.").await?;
            self.print_settings().await
        } else {
            self.send("Invalid settings!").await
        }
    }

    /// Fan the lookup plan out over the word, then apply any manual
    /// example so it spreads across all candidates like any other bare
    /// example contribution.
    async fn resolve(&self, spec: &WordSpec, extended: bool) -> anyhow::Result<Word> {
        let plan = self.session.lock().await.plan(extended);
        let mut word = Word::lookup(&spec.text, &plan, spec.manual_pos.clone()).await?;
        if let Some(example) = &spec.manual_example {
            word.push_examples(vec![example.clone()]);
        }
        Ok(word)
    }

    /// Collapse candidates to one finalized word. `None` means the user
    /// cancelled or the prompt timed out and the lookup is abandoned.
    async fn finalize(&self, word: &Word, lucky: bool) -> anyhow::Result<Option<FinalizedWord>> {
        let limits = self
            .session
            .lock()
            .await
            .limits(self.config.lookup.dedup_top_up);
        let timeout = Duration::from_secs(self.config.app.select_timeout_secs);

        let mindex = match word.meanings.len() {
            0 => None,
            1 => Some(0),
            _ if lucky => Some(0),
            _ => {
                match self
                    .select
                    .present_choices(self.user, meaning_choices(word, timeout))
                    .await
                {
                    ChoiceOutcome::Selected(index) => Some(index),
                    ChoiceOutcome::Cancelled => {
                        self.send("Selection cancelled.").await?;
                        return Ok(None);
                    }
                    ChoiceOutcome::TimedOut => {
                        self.send("Selection timed out.").await?;
                        return Ok(None);
                    }
                }
            }
        };

        let tindex = match word.translations.len() {
            0 => None,
            1 => Some(0),
            _ if lucky => Some(0),
            _ => {
                match self
                    .select
                    .present_choices(self.user, translation_choices(word, timeout))
                    .await
                {
                    ChoiceOutcome::Selected(index) => Some(index),
                    ChoiceOutcome::Cancelled => {
                        self.send("Selection cancelled.").await?;
                        return Ok(None);
                    }
                    ChoiceOutcome::TimedOut => {
                        self.send("Selection timed out.").await?;
                        return Ok(None);
                    }
                }
            }
        };

        Ok(Some(word.finalized(mindex, tindex, &limits)?))
    }

    async fn define_word(&self, spec: &WordSpec, extended: bool, lucky: bool) -> anyhow::Result<()> {
        let word = self.resolve(spec, extended).await?;
        let Some(final_word) = self.finalize(&word, lucky).await? else {
            return Ok(());
        };
        self.send(to_display_text(&final_word)?).await
    }

    async fn add_word(
        &mut self,
        spec: &WordSpec,
        force: bool,
        extended: bool,
        lucky: bool,
    ) -> anyhow::Result<()> {
        let store = self.store().await?;
        let existing = store.find(&spec.text).await?;

        if let Some(card) = &existing {
            if !force {
                self.send(format!("\"{}\" already exists!", card.front))
                    .await?;
                return Ok(());
            }
        }

        let word = self.resolve(spec, extended).await?;
        let Some(final_word) = self.finalize(&word, lucky).await? else {
            return Ok(());
        };
        self.send(to_display_text(&final_word)?).await?;

        let card = to_card(&final_word)?;
        if existing.is_some() {
            store.update(&card).await?;
            self.send(format!("Back updated for \"{}\".", card.front))
                .await?;
        } else {
            store.add(&card).await?;
            self.send(format!("\"{}\" added successfully!", card.front))
                .await?;
        }
        self.store_modified = true;
        Ok(())
    }

    async fn manual_word(&mut self, raw: &str, force: bool) -> anyhow::Result<()> {
        let (front, back) = raw.split_once('|').unwrap_or((raw, ""));
        let card = Card {
            front: front.trim().to_string(),
            back: back.trim().replace('\n', " <br> "),
        };

        let store = self.store().await?;
        let existing = store.find(&card.front).await?;

        if existing.is_some() && !force {
            self.send(format!("\"{}\" already exists!", card.front))
                .await?;
            return Ok(());
        }

        if existing.is_some() {
            store.update(&card).await?;
            self.send(format!("Back updated for \"{}\".", card.front))
                .await?;
        } else {
            store.add(&card).await?;
            self.send(format!("\"{}\" added successfully!", card.front))
                .await?;
        }
        self.store_modified = true;
        Ok(())
    }

    async fn find_word(&self, raw: &str) -> anyhow::Result<()> {
        let store = self.store().await?;
        match store.find(raw).await? {
            None => self.send(format!("\"{raw}\" not found!")).await,
            Some(card) if card.back.is_empty() => {
                self.send(format!("\"{raw}\" is found but has empty definition."))
                    .await
            }
            Some(card) => self.send(format!("**{}**\n{}", card.front, card.back)).await,
        }
    }

    async fn delete_word(&mut self, raw: &str) -> anyhow::Result<()> {
        let store = self.store().await?;
        if store.delete(raw).await? {
            self.store_modified = true;
            self.send(format!("\"{raw}\" deleted successfully!")).await
        } else {
            self.send(format!("\"{raw}\" not found!")).await
        }
    }

    async fn list_words(&self) -> anyhow::Result<()> {
        let store = self.store().await?;
        let mut fronts = store.list_fronts().await?;
        if fronts.is_empty() {
            return self.send("Deck is empty").await;
        }
        fronts.sort_by_key(|front| front.to_lowercase());

        // chunked into code fences that fit one chat message
        let budget = self.config.app.chunk_limit.saturating_sub(7);
        let mut current = String::new();
        for front in fronts {
            let entry = format!("{front},, ");
            if !current.is_empty() && current.len() + entry.len() > budget {
                self.send(format!("```{}```", current.trim_end_matches(",, ")))
                    .await?;
                current.clear();
            }
            current.push_str(&entry);
        }
        if !current.is_empty() {
            self.send(format!("```{}```", current.trim_end_matches(",, ")))
                .await?;
        }
        Ok(())
    }

    async fn download_words(&self) -> anyhow::Result<()> {
        let store = self.store().await?;
        let cards = store.list().await?;

        let mut content = String::new();
        for card in &cards {
            content.push_str(&format!("{}\t{}\n", card.front, card.back));
        }

        self.send(format!("Here you go! ({} cards)", cards.len()))
            .await?;
        self.out
            .send(Reply {
                user: self.user.to_string(),
                body: ReplyBody::File {
                    name: "export.txt".to_string(),
                    content,
                },
            })
            .await?;
        Ok(())
    }
}
