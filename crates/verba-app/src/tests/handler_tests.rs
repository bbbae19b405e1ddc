use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::timeout;

use verba_anki::{Card, CardStore, StoreError};
use verba_config::Config;
use verba_core::select::{ChoiceOutcome, ChoicePrompt, SelectPort};

use crate::events::ReplyBody;
use crate::handler::handle_message;
use crate::state::AppState;

/// Deck store over a map. A poisoned front errors on access so per-word
/// error reporting can be exercised.
struct MemoryStore {
    deck: String,
    cards: Mutex<HashMap<String, String>>,
    poison: Option<String>,
}

impl MemoryStore {
    fn new(poison: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            deck: "Test Deck".to_string(),
            cards: Mutex::new(HashMap::new()),
            poison: poison.map(String::from),
        })
    }

    fn check_poison(&self, front: &str) -> Result<(), StoreError> {
        if self.poison.as_deref() == Some(front) {
            return Err(StoreError::Server("store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CardStore for MemoryStore {
    fn deck(&self) -> &str {
        &self.deck
    }

    async fn add(&self, card: &Card) -> Result<(), StoreError> {
        let mut cards = self.cards.lock().await;
        if cards.contains_key(&card.front) {
            return Err(StoreError::DuplicateCard(card.front.clone()));
        }
        cards.insert(card.front.clone(), card.back.clone());
        Ok(())
    }

    async fn add_all(&self, cards: &[Card]) -> Result<(), StoreError> {
        for card in cards {
            self.add(card).await?;
        }
        Ok(())
    }

    async fn update(&self, card: &Card) -> Result<(), StoreError> {
        let mut cards = self.cards.lock().await;
        match cards.get_mut(&card.front) {
            Some(back) => {
                *back = card.back.clone();
                Ok(())
            }
            None => Err(StoreError::CardNotFound(card.front.clone())),
        }
    }

    async fn find(&self, front: &str) -> Result<Option<Card>, StoreError> {
        self.check_poison(front)?;
        Ok(self.cards.lock().await.get(front).map(|back| Card {
            front: front.to_string(),
            back: back.clone(),
        }))
    }

    async fn delete(&self, front: &str) -> Result<bool, StoreError> {
        self.check_poison(front)?;
        Ok(self.cards.lock().await.remove(front).is_some())
    }

    async fn list(&self) -> Result<Vec<Card>, StoreError> {
        Ok(self
            .cards
            .lock()
            .await
            .iter()
            .map(|(front, back)| Card {
                front: front.clone(),
                back: back.clone(),
            })
            .collect())
    }

    async fn list_fronts(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.cards.lock().await.keys().cloned().collect())
    }

    async fn sync(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// The store-command tests never reach a selection prompt.
struct NoPrompt;

#[async_trait]
impl SelectPort for NoPrompt {
    async fn present_choices(&self, _user: &str, _prompt: ChoicePrompt) -> ChoiceOutcome {
        ChoiceOutcome::Cancelled
    }
}

async fn fixture(user: &str, poison: Option<&str>) -> (Arc<AppState>, Arc<MemoryStore>) {
    let mut config = Config::new();
    config.app.command_prefix = "!".to_string();
    config.app.admin_user = "admin".to_string();
    let state = Arc::new(AppState::new(config));
    let store = MemoryStore::new(poison);

    let config = state.config.read().await.clone();
    let session = state
        .sessions
        .get_or_create(user, &config, &state.registry)
        .await;
    session.lock().await.install_store(store.clone());

    (state, store)
}

async fn run(state: &Arc<AppState>, user: &str, line: &str, expect: usize) -> Vec<String> {
    let (out_tx, out_rx) = kanal::bounded_async(16);
    handle_message(state.clone(), user, line, &out_tx, &NoPrompt)
        .await
        .unwrap();

    let mut replies = Vec::new();
    for _ in 0..expect {
        let reply = timeout(Duration::from_secs(2), out_rx.recv())
            .await
            .unwrap()
            .unwrap();
        match reply.body {
            ReplyBody::Text(text) => replies.push(text),
            other => panic!("unexpected reply body: {other:?}"),
        }
    }
    replies
}

#[tokio::test]
async fn non_admin_store_commands_are_refused() {
    let (state, store) = fixture("bob", None).await;

    let replies = run(&state, "bob", "!mw bread | baked food", 1).await;
    assert_eq!(replies, ["Sorry, only the deck owner can manage cards."]);
    assert!(store.cards.lock().await.is_empty());
}

#[tokio::test]
async fn manual_add_refuses_duplicates_unless_forced() {
    let (state, store) = fixture("admin", None).await;

    let replies = run(&state, "admin", "!mw bread | baked food", 1).await;
    assert_eq!(replies, ["\"bread\" added successfully!"]);

    let replies = run(&state, "admin", "!mw bread | stale", 1).await;
    assert_eq!(replies, ["\"bread\" already exists!"]);

    let replies = run(&state, "admin", "!mwf bread | fresh", 1).await;
    assert_eq!(replies, ["Back updated for \"bread\"."]);
    assert_eq!(
        store.cards.lock().await.get("bread").map(String::as_str),
        Some("fresh")
    );
}

#[tokio::test]
async fn word_errors_are_reported_per_item_without_aborting_the_rest() {
    let (state, store) = fixture("admin", Some("poison")).await;
    store
        .cards
        .lock()
        .await
        .insert("bread".to_string(), "baked food".to_string());

    let replies = run(&state, "admin", "!delw poison,, bread", 2).await;
    assert_eq!(replies[0], "Error: Flashcard server errored: store offline");
    assert_eq!(replies[1], "\"bread\" deleted successfully!");
    assert!(store.cards.lock().await.is_empty());
}

#[tokio::test]
async fn unforced_add_reports_existing_before_any_lookup() {
    let (state, store) = fixture("admin", None).await;
    store
        .cards
        .lock()
        .await
        .insert("bread".to_string(), "baked food".to_string());

    // no provider plan runs: the reply comes straight from the store check
    let replies = run(&state, "admin", "!w bread", 1).await;
    assert_eq!(replies, ["\"bread\" already exists!"]);
}

#[tokio::test]
async fn empty_settings_fragment_is_invalid() {
    let (state, _store) = fixture("admin", None).await;

    let replies = run(&state, "admin", "!cs", 1).await;
    assert_eq!(replies, ["Invalid settings!"]);

    let replies = run(&state, "admin", "!cs \"reading_mode\": true", 2).await;
    assert_eq!(replies[0], "Settings updated.");
    assert!(replies[1].contains("\"reading_mode\": true"));
}
