use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use verba_core::Card;

use crate::{CardStore, StoreError};

const VERSION: u32 = 6;
const DUPLICATE_NOTE: &str = "cannot create note because it is a duplicate";

/// AnkiConnect adapter for one deck. `open` ensures the deck exists.
pub struct AnkiStore {
    base_url: String,
    deck: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct AnkiResponse<T> {
    result: Option<T>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct NoteInfo {
    fields: NoteFields,
}

#[derive(Deserialize)]
struct NoteFields {
    #[serde(rename = "Front")]
    front: FieldValue,
    #[serde(rename = "Back")]
    back: FieldValue,
}

#[derive(Deserialize)]
struct FieldValue {
    value: String,
}

impl AnkiStore {
    pub async fn open(base_url: &str, deck: &str, model: &str) -> Result<Self, StoreError> {
        let store = Self {
            base_url: base_url.to_string(),
            deck: deck.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        };

        let decks: Vec<String> = store.invoke("deckNames", json!({})).await?;
        if !decks.iter().any(|d| d == deck) {
            let _: Value = store.invoke("createDeck", json!({"deck": deck})).await?;
            tracing::info!(deck, "created missing deck");
        }

        Ok(store)
    }

    async fn invoke<T>(&self, action: &str, params: Value) -> Result<T, StoreError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let request = json!({
            "action": action,
            "version": VERSION,
            "params": params,
        });

        let response: AnkiResponse<T> = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(StoreError::Server(error));
        }
        response
            .result
            .ok_or_else(|| StoreError::Server(format!("null result for {action}")))
    }

    fn note_params(&self, card: &Card) -> Value {
        json!({
            "deckName": self.deck,
            "modelName": self.model,
            "fields": {
                "Front": card.front,
                "Back": card.back,
            },
            "options": {
                "allowDuplicate": false,
                "duplicateScope": "deck",
            }
        })
    }

    async fn find_ids(&self, front: &str) -> Result<Vec<u64>, StoreError> {
        self.invoke(
            "findNotes",
            json!({"query": format!("front:\"{front}\" deck:\"{}\"", self.deck)}),
        )
        .await
    }

    async fn find_id(&self, front: &str) -> Result<u64, StoreError> {
        let ids = self.find_ids(front).await?;
        match ids.as_slice() {
            [] => Err(StoreError::CardNotFound(front.to_string())),
            [id] => Ok(*id),
            _ => Err(StoreError::DuplicateCard(front.to_string())),
        }
    }

    async fn notes_info(&self, notes: &[u64]) -> Result<Vec<Card>, StoreError> {
        let infos: Vec<NoteInfo> = self.invoke("notesInfo", json!({"notes": notes})).await?;
        Ok(infos
            .into_iter()
            .map(|info| Card {
                front: info.fields.front.value,
                back: info.fields.back.value,
            })
            .collect())
    }
}

#[async_trait]
impl CardStore for AnkiStore {
    fn deck(&self) -> &str {
        &self.deck
    }

    async fn add(&self, card: &Card) -> Result<(), StoreError> {
        let result: Result<u64, StoreError> = self
            .invoke("addNote", json!({"note": self.note_params(card)}))
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(StoreError::Server(msg)) if msg == DUPLICATE_NOTE => {
                Err(StoreError::DuplicateCard(card.front.clone()))
            }
            Err(e) => Err(e),
        }
    }

    async fn add_all(&self, cards: &[Card]) -> Result<(), StoreError> {
        let notes: Vec<Value> = cards.iter().map(|c| self.note_params(c)).collect();
        let results: Vec<Option<u64>> =
            self.invoke("addNotes", json!({"notes": notes})).await?;

        // duplicates come back null and are skipped; existing backs stay
        let rejected: Vec<&str> = results
            .iter()
            .zip(cards)
            .filter(|(id, _)| id.is_none())
            .map(|(_, card)| card.front.as_str())
            .collect();

        if rejected.is_empty() {
            Ok(())
        } else {
            Err(StoreError::DuplicateCard(rejected.join(", ")))
        }
    }

    async fn update(&self, card: &Card) -> Result<(), StoreError> {
        let id = self.find_id(&card.front).await?;
        let result: Result<Value, StoreError> = self
            .invoke(
                "updateNoteFields",
                json!({"note": {"id": id, "fields": {"Back": card.back}}}),
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            // updateNoteFields returns null on success
            Err(StoreError::Server(msg)) if msg.starts_with("null result") => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn find(&self, front: &str) -> Result<Option<Card>, StoreError> {
        let ids = self.find_ids(front).await?;
        if ids.is_empty() {
            return Ok(None);
        }
        let cards = self.notes_info(&ids[..1]).await?;
        Ok(cards.into_iter().next())
    }

    async fn delete(&self, front: &str) -> Result<bool, StoreError> {
        let ids = self.find_ids(front).await?;
        if ids.is_empty() {
            return Ok(false);
        }
        let result: Result<Value, StoreError> =
            self.invoke("deleteNotes", json!({"notes": ids})).await;
        match result {
            Ok(_) => Ok(true),
            Err(StoreError::Server(msg)) if msg.starts_with("null result") => Ok(true),
            Err(e) => Err(e),
        }
    }

    async fn list(&self) -> Result<Vec<Card>, StoreError> {
        let ids: Vec<u64> = self
            .invoke("findNotes", json!({"query": format!("deck:\"{}\"", self.deck)}))
            .await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.notes_info(&ids).await
    }

    async fn list_fronts(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.list().await?.into_iter().map(|c| c.front).collect())
    }

    async fn sync(&self) -> Result<(), StoreError> {
        let result: Result<Value, StoreError> = self.invoke("sync", json!({})).await;
        match result {
            Ok(_) => {}
            Err(StoreError::Server(msg)) if msg.starts_with("null result") => {}
            Err(e) => return Err(e),
        }
        tracing::info!("Anki synced");
        Ok(())
    }
}
