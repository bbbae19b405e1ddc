use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use verba_anki::{AnkiStore, CardStore, StoreError};
use verba_config::Config;
use verba_core::{ExampleLimits, Language, ServiceRequest, WordInfo};
use verba_services::ServiceRegistry;

/// Per-user knobs, printable and mergeable as JSON via `ps`/`cs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub reading_mode: bool,
    pub deck_name: String,
    pub example_limit: usize,
    pub example_char_limit: usize,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            reading_mode: false,
            deck_name: "Verba Words".to_string(),
            example_limit: 5,
            example_char_limit: 150,
        }
    }
}

impl UserSettings {
    fn from_config(config: &Config) -> Self {
        Self {
            reading_mode: false,
            deck_name: config.anki.deck.clone(),
            example_limit: config.lookup.example_limit,
            example_char_limit: config.lookup.example_char_limit,
        }
    }
}

/// Everything the app remembers about one chat user: settings, the lookup
/// plans built once from the provider registry, and the lazily-opened deck
/// store.
pub struct UserSession {
    pub user_id: String,
    pub is_admin: bool,
    pub settings: UserSettings,
    basic_plan: Vec<ServiceRequest>,
    extended_plan: Vec<ServiceRequest>,
    store: Option<Arc<dyn CardStore>>,
}

impl UserSession {
    fn new(user_id: &str, config: &Config, registry: &ServiceRegistry) -> Self {
        let src: Language = config.lookup.src_lang.parse().unwrap_or(Language::En);
        let example_dst: Language = config.lookup.example_lang.parse().unwrap_or(Language::Fr);
        let translation_dst: Language = config
            .lookup
            .translation_lang
            .parse()
            .unwrap_or(Language::Zh);

        let free_dictionary = registry.free_dictionary();
        let linguee_examples = registry.linguee(src, example_dst);
        let linguee_translations = registry.linguee(src, translation_dst);

        let basic_plan: Vec<ServiceRequest> = vec![
            (free_dictionary.clone(), WordInfo::MEANING),
            (linguee_examples.clone(), WordInfo::EXAMPLES),
            (linguee_translations.clone(), WordInfo::TRANSLATION_FULL),
        ];

        let wordnik = registry.wordnik();
        let extended_plan: Vec<ServiceRequest> = vec![
            (free_dictionary, WordInfo::MEANING),
            (wordnik.clone(), WordInfo::DEFINITION | WordInfo::POS),
            (linguee_examples, WordInfo::EXAMPLES),
            (wordnik, WordInfo::EXAMPLES),
            (linguee_translations, WordInfo::TRANSLATION_FULL),
        ];

        Self {
            user_id: user_id.to_string(),
            is_admin: user_id == config.app.admin_user,
            settings: UserSettings::from_config(config),
            basic_plan,
            extended_plan,
            store: None,
        }
    }

    pub fn plan(&self, extended: bool) -> Vec<ServiceRequest> {
        if extended {
            self.extended_plan.clone()
        } else {
            self.basic_plan.clone()
        }
    }

    pub fn limits(&self, dedup_top_up: bool) -> ExampleLimits {
        ExampleLimits {
            count: self.settings.example_limit,
            char_limit: self.settings.example_char_limit,
            dedup_top_up,
        }
    }

    /// Deck store, opened on first use and re-opened after a deck change.
    pub async fn store(&mut self, config: &Config) -> Result<Arc<dyn CardStore>, StoreError> {
        let stale = self
            .store
            .as_ref()
            .is_none_or(|s| s.deck() != self.settings.deck_name);
        if stale {
            let store = AnkiStore::open(
                &config.anki.url,
                &self.settings.deck_name,
                &config.anki.model,
            )
            .await?;
            self.store = Some(Arc::new(store));
        }
        Ok(self.store.clone().unwrap())
    }

    pub fn opened_store(&self) -> Option<Arc<dyn CardStore>> {
        self.store.clone()
    }

    #[cfg(test)]
    pub fn install_store(&mut self, store: Arc<dyn CardStore>) {
        self.settings.deck_name = store.deck().to_string();
        self.store = Some(store);
    }

    pub fn change_deck(&mut self, deck: &str) {
        self.settings.deck_name = deck.to_string();
        self.store = None;
    }

    /// Merge a JSON fragment into the settings; every key must already
    /// exist. Returns false on invalid JSON, an empty fragment, or unknown
    /// keys.
    pub fn apply_settings(&mut self, fragment: &str) -> bool {
        let Ok(Value::Object(new)) = serde_json::from_str(&format!("{{{fragment}}}")) else {
            return false;
        };
        if new.is_empty() {
            return false;
        }
        let Ok(Value::Object(mut current)) = serde_json::to_value(&self.settings) else {
            return false;
        };
        if !new.keys().all(|k| current.contains_key(k)) {
            return false;
        }
        for (key, value) in new {
            current.insert(key, value);
        }
        match serde_json::from_value(Value::Object(current)) {
            Ok(settings) => {
                self.settings = settings;
                true
            }
            Err(_) => false,
        }
    }
}

/// Process-wide session table, one entry per chat user, created on first
/// contact.
#[derive(Default)]
pub struct Sessions {
    inner: RwLock<HashMap<String, Arc<Mutex<UserSession>>>>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_create(
        &self,
        user_id: &str,
        config: &Config,
        registry: &ServiceRegistry,
    ) -> Arc<Mutex<UserSession>> {
        if let Some(session) = self.inner.read().await.get(user_id) {
            return session.clone();
        }

        let mut sessions = self.inner.write().await;
        sessions
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(UserSession::new(user_id, config, registry))))
            .clone()
    }
}
