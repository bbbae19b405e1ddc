use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use verba_config::services::ServicesConfig;
use verba_core::{Language, WordService};

use crate::free_dictionary::FreeDictionary;
use crate::google_translate::GoogleTranslate;
use crate::linguee::Linguee;
use crate::wordnik::Wordnik;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    FreeDictionary,
    Wordnik,
    Linguee,
    GoogleTranslate,
}

/// Value-equal identity of one provider singleton. Pair-keyed providers
/// carry their language pair; monolingual ones leave it `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceKey {
    pub kind: ServiceKind,
    pub pair: Option<(Language, Language)>,
}

/// Process-wide provider registry: one shared immutable instance per key,
/// constructed lazily. Every instance shares one HTTP client.
pub struct ServiceRegistry {
    config: ServicesConfig,
    client: reqwest::Client,
    services: Mutex<HashMap<ServiceKey, Arc<dyn WordService>>>,
}

impl ServiceRegistry {
    pub fn new(config: ServicesConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            services: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: ServiceKey) -> Arc<dyn WordService> {
        let mut services = self.services.lock().unwrap();
        services
            .entry(key)
            .or_insert_with(|| self.construct(key))
            .clone()
    }

    pub fn free_dictionary(&self) -> Arc<dyn WordService> {
        self.get(ServiceKey {
            kind: ServiceKind::FreeDictionary,
            pair: None,
        })
    }

    pub fn wordnik(&self) -> Arc<dyn WordService> {
        self.get(ServiceKey {
            kind: ServiceKind::Wordnik,
            pair: None,
        })
    }

    pub fn linguee(&self, src: Language, dst: Language) -> Arc<dyn WordService> {
        self.get(ServiceKey {
            kind: ServiceKind::Linguee,
            pair: Some((src, dst)),
        })
    }

    pub fn google_translate(&self, src: Language, dst: Language) -> Arc<dyn WordService> {
        self.get(ServiceKey {
            kind: ServiceKind::GoogleTranslate,
            pair: Some((src, dst)),
        })
    }

    fn construct(&self, key: ServiceKey) -> Arc<dyn WordService> {
        let (src, dst) = key.pair.unwrap_or((Language::En, Language::En));
        match key.kind {
            ServiceKind::FreeDictionary => Arc::new(FreeDictionary::new(
                self.client.clone(),
                self.config.free_dictionary_url.clone(),
            )),
            ServiceKind::Wordnik => Arc::new(Wordnik::new(
                self.client.clone(),
                self.config.wordnik_url.clone(),
                self.config.wordnik_api_key.clone(),
            )),
            ServiceKind::Linguee => Arc::new(Linguee::new(
                self.client.clone(),
                self.config.linguee_url.clone(),
                src,
                dst,
            )),
            ServiceKind::GoogleTranslate => Arc::new(GoogleTranslate::new(
                self.client.clone(),
                self.config.google_translate_url.clone(),
                self.config.google_api_key.clone(),
                src,
                dst,
            )),
        }
    }
}
