use serde::{Deserialize, Serialize};

use self::anki::AnkiConfig;
use self::app::AppConfig;
use self::lookup::LookupConfig;
use self::services::ServicesConfig;

pub mod anki;
pub mod app;
pub mod lookup;
pub mod services;

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub anki: AnkiConfig,
    pub services: ServicesConfig,
    pub lookup: LookupConfig,
}

impl Config {
    pub fn new() -> Self {
        Config {
            app: AppConfig::new(),
            anki: AnkiConfig::new(),
            services: ServicesConfig::new(),
            lookup: LookupConfig::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
