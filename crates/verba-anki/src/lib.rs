use async_trait::async_trait;

pub use verba_core::Card;

mod client;

pub use client::AnkiStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Multiple cards with the same front (\"{0}\") are not allowed!")]
    DuplicateCard(String),

    #[error("\"{0}\" not found!")]
    CardNotFound(String),

    #[error("Flashcard server errored: {0}")]
    Server(String),

    #[error("Flashcard server unreachable: {0}")]
    Network(#[from] reqwest::Error),
}

/// Flashcard-store boundary, keyed by deck. Front-text uniqueness is the
/// store's concern; `find` and `delete` fail quietly on absence and the
/// higher layer decides whether that is an error.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Deck this store is bound to.
    fn deck(&self) -> &str;

    async fn add(&self, card: &Card) -> Result<(), StoreError>;

    async fn add_all(&self, cards: &[Card]) -> Result<(), StoreError>;

    async fn update(&self, card: &Card) -> Result<(), StoreError>;

    async fn find(&self, front: &str) -> Result<Option<Card>, StoreError>;

    /// Returns whether a card was actually deleted.
    async fn delete(&self, front: &str) -> Result<bool, StoreError>;

    async fn list(&self) -> Result<Vec<Card>, StoreError>;

    async fn list_fronts(&self) -> Result<Vec<String>, StoreError>;

    /// Push local changes to the remote account, if any.
    async fn sync(&self) -> Result<(), StoreError>;
}
