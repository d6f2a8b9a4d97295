//! Resume and user-details persistence.
//!
//! `AppState` holds an `Arc<dyn ResumeStore>`: Postgres when `DATABASE_URL` is set,
//! the in-memory store otherwise (and in tests).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Resume, UserDetails};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("resume {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("stored tailoring response is malformed: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Inserts `resume` and returns its id.
    async fn save(&self, resume: Resume) -> Result<Uuid, StoreError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Resume>, StoreError>;

    /// All resumes in creation order.
    async fn get_all(&self) -> Result<Vec<Resume>, StoreError>;

    /// Deleting an absent id is not an error.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    async fn update_title(&self, id: Uuid, title: &str) -> Result<(), StoreError>;

    /// Replaces the single user-details record.
    async fn save_user_details(&self, details: UserDetails) -> Result<(), StoreError>;

    async fn get_user_details(&self) -> Result<Option<UserDetails>, StoreError>;

    async fn has_user_details(&self) -> Result<bool, StoreError> {
        Ok(self.get_user_details().await?.is_some())
    }

    /// True when no resume has been saved yet (first run).
    async fn is_empty(&self) -> Result<bool, StoreError>;
}
