//! The hosted record store the gateway forwards to.
//!
//! `RecordStore` is the narrow set of table operations the gateway needs.
//! `MemoryStore` backs local runs and tests; `RestStore` talks to a
//! PostgREST-compatible hosted database.

mod memory;
mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::types::{NewTodo, Todo, TodoChanges};

/// Failures reported by a `RecordStore` backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Unreachable(String),

    #[error("store rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("store returned an unreadable response: {0}")]
    Decode(String),

    #[error("invalid store configuration: {0}")]
    Misconfigured(String),
}

/// Table-scoped operations over the todo table.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every row, newest `created_at` first.
    async fn select_all_ordered(&self) -> Result<Vec<Todo>, StoreError>;

    /// Insert one row and return it as stored.
    async fn insert(&self, row: NewTodo) -> Result<Todo, StoreError>;

    /// Update the row with `id`. `Ok(None)` when no row matched.
    async fn update_by_id(&self, id: Uuid, changes: TodoChanges) -> Result<Option<Todo>, StoreError>;

    /// Delete the row with `id`. Zero matched rows is not an error.
    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError>;
}
