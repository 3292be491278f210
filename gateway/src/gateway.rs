//! The four gateway operations, independent of HTTP.
//!
//! Each operation validates and normalizes its input, issues exactly one
//! store call and classifies the outcome. Nothing is retried.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::{GatewayError, ID_REQUIRED, TITLE_REQUIRED};
use crate::store::{RecordStore, StoreError};
use crate::types::{
    normalize_description, CreateTodoRequest, DeleteTodoRequest, NewTodo, Todo, TodoChanges,
    UpdateTodoRequest,
};

#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn RecordStore>,
}

impl Gateway {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Todo>, GatewayError> {
        self.store
            .select_all_ordered()
            .await
            .map_err(|e| store_failure("Failed to fetch todos", e))
    }

    pub async fn create(&self, input: CreateTodoRequest) -> Result<Todo, GatewayError> {
        let title = required_title(input.title)?;
        let row = NewTodo {
            title,
            description: normalize_description(input.description),
        };
        let todo = self
            .store
            .insert(row)
            .await
            .map_err(|e| store_failure("Failed to create todo", e))?;
        debug!(id = %todo.id, "created todo");
        Ok(todo)
    }

    /// A supplied title must be non-blank here as well as on create, so the
    /// persisted title is never empty.
    pub async fn update(&self, input: UpdateTodoRequest) -> Result<Todo, GatewayError> {
        let id = required_id(input.id)?;
        let title = input.title.map(|t| required_title(Some(t))).transpose()?;
        let changes = TodoChanges {
            title,
            description: input
                .description
                .map(|d| d.trim().to_string())
                .set_if(|d| !d.is_empty()),
            completed: input.completed,
            updated_at: Utc::now(),
        };
        let todo = self
            .store
            .update_by_id(id, changes)
            .await
            .map_err(|e| store_failure("Failed to update todo", e))?
            .ok_or(GatewayError::NotFound)?;
        debug!(id = %todo.id, "updated todo");
        Ok(todo)
    }

    pub async fn delete(&self, input: DeleteTodoRequest) -> Result<(), GatewayError> {
        let id = required_id(input.id)?;
        self.store
            .delete_by_id(id)
            .await
            .map_err(|e| store_failure("Failed to delete todo", e))?;
        debug!(%id, "deleted todo");
        Ok(())
    }
}

fn store_failure(message: &'static str, source: StoreError) -> GatewayError {
    error!(error = %source, "{message}");
    GatewayError::StoreUnavailable { message, source }
}

fn required_title(raw: Option<String>) -> Result<String, GatewayError> {
    raw.map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| GatewayError::invalid(TITLE_REQUIRED))
}

fn required_id(raw: Option<String>) -> Result<Uuid, GatewayError> {
    let raw = raw
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| GatewayError::invalid(ID_REQUIRED))?;
    Uuid::parse_str(&raw).map_err(|_| GatewayError::invalid(format!("Invalid todo ID: {raw}")))
}
