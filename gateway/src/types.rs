//! Wire and store DTOs for the todo gateway.
//!
//! Request bodies are deserialized into `Option`-typed structs so that a
//! missing `title` or `id` reaches the gateway as data and can be reported as
//! a 400 with a message, instead of being rejected by the extractor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// A persisted todo record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A field in a partial update.
///
/// In JSON an absent key is `Keep`, an explicit `null` is `Clear` and any
/// other value is `Set`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Patch<T> {
    Keep,
    Clear,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Keep => Patch::Keep,
            Patch::Clear => Patch::Clear,
            Patch::Set(value) => Patch::Set(f(value)),
        }
    }

    /// Downgrade `Set(value)` to `Clear` when `keep` rejects the value.
    pub fn set_if(self, keep: impl FnOnce(&T) -> bool) -> Patch<T> {
        match self {
            Patch::Set(value) if !keep(&value) => Patch::Clear,
            other => other,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Set(value),
            None => Patch::Clear,
        })
    }
}

/// `Keep` must be skipped by the containing struct; it serializes as `null`.
impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Set(value) => serializer.serialize_some(value),
            Patch::Keep | Patch::Clear => serializer.serialize_none(),
        }
    }
}

/// Body of `POST /todos`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `PUT /todos`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Body of `DELETE /todos`.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteTodoRequest {
    #[serde(default)]
    pub id: Option<String>,
}

/// Acknowledgement returned by `DELETE /todos`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteAck {
    pub success: bool,
}

/// A validated row to insert. The store assigns `id` and both timestamps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
}

/// A validated change set for one row. `updated_at` is always written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TodoChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub description: Patch<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl TodoChanges {
    /// Apply this change set to `todo` in place.
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(title) = &self.title {
            todo.title = title.clone();
        }
        match &self.description {
            Patch::Keep => {}
            Patch::Clear => todo.description = None,
            Patch::Set(description) => todo.description = Some(description.clone()),
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        todo.updated_at = self.updated_at.max(todo.updated_at).max(todo.created_at);
    }
}

/// Trim a description; blank input is stored as absent.
pub fn normalize_description(raw: Option<String>) -> Option<String> {
    raw.map(|d| d.trim().to_string()).filter(|d| !d.is_empty())
}
