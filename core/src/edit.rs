//! Per-row edit mode. Not persisted; a UI keeps one `EditState` per row.

use uuid::Uuid;

use crate::error::ApiError;
use crate::types::{Patch, Todo, UpdateTodo};

/// Text being edited for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub description: String,
}

impl Draft {
    /// Validate the draft and turn it into an update for `id`.
    ///
    /// A blank description clears the stored one.
    pub fn to_update(&self, id: Uuid) -> Result<UpdateTodo, ApiError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ApiError::InvalidInput("Title is required".to_string()));
        }
        let description = match self.description.trim() {
            "" => Patch::Clear,
            text => Patch::Set(text.to_string()),
        };
        Ok(UpdateTodo::new(id).title(title).description(description))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    NotEditing,
    Editing(Draft),
}

impl EditState {
    /// Enter edit mode with the record's current values.
    pub fn begin(todo: &Todo) -> Self {
        EditState::Editing(Draft {
            title: todo.title.clone(),
            description: todo.description.clone().unwrap_or_default(),
        })
    }

    /// Discard the draft.
    pub fn cancel(&mut self) {
        *self = EditState::NotEditing;
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditState::Editing(_))
    }

    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        match self {
            EditState::Editing(draft) => Some(draft),
            EditState::NotEditing => None,
        }
    }
}
