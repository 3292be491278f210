use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RecordStore, StoreError};
use crate::types::{NewTodo, Todo, TodoChanges};

struct Row {
    seq: u64,
    todo: Todo,
}

#[derive(Default)]
struct Table {
    rows: HashMap<Uuid, Row>,
    next_seq: u64,
}

/// In-process todo table.
///
/// Rows carry an insertion sequence so that records created within the same
/// clock tick still list newest-first.
#[derive(Clone, Default)]
pub struct MemoryStore {
    table: Arc<RwLock<Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select_all_ordered(&self) -> Result<Vec<Todo>, StoreError> {
        let table = self.table.read().await;
        let mut rows: Vec<&Row> = table.rows.values().collect();
        rows.sort_by(|a, b| {
            b.todo
                .created_at
                .cmp(&a.todo.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(rows.into_iter().map(|row| row.todo.clone()).collect())
    }

    async fn insert(&self, row: NewTodo) -> Result<Todo, StoreError> {
        let now = Utc::now();
        let todo = Todo {
            id: Uuid::new_v4(),
            title: row.title,
            description: row.description,
            completed: false,
            created_at: now,
            updated_at: now,
        };
        let mut table = self.table.write().await;
        let seq = table.next_seq;
        table.next_seq += 1;
        table.rows.insert(todo.id, Row { seq, todo: todo.clone() });
        Ok(todo)
    }

    async fn update_by_id(&self, id: Uuid, changes: TodoChanges) -> Result<Option<Todo>, StoreError> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|row| {
            changes.apply_to(&mut row.todo);
            row.todo.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        self.table.write().await.rows.remove(&id);
        Ok(())
    }
}
