use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::entities::{TodoChange, TodoEntity, UserEntity};

/// Ownership-scoped query over the `todos` collection. The owner filter is
/// always present even though the provider is assumed to enforce row-level
/// access on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoQuery {
    pub user_id: Uuid,
    /// Keep only records with `created_at` on or after this moment.
    pub created_since: Option<DateTime<Utc>>,
    /// Keep only records with `started_at` on or after this moment.
    pub started_since: Option<DateTime<Utc>>,
}

impl TodoQuery {
    pub fn owned_by(user_id: Uuid) -> Self {
        Self {
            user_id,
            created_since: None,
            started_since: None,
        }
    }

    pub fn created_since(mut self, moment: DateTime<Utc>) -> Self {
        self.created_since = Some(moment);
        self
    }

    pub fn started_since(mut self, moment: DateTime<Utc>) -> Self {
        self.started_since = Some(moment);
        self
    }

    pub fn matches(&self, todo: &TodoEntity) -> bool {
        todo.user_id == self.user_id
            && self
                .created_since
                .map_or(true, |since| todo.created_at >= since)
            && self
                .started_since
                .map_or(true, |since| todo.started_at.is_some_and(|at| at >= since))
    }
}

/// Interface for abstracting the record store with its two collections.
/// Selects return todos newest-created-first; every mutation is a single
/// point update and callers refresh state by selecting again.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Result<Option<UserEntity>>;

    async fn insert_user(&self, user: UserEntity) -> Result<()>;

    async fn set_user_goal(&self, id: Uuid, goal_day: Option<String>) -> Result<()>;

    async fn select_todos(&self, query: TodoQuery) -> Result<Vec<TodoEntity>>;

    async fn insert_todo(&self, todo: TodoEntity) -> Result<()>;

    async fn update_todo(&self, user_id: Uuid, id: Uuid, change: TodoChange) -> Result<()>;

    async fn delete_todo(&self, user_id: Uuid, id: Uuid) -> Result<()>;
}
