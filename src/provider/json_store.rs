use std::path::PathBuf;

use anyhow::{bail, Result};
use async_trait::async_trait;
use uuid::Uuid;

use super::{
    entities::{TodoChange, TodoEntity, UserEntity},
    jsonl,
    store::{RecordStore, TodoQuery},
};

/// File-backed realization of [RecordStore]. Each collection lives in one
/// JSON-lines file under the store directory.
pub struct JsonRecordStore {
    store_dir: PathBuf,
}

impl JsonRecordStore {
    pub fn new(store_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&store_dir)?;

        Ok(Self { store_dir })
    }

    fn users_path(&self) -> PathBuf {
        self.store_dir.join("users.json")
    }

    fn todos_path(&self) -> PathBuf {
        self.store_dir.join("todos.json")
    }
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<UserEntity>> {
        let users: Vec<UserEntity> = jsonl::read_all(&self.users_path()).await?;
        Ok(users.into_iter().find(|u| u.id == id))
    }

    async fn insert_user(&self, user: UserEntity) -> Result<()> {
        jsonl::rewrite(&self.users_path(), |mut users: Vec<UserEntity>| {
            if users.iter().any(|u| u.id == user.id) {
                bail!("users record {} already exists", user.id);
            }
            users.push(user);
            Ok(users)
        })
        .await
    }

    async fn set_user_goal(&self, id: Uuid, goal_day: Option<String>) -> Result<()> {
        jsonl::rewrite(&self.users_path(), |mut users: Vec<UserEntity>| {
            let Some(user) = users.iter_mut().find(|u| u.id == id) else {
                bail!("users record {id} not found");
            };
            user.goal_day = goal_day;
            Ok(users)
        })
        .await
    }

    async fn select_todos(&self, query: TodoQuery) -> Result<Vec<TodoEntity>> {
        let todos: Vec<TodoEntity> = jsonl::read_all(&self.todos_path()).await?;
        let mut matching = todos
            .into_iter()
            .filter(|t| query.matches(t))
            .collect::<Vec<_>>();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn insert_todo(&self, todo: TodoEntity) -> Result<()> {
        jsonl::rewrite(&self.todos_path(), |mut todos: Vec<TodoEntity>| {
            todos.push(todo);
            Ok(todos)
        })
        .await
    }

    async fn update_todo(&self, user_id: Uuid, id: Uuid, change: TodoChange) -> Result<()> {
        jsonl::rewrite(&self.todos_path(), |mut todos: Vec<TodoEntity>| {
            let Some(todo) = todos
                .iter_mut()
                .find(|t| t.id == id && t.user_id == user_id)
            else {
                bail!("todos record {id} not found");
            };
            change.apply(todo);
            Ok(todos)
        })
        .await
    }

    async fn delete_todo(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        jsonl::rewrite(&self.todos_path(), |mut todos: Vec<TodoEntity>| {
            let before = todos.len();
            todos.retain(|t| !(t.id == id && t.user_id == user_id));
            if todos.len() == before {
                bail!("todos record {id} not found");
            }
            Ok(todos)
        })
        .await
    }
}
