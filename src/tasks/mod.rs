//! Task lifecycle controller. Every operation is one point update against
//! the record store; callers refresh their view by fetching the list again
//! afterwards, there are no optimistic updates.

pub mod paging;

use anyhow::{bail, Result};
use uuid::Uuid;

use crate::{
    provider::{
        auth::Session,
        entities::{TodoChange, TodoEntity},
        store::{RecordStore, TodoQuery},
    },
    utils::clock::{Clock, DefaultClock},
};

/// Fields accepted by the add-task action.
#[derive(Debug, Clone, Default)]
pub struct TodoDraft {
    pub title: String,
    pub goal_week: Option<String>,
    pub goal_day: Option<String>,
}

/// Replacement values for the in-place edit action. `None` keeps the stored
/// value; empty strings clear it.
#[derive(Debug, Clone, Default)]
pub struct TodoEditForm {
    pub title: Option<String>,
    pub report: Option<String>,
    pub goal_week: Option<String>,
    pub goal_day: Option<String>,
}

/// Session-scoped controller over the `todos` collection. State-transition
/// guards live here; the store itself stays dumb.
pub struct TodoService<S> {
    store: S,
    session: Session,
    clock: Box<dyn Clock>,
}

impl<S: RecordStore> TodoService<S> {
    pub fn new(store: S, session: Session) -> Self {
        Self::with_clock(store, session, Box::new(DefaultClock))
    }

    pub fn with_clock(store: S, session: Session, clock: Box<dyn Clock>) -> Self {
        Self {
            store,
            session,
            clock,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// All of the user's tasks, newest-created-first.
    pub async fn list(&self) -> Result<Vec<TodoEntity>> {
        self.store
            .select_todos(TodoQuery::owned_by(self.session.user_id))
            .await
    }

    pub async fn select(&self, query: TodoQuery) -> Result<Vec<TodoEntity>> {
        self.store.select_todos(query).await
    }

    pub async fn add(&self, draft: TodoDraft) -> Result<TodoEntity> {
        let title = draft.title.trim();
        if title.is_empty() {
            bail!("Task title must not be empty");
        }
        let mut todo = TodoEntity::new(self.session.user_id, title.to_string(), self.clock.now());
        todo.goal_week = normalize(draft.goal_week);
        todo.goal_day = normalize(draft.goal_day);
        self.store.insert_todo(todo.clone()).await?;
        Ok(todo)
    }

    pub async fn start(&self, todo: &TodoEntity) -> Result<()> {
        if todo.is_running() {
            bail!("\"{}\" is already running", todo.title);
        }
        self.update(todo.id, TodoChange::Start {
            at: self.clock.now(),
        })
        .await
    }

    pub async fn stop(&self, todo: &TodoEntity) -> Result<()> {
        if !todo.is_running() {
            bail!("\"{}\" is not running", todo.title);
        }
        self.update(todo.id, TodoChange::Stop {
            at: self.clock.now(),
        })
        .await
    }

    pub async fn break_start(&self, todo: &TodoEntity) -> Result<()> {
        if !todo.is_running() {
            bail!("\"{}\" is not running", todo.title);
        }
        if todo.is_on_break() {
            bail!("\"{}\" is already on a break", todo.title);
        }
        self.update(todo.id, TodoChange::BreakStart {
            at: self.clock.now(),
        })
        .await
    }

    pub async fn break_end(&self, todo: &TodoEntity) -> Result<()> {
        if !todo.is_on_break() {
            bail!("\"{}\" is not on a break", todo.title);
        }
        self.update(todo.id, TodoChange::BreakEnd {
            at: self.clock.now(),
        })
        .await
    }

    /// Replaces the editable fields, carrying over whatever the form left
    /// unset.
    pub async fn edit(&self, todo: &TodoEntity, form: TodoEditForm) -> Result<()> {
        let title = form.title.unwrap_or_else(|| todo.title.clone());
        let title = title.trim();
        if title.is_empty() {
            bail!("Task title must not be empty");
        }
        let change = TodoChange::Edit {
            title: title.to_string(),
            report: merge(form.report, &todo.report),
            goal_week: merge(form.goal_week, &todo.goal_week),
            goal_day: merge(form.goal_day, &todo.goal_day),
        };
        self.update(todo.id, change).await
    }

    pub async fn delete(&self, todo: &TodoEntity) -> Result<()> {
        self.store
            .delete_todo(self.session.user_id, todo.id)
            .await
    }

    /// Resolves a full id or a unique id prefix against the current list.
    pub async fn resolve(&self, id_prefix: &str) -> Result<TodoEntity> {
        let needle = id_prefix.trim().to_ascii_lowercase();
        if needle.is_empty() {
            bail!("Task id must not be empty");
        }
        let todos = self.list().await?;
        let mut matching = todos
            .into_iter()
            .filter(|t| t.id.simple().to_string().starts_with(&needle))
            .collect::<Vec<_>>();
        match matching.len() {
            0 => bail!("No task matches id \"{id_prefix}\""),
            1 => Ok(matching.remove(0)),
            n => bail!("Id \"{id_prefix}\" is ambiguous, {n} tasks match"),
        }
    }

    async fn update(&self, id: Uuid, change: TodoChange) -> Result<()> {
        self.store
            .update_todo(self.session.user_id, id, change)
            .await
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Form semantics: unset keeps the stored value, an empty string clears it.
fn merge(submitted: Option<String>, stored: &Option<String>) -> Option<String> {
    match submitted {
        Some(value) => normalize(Some(value)),
        None => stored.clone(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use mockall::predicate::eq;

    use crate::provider::store::MockRecordStore;

    use super::*;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn session() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: "a@example.com".into(),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 13, 9, 30, 0).unwrap()
    }

    fn service(store: MockRecordStore) -> TodoService<MockRecordStore> {
        TodoService::with_clock(store, session(), Box::new(FixedClock(fixed_now())))
    }

    #[tokio::test]
    async fn blank_title_never_reaches_the_store() {
        // no expectations: any store call would panic the mock
        let service = service(MockRecordStore::new());
        let err = service
            .add(TodoDraft {
                title: "   ".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Task title must not be empty");
    }

    #[tokio::test]
    async fn add_trims_and_normalizes_fields() {
        let mut store = MockRecordStore::new();
        store
            .expect_insert_todo()
            .withf(|todo| {
                todo.title == "Read book"
                    && todo.goal_week.is_none()
                    && todo.goal_day.as_deref() == Some("chapter 3")
                    && todo.started_at.is_none()
                    && todo.created_at == Utc.with_ymd_and_hms(2024, 3, 13, 9, 30, 0).unwrap()
            })
            .once()
            .returning(|_| Ok(()));

        let service = service(store);
        service
            .add(TodoDraft {
                title: "  Read book ".into(),
                goal_week: Some("  ".into()),
                goal_day: Some(" chapter 3 ".into()),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn start_refuses_an_already_running_task() {
        let service = service(MockRecordStore::new());
        let mut todo = TodoEntity::new(service.session().user_id, "task".into(), fixed_now());
        todo.started_at = Some(fixed_now());
        assert!(service.start(&todo).await.is_err());
    }

    #[tokio::test]
    async fn start_issues_a_single_point_update() {
        let owner = session();
        let todo = TodoEntity::new(owner.user_id, "task".into(), fixed_now());
        let mut store = MockRecordStore::new();
        store
            .expect_update_todo()
            .with(
                eq(owner.user_id),
                eq(todo.id),
                eq(TodoChange::Start { at: fixed_now() }),
            )
            .once()
            .returning(|_, _, _| Ok(()));

        let service = TodoService::with_clock(store, owner, Box::new(FixedClock(fixed_now())));
        service.start(&todo).await.unwrap();
    }

    #[tokio::test]
    async fn stop_requires_a_running_task() {
        let service = service(MockRecordStore::new());
        let todo = TodoEntity::new(service.session().user_id, "task".into(), fixed_now());
        assert!(service.stop(&todo).await.is_err());
    }

    #[tokio::test]
    async fn break_guards_follow_the_task_state() {
        let service = service(MockRecordStore::new());
        let mut todo = TodoEntity::new(service.session().user_id, "task".into(), fixed_now());

        // not running: neither break action is allowed
        assert!(service.break_start(&todo).await.is_err());
        assert!(service.break_end(&todo).await.is_err());

        todo.started_at = Some(fixed_now());
        todo.break_started_at = Some(fixed_now());
        // break already open
        assert!(service.break_start(&todo).await.is_err());
    }

    #[tokio::test]
    async fn edit_merges_unset_fields_and_clears_emptied_ones() {
        let owner = session();
        let mut todo = TodoEntity::new(owner.user_id, "task".into(), fixed_now());
        todo.report = Some("old note".into());
        todo.goal_week = Some("old goal".into());

        let mut store = MockRecordStore::new();
        let expected = TodoChange::Edit {
            title: "task".into(),
            report: None,
            goal_week: Some("old goal".into()),
            goal_day: Some("tomorrow".into()),
        };
        store
            .expect_update_todo()
            .with(eq(owner.user_id), eq(todo.id), eq(expected))
            .once()
            .returning(|_, _, _| Ok(()));

        let service = TodoService::with_clock(store, owner, Box::new(FixedClock(fixed_now())));
        service
            .edit(&todo, TodoEditForm {
                title: None,
                report: Some("".into()),
                goal_week: None,
                goal_day: Some("tomorrow".into()),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn resolve_matches_unique_prefixes_only() {
        let owner = session();
        let a = TodoEntity::new(owner.user_id, "a".into(), fixed_now());
        let b = TodoEntity::new(owner.user_id, "b".into(), fixed_now());
        let prefix = a.id.simple().to_string()[..8].to_string();

        let todos = vec![a.clone(), b.clone()];
        let mut store = MockRecordStore::new();
        store
            .expect_select_todos()
            .returning(move |_| Ok(todos.clone()));

        let service = TodoService::with_clock(store, owner, Box::new(FixedClock(fixed_now())));
        assert_eq!(service.resolve(&prefix).await.unwrap().id, a.id);
        assert!(service.resolve("zzzz").await.is_err());
        assert!(service.resolve("  ").await.is_err());
        // the empty-ish prefix "" would match everything, hence the rejection
        assert!(service.resolve("").await.is_err());
    }
}
