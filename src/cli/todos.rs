use std::io::{self, Write};

use anyhow::Result;
use tracing::warn;

use crate::{
    provider::{auth::Session, entities::TodoEntity, store::RecordStore},
    tasks::{
        paging::{group_by_goal, paginate, NO_GOAL_LABEL},
        TodoDraft, TodoEditForm, TodoService,
    },
    utils::time::format_clock,
};

/// The four timer transitions a list row exposes.
#[derive(Debug, Clone, Copy)]
pub enum LifecycleAction {
    Start,
    Stop,
    BreakStart,
    BreakEnd,
}

pub async fn add(
    store: impl RecordStore,
    session: Session,
    title: String,
    goal_week: Option<String>,
    goal_day: Option<String>,
) -> Result<()> {
    let service = TodoService::new(store, session);
    let todo = service
        .add(TodoDraft {
            title,
            goal_week,
            goal_day,
        })
        .await?;
    // the successful insert signals a refresh of the whole list
    let refreshed = service.list().await?;
    println!(
        "Added \"{}\" [{}], {} task(s) total.",
        todo.title,
        short_id(&todo),
        refreshed.len()
    );
    Ok(())
}

pub async fn list(
    store: impl RecordStore,
    session: Session,
    requested_page: usize,
    by_goal: bool,
) -> Result<()> {
    let service = TodoService::new(store, session);
    // a failed passive fetch degrades to an empty list instead of aborting
    let todos = match service.list().await {
        Ok(todos) => todos,
        Err(e) => {
            warn!("Fetching tasks failed: {e:?}");
            Vec::new()
        }
    };
    if todos.is_empty() {
        println!("No tasks yet. Create one with `tsumiage add`.");
        return Ok(());
    }

    let ordered: Vec<&TodoEntity> = if by_goal {
        group_by_goal(&todos)
            .into_iter()
            .flat_map(|(_, members)| members)
            .collect()
    } else {
        todos.iter().collect()
    };

    let page = paginate(&ordered, requested_page);
    let mut previous_goal: Option<&str> = None;
    for &todo in page.items {
        if by_goal {
            let label = todo.goal_day.as_deref().unwrap_or(NO_GOAL_LABEL);
            if previous_goal != Some(label) {
                println!("== {label} ==");
                previous_goal = Some(label);
            }
        }
        println!("{}", render_row(todo));
    }
    println!(
        "Page {}/{} ({} tasks)",
        page.number,
        page.total_pages,
        page.total_items
    );
    Ok(())
}

pub async fn lifecycle(
    store: impl RecordStore,
    session: Session,
    id: &str,
    action: LifecycleAction,
) -> Result<()> {
    let service = TodoService::new(store, session);
    let todo = service.resolve(id).await?;
    match action {
        LifecycleAction::Start => service.start(&todo).await?,
        LifecycleAction::Stop => service.stop(&todo).await?,
        LifecycleAction::BreakStart => service.break_start(&todo).await?,
        LifecycleAction::BreakEnd => service.break_end(&todo).await?,
    }
    // the mutation has completed, refetch for the fresh state
    print_fresh_row(&service, &todo).await
}

pub async fn edit(
    store: impl RecordStore,
    session: Session,
    id: &str,
    form: TodoEditForm,
) -> Result<()> {
    let service = TodoService::new(store, session);
    let todo = service.resolve(id).await?;
    service.edit(&todo, form).await?;
    print_fresh_row(&service, &todo).await
}

pub async fn delete<S, F>(store: S, session: Session, id: &str, confirm: F) -> Result<()>
where
    S: RecordStore,
    F: FnOnce(&TodoEntity) -> Result<bool>,
{
    let service = TodoService::new(store, session);
    let todo = service.resolve(id).await?;
    if !confirm(&todo)? {
        println!("Aborted, \"{}\" was kept.", todo.title);
        return Ok(());
    }
    service.delete(&todo).await?;
    let remaining = service.list().await?;
    println!(
        "Deleted \"{}\", {} task(s) left.",
        todo.title,
        remaining.len()
    );
    Ok(())
}

pub fn interactive_confirm(todo: &TodoEntity) -> Result<bool> {
    print!("Really delete \"{}\"? [y/N] ", todo.title);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

async fn print_fresh_row<S: RecordStore>(
    service: &TodoService<S>,
    todo: &TodoEntity,
) -> Result<()> {
    let refreshed = service.list().await?;
    if let Some(current) = refreshed.iter().find(|t| t.id == todo.id) {
        println!("{}", render_row(current));
    }
    Ok(())
}

pub fn short_id(todo: &TodoEntity) -> String {
    todo.id.simple().to_string()[..8].to_string()
}

pub fn render_row(todo: &TodoEntity) -> String {
    let marker = if todo.is_on_break() {
        "⏸"
    } else if todo.is_running() {
        "▶"
    } else if todo.ended_at.is_some() {
        "⏹"
    } else {
        "·"
    };

    let mut lines = vec![format!("[{}] {} {}", short_id(todo), marker, todo.title)];

    let mut goals = vec![];
    if let Some(goal) = &todo.goal_week {
        goals.push(format!("week: {goal}"));
    }
    if let Some(goal) = &todo.goal_day {
        goals.push(format!("today: {goal}"));
    }
    if !goals.is_empty() {
        lines.push(format!("    {}", goals.join(" | ")));
    }

    let mut times = vec![];
    if let Some(at) = todo.started_at {
        times.push(format!("started {}", format_clock(at)));
    }
    if let Some(at) = todo.ended_at {
        times.push(format!("ended {}", format_clock(at)));
    }
    if let Some(at) = todo.break_started_at {
        times.push(format!("break from {}", format_clock(at)));
    }
    if let Some(at) = todo.break_ended_at {
        times.push(format!("break until {}", format_clock(at)));
    }
    if !times.is_empty() {
        lines.push(format!("    {}", times.join(" / ")));
    }

    if let Some(note) = &todo.report {
        lines.push(format!("    note: {note}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use mockall::Sequence;
    use uuid::Uuid;

    use crate::provider::{entities::TodoChange, store::MockRecordStore};

    use super::*;

    fn session() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: "a@example.com".into(),
        }
    }

    fn sample_todo(owner: &Session) -> TodoEntity {
        TodoEntity::new(
            owner.user_id,
            "Read book".into(),
            Utc.with_ymd_and_hms(2024, 3, 13, 9, 0, 0).unwrap(),
        )
    }

    #[test]
    fn only_yes_answers_confirm() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" YES \n"));
        assert!(!is_affirmative("\n"));
        assert!(!is_affirmative("n\n"));
        assert!(!is_affirmative("yep\n"));
    }

    #[tokio::test]
    async fn declined_delete_sends_no_request() {
        let owner = session();
        let todo = sample_todo(&owner);
        let todos = vec![todo.clone()];
        let mut store = MockRecordStore::new();
        // only the resolve fetch; a delete call would panic the mock
        store
            .expect_select_todos()
            .once()
            .returning(move |_| Ok(todos.clone()));

        delete(store, owner, &short_id(&todo), |_| Ok(false))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn confirmed_delete_removes_and_refetches() {
        let owner = session();
        let todo = sample_todo(&owner);
        let todo_id = todo.id;
        let todos = vec![todo.clone()];
        let mut seq = Sequence::new();
        let mut store = MockRecordStore::new();
        store
            .expect_select_todos()
            .once()
            .in_sequence(&mut seq)
            .returning(move |_| Ok(todos.clone()));
        store
            .expect_delete_todo()
            .once()
            .in_sequence(&mut seq)
            .withf(move |_, id| *id == todo_id)
            .returning(|_, _| Ok(()));
        store
            .expect_select_todos()
            .once()
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![]));

        delete(store, owner, &short_id(&todo), |_| Ok(true))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn lifecycle_mutation_strictly_precedes_the_refetch() {
        let owner = session();
        let todo = sample_todo(&owner);
        let todo_id = todo.id;
        let todos = vec![todo.clone()];
        let mut started = todo.clone();
        started.started_at = Some(Utc.with_ymd_and_hms(2024, 3, 13, 9, 5, 0).unwrap());

        let mut seq = Sequence::new();
        let mut store = MockRecordStore::new();
        store
            .expect_select_todos()
            .once()
            .in_sequence(&mut seq)
            .returning(move |_| Ok(todos.clone()));
        store
            .expect_update_todo()
            .once()
            .in_sequence(&mut seq)
            .withf(move |_, id, change| {
                *id == todo_id && matches!(change, TodoChange::Start { .. })
            })
            .returning(|_, _, _| Ok(()));
        store
            .expect_select_todos()
            .once()
            .in_sequence(&mut seq)
            .returning(move |_| Ok(vec![started.clone()]));

        lifecycle(store, owner, &short_id(&todo), LifecycleAction::Start)
            .await
            .unwrap();
    }

    #[test]
    fn row_rendering_reflects_the_task_state() {
        let owner = session();
        let mut todo = sample_todo(&owner);
        todo.goal_day = Some("chapter 3".into());
        assert!(render_row(&todo).contains("· Read book"));

        todo.started_at = Some(Utc.with_ymd_and_hms(2024, 3, 13, 9, 5, 0).unwrap());
        assert!(render_row(&todo).contains("▶ Read book"));
        assert!(render_row(&todo).contains("today: chapter 3"));

        todo.break_started_at = Some(Utc.with_ymd_and_hms(2024, 3, 13, 9, 15, 0).unwrap());
        assert!(render_row(&todo).contains("⏸ Read book"));

        todo.break_ended_at = Some(Utc.with_ymd_and_hms(2024, 3, 13, 9, 20, 0).unwrap());
        todo.ended_at = Some(Utc.with_ymd_and_hms(2024, 3, 13, 9, 45, 0).unwrap());
        assert!(render_row(&todo).contains("⏹ Read book"));
    }
}
