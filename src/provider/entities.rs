use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Mirror of the auth provider's account, persisted as a `users` record.
/// Created lazily on first sign-in; `goal_day` holds today's stated goal,
/// independent of any task.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub goal_day: Option<String>,
}

/// A user-owned unit of tracked work. `started_at`/`ended_at` mark an open or
/// closed work interval; `break_started_at`/`break_ended_at` mark a break
/// interval nested within it.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct TodoEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub report: Option<String>,
    #[serde(default)]
    pub goal_week: Option<String>,
    #[serde(default)]
    pub goal_day: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub break_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub break_ended_at: Option<DateTime<Utc>>,
}

impl TodoEntity {
    pub fn new(user_id: Uuid, title: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            report: None,
            goal_week: None,
            goal_day: None,
            created_at,
            started_at: None,
            ended_at: None,
            break_started_at: None,
            break_ended_at: None,
        }
    }

    /// A task is running while a work interval is open.
    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.ended_at.is_none()
    }

    /// A break can only be open while the task itself is running.
    pub fn is_on_break(&self) -> bool {
        self.is_running() && self.break_started_at.is_some() && self.break_ended_at.is_none()
    }

    /// Raw duration of a closed work interval, breaks not subtracted.
    pub fn work_duration(&self) -> Option<Duration> {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Duration of a closed break interval, clamped to zero. Open or absent
    /// breaks contribute nothing.
    pub fn break_duration(&self) -> Duration {
        match (self.break_started_at, self.break_ended_at) {
            (Some(start), Some(end)) if end > start => end - start,
            _ => Duration::zero(),
        }
    }
}

/// A single point update to one todo record. Every lifecycle action of the
/// application maps to exactly one of these.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum TodoChange {
    /// Opens a work interval. Always clears a previous `ended_at`.
    Start { at: DateTime<Utc> },
    /// Closes the work interval. Leaves `started_at` untouched.
    Stop { at: DateTime<Utc> },
    /// Opens a break interval, clearing a previous `break_ended_at`.
    BreakStart { at: DateTime<Utc> },
    /// Closes the break interval.
    BreakEnd { at: DateTime<Utc> },
    /// Replaces the editable fields in place.
    Edit {
        title: String,
        report: Option<String>,
        goal_week: Option<String>,
        goal_day: Option<String>,
    },
}

impl TodoChange {
    pub fn apply(self, todo: &mut TodoEntity) {
        match self {
            TodoChange::Start { at } => {
                todo.started_at = Some(at);
                todo.ended_at = None;
            }
            TodoChange::Stop { at } => {
                todo.ended_at = Some(at);
            }
            TodoChange::BreakStart { at } => {
                todo.break_started_at = Some(at);
                todo.break_ended_at = None;
            }
            TodoChange::BreakEnd { at } => {
                todo.break_ended_at = Some(at);
            }
            TodoChange::Edit {
                title,
                report,
                goal_week,
                goal_day,
            } => {
                todo.title = title;
                todo.report = report;
                todo.goal_week = goal_week;
                todo.goal_day = goal_day;
            }
        }
    }
}
