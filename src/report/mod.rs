//! Derived, recomputed-on-demand aggregations of task time intervals.
//!
//! The daily view subtracts break time from each task's closed work interval;
//! the weekly view deliberately does NOT and sums raw start-to-end durations.
//! That asymmetry is inherited behavior and pinned by tests, do not "fix" it.

use chrono::{DateTime, Duration, Local, Utc};
use now::DateTimeNow;

use crate::provider::entities::TodoEntity;

/// Slices with a positive net value below this floor are raised to it so
/// they stay visible on the chart.
pub const MIN_VISIBLE_MINUTES: f64 = 0.1;

/// One `(title, minutes)` entry of the daily chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub minutes: f64,
}

/// Net working minutes of a closed interval: raw duration minus the clamped
/// break duration. `None` while the interval is still open or never started.
pub fn net_minutes(todo: &TodoEntity) -> Option<f64> {
    let worked = todo.work_duration()? - todo.break_duration();
    Some(worked.num_seconds() as f64 / 60.0)
}

/// Reduces tasks to daily chart slices. Zero and negative net values are
/// excluded; positive values under [MIN_VISIBLE_MINUTES] are floored to it.
pub fn daily_slices(todos: &[TodoEntity]) -> Vec<Slice> {
    todos
        .iter()
        .filter_map(|todo| {
            let minutes = net_minutes(todo)?;
            (minutes > 0.0).then(|| Slice {
                label: todo.title.clone(),
                minutes: minutes.max(MIN_VISIBLE_MINUTES),
            })
        })
        .collect()
}

/// Sums raw `ended_at - started_at` durations into total hours, rounded to
/// two decimals. Break time is not subtracted here. Callers pre-filter the
/// input to tasks started within the week.
pub fn weekly_hours(todos: &[TodoEntity]) -> f64 {
    let total = todos
        .iter()
        .filter_map(TodoEntity::work_duration)
        .fold(Duration::zero(), |sum, worked| sum + worked);
    let hours = total.num_milliseconds() as f64 / 1000.0 / 60.0 / 60.0;
    (hours * 100.0).round() / 100.0
}

/// Local midnight of the anchor's day, in store time.
pub fn start_of_day(anchor: DateTime<Local>) -> DateTime<Utc> {
    anchor.beginning_of_day().with_timezone(&Utc)
}

/// The most recent Monday 00:00 local time on or before the anchor, in store
/// time.
pub fn start_of_week(anchor: DateTime<Local>) -> DateTime<Utc> {
    anchor.beginning_of_week().with_timezone(&Utc)
}
