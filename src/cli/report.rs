use std::fmt::Display;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use chrono_english::parse_date_string;
use clap::{Parser, ValueEnum};

use crate::{
    provider::{auth::Session, store::{RecordStore, TodoQuery}},
    report::{daily_slices, start_of_day, start_of_week, weekly_hours},
    tasks::TodoService,
};

use super::output::pie_chart;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct ReportCommand {
    #[arg(long, help = "Print only the daily breakdown")]
    today: bool,
    #[arg(
        long,
        help = "Anchor day for the report. Examples are \"yesterday\", \"2 days ago\", \"15/03/2025\""
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

pub async fn process_report_command(
    store: impl RecordStore,
    session: Session,
    command: ReportCommand,
) -> Result<()> {
    let anchor = resolve_anchor(command.date.as_deref(), command.date_style)?;
    let service = TodoService::new(store, session);
    let user_id = service.session().user_id;

    let created_today = service
        .select(TodoQuery::owned_by(user_id).created_since(start_of_day(anchor)))
        .await?;
    let slices = daily_slices(&created_today);
    let total_minutes = slices.iter().map(|s| s.minutes).sum::<f64>();
    let entries = slices
        .into_iter()
        .map(|s| (s.label, s.minutes))
        .collect::<Vec<_>>();
    println!("{}", pie_chart("Today's progress", &entries, "m"));

    if command.today {
        println!("Total today: {total_minutes:.1} min");
        return Ok(());
    }

    let started_this_week = service
        .select(TodoQuery::owned_by(user_id).started_since(start_of_week(anchor)))
        .await?;
    let hours = weekly_hours(&started_this_week);
    println!(
        "{}",
        pie_chart(
            "This week's progress",
            &[("This week's total".to_string(), hours)],
            "h",
        )
    );
    Ok(())
}

fn resolve_anchor(date: Option<&str>, style: DateStyle) -> Result<DateTime<Local>> {
    match date {
        Some(text) => parse_date_string(text, Local::now(), style.into())
            .with_context(|| format!("Couldn't parse date \"{text}\"")),
        None => Ok(Local::now()),
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::provider::store::MockRecordStore;

    use super::*;

    fn session() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: "a@example.com".into(),
        }
    }

    #[tokio::test]
    async fn daily_filters_by_creation_and_weekly_by_start() {
        let owner = session();
        let user_id = owner.user_id;
        let mut store = MockRecordStore::new();
        store
            .expect_select_todos()
            .withf(move |query| {
                query.user_id == user_id
                    && query.created_since.is_some()
                    && query.started_since.is_none()
            })
            .once()
            .returning(|_| Ok(vec![]));
        store
            .expect_select_todos()
            .withf(move |query| {
                query.user_id == user_id
                    && query.created_since.is_none()
                    && query.started_since.is_some()
            })
            .once()
            .returning(|_| Ok(vec![]));

        process_report_command(store, owner, ReportCommand {
            today: false,
            date: None,
            date_style: DateStyle::Uk,
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn today_flag_skips_the_weekly_fetch() {
        let owner = session();
        let mut store = MockRecordStore::new();
        store
            .expect_select_todos()
            .withf(|query| query.created_since.is_some())
            .once()
            .returning(|_| Ok(vec![]));

        process_report_command(store, owner, ReportCommand {
            today: true,
            date: None,
            date_style: DateStyle::Uk,
        })
        .await
        .unwrap();
    }

    #[test]
    fn bad_dates_are_reported_with_the_input() {
        let err = resolve_anchor(Some("not a date"), DateStyle::Uk).unwrap_err();
        assert!(err.to_string().contains("not a date"));
    }
}
