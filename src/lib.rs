//! Terminal task and time tracker. Create tasks, run one timer per task with
//! optional breaks, and review pie-chart style reports of today's minutes and
//! this week's hours. Accounts and records live in local files under the
//! application directory.
//!

pub mod cli;
pub mod provider;
pub mod report;
pub mod tasks;
pub mod utils;
