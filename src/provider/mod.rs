//! The provider layer stands in for the managed backend the application
//! delegates to: an auth gateway and a record store with two collections,
//! `users` and `todos`. Both are consumed through traits so the rest of the
//! application never depends on where the data actually lives.

pub mod auth;
pub mod entities;
pub mod json_store;
mod jsonl;
pub mod store;
