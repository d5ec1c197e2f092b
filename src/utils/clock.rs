use chrono::{DateTime, Utc};

/// Represents an entity responsible for providing the current moment across
/// the application. This allows it to be swapped out for testing.
pub trait Clock: Sync + Send + 'static {
    fn now(&self) -> DateTime<Utc>;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
