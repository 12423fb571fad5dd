//! Timestamp-based item id generator

use super::item::ItemId;
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Issues millisecond-timestamp ids that strictly increase, even when several
/// ids are requested within the same millisecond or the clock steps back.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> ItemId {
        self.next_after(Utc::now().timestamp_millis())
    }

    /// Record an existing id so it is never issued again
    pub fn observe(&self, id: &ItemId) {
        if let Some(timestamp) = id.timestamp() {
            self.last.fetch_max(timestamp, Ordering::SeqCst);
        }
    }

    fn next_after(&self, now_millis: i64) -> ItemId {
        let mut previous = self.last.load(Ordering::SeqCst);

        loop {
            let candidate = now_millis.max(previous + 1);
            match self.last.compare_exchange(
                previous,
                candidate,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return ItemId::new(candidate.to_string()),
                Err(actual) => previous = actual,
            }
        }
    }
}
