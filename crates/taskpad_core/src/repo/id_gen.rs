//! Task id minting.
//!
//! Timestamp ids are the decimal epoch millisecond of creation. Two creates
//! inside the same millisecond (or a clock step backwards) would collide, so
//! the generator never issues a value at or below the last one it saw.
//! Once the sequence reaches `i64::MAX` it falls back to UUIDv4.

use crate::config::IdStrategy;
use crate::model::task::TaskId;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct TaskIdGenerator {
    strategy: IdStrategy,
    last_issued_ms: i64,
}

impl TaskIdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            last_issued_ms: 0,
        }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Records an id already present in the collection.
    ///
    /// Non-numeric ids (UUIDs, legacy values) cannot collide with timestamp
    /// ids and are ignored.
    pub fn observe(&mut self, id: &TaskId) {
        if let Ok(value) = id.as_str().parse::<i64>() {
            self.last_issued_ms = self.last_issued_ms.max(value);
        }
    }

    pub fn next_id(&mut self, now: DateTime<Utc>) -> TaskId {
        match self.strategy {
            IdStrategy::Timestamp => match self.last_issued_ms.checked_add(1) {
                Some(floor) => {
                    let candidate = now.timestamp_millis().max(floor);
                    self.last_issued_ms = candidate;
                    TaskId::new(candidate.to_string())
                }
                None => random_id(),
            },
            IdStrategy::Uuid => random_id(),
        }
    }
}

fn random_id() -> TaskId {
    TaskId::new(Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::TaskIdGenerator;
    use crate::config::IdStrategy;
    use crate::model::task::TaskId;
    use chrono::{TimeZone, Utc};

    #[test]
    fn timestamp_ids_use_epoch_millis() {
        let mut ids = TaskIdGenerator::new(IdStrategy::Timestamp);
        let now = Utc.timestamp_millis_opt(1_736_500_000_123).unwrap();
        assert_eq!(ids.next_id(now).as_str(), "1736500000123");
    }

    #[test]
    fn same_millisecond_creates_stay_unique_and_increasing() {
        let mut ids = TaskIdGenerator::new(IdStrategy::Timestamp);
        let now = Utc.timestamp_millis_opt(1_000).unwrap();
        let first = ids.next_id(now);
        let second = ids.next_id(now);
        let earlier = ids.next_id(Utc.timestamp_millis_opt(500).unwrap());
        assert_eq!(first.as_str(), "1000");
        assert_eq!(second.as_str(), "1001");
        assert_eq!(earlier.as_str(), "1002");
    }

    #[test]
    fn observed_ids_seed_the_sequence() {
        let mut ids = TaskIdGenerator::new(IdStrategy::Timestamp);
        ids.observe(&TaskId::from("5000"));
        ids.observe(&TaskId::from("not-a-number"));
        let next = ids.next_id(Utc.timestamp_millis_opt(10).unwrap());
        assert_eq!(next.as_str(), "5001");
    }

    #[test]
    fn exhausted_timestamp_sequence_falls_back_to_uuid() {
        let mut ids = TaskIdGenerator::new(IdStrategy::Timestamp);
        ids.observe(&TaskId::from(i64::MAX.to_string().as_str()));
        let now = Utc.timestamp_millis_opt(1_000).unwrap();
        let first = ids.next_id(now);
        let second = ids.next_id(now);
        assert_eq!(first.as_str().len(), 36);
        assert_ne!(first, second);
        assert_ne!(first.as_str(), i64::MAX.to_string());
    }

    #[test]
    fn uuid_strategy_issues_distinct_ids() {
        let mut ids = TaskIdGenerator::new(IdStrategy::Uuid);
        let now = Utc::now();
        let first = ids.next_id(now);
        let second = ids.next_id(now);
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 36);
    }
}
