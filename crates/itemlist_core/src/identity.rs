//! Record identifier generation.
//!
//! # Responsibility
//! - Isolate id minting behind `IdGenerator` so callers can swap schemes
//!   or inject deterministic ids in tests.
//!
//! # Invariants
//! - Generated ids are never blank.
//! - Uniqueness against the live collection is checked by the controller,
//!   not by generators.

use crate::clock::Clock;
use crate::model::record::RecordId;
use std::sync::Arc;
use uuid::Uuid;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_SUFFIX_LEN: usize = 6;

/// Source of fresh record identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> RecordId;
}

/// Random v4 UUID ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> RecordId {
        RecordId::Key(Uuid::new_v4().to_string())
    }
}

/// Compact ids made of base36 epoch milliseconds plus a random base36 suffix.
///
/// Matches the id shape already present in snapshot data written by earlier
/// clients, e.g. `lx2k9c1sa3f9qz`.
pub struct TimestampIdGenerator {
    clock: Arc<dyn Clock>,
}

impl TimestampIdGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl IdGenerator for TimestampIdGenerator {
    fn next_id(&mut self) -> RecordId {
        let millis = u64::try_from(self.clock.now_ms()).unwrap_or_default();
        let mut id = to_base36(millis);
        let mut random = u64::from_le_bytes(random_bytes());
        for _ in 0..RANDOM_SUFFIX_LEN {
            id.push(char::from(BASE36_DIGITS[(random % 36) as usize]));
            random /= 36;
        }
        RecordId::Key(id)
    }
}

/// Deterministic `prefix-1`, `prefix-2`, ... ids.
#[derive(Debug, Clone)]
pub struct SequenceIdGenerator {
    prefix: String,
    next: u64,
}

impl SequenceIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequenceIdGenerator {
    fn next_id(&mut self) -> RecordId {
        let id = RecordId::Key(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

fn random_bytes() -> [u8; 8] {
    let bytes = Uuid::new_v4().into_bytes();
    let mut out = [0_u8; 8];
    out.copy_from_slice(&bytes[8..]);
    out
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

#[cfg(test)]
mod tests {
    use super::{to_base36, IdGenerator, SequenceIdGenerator, TimestampIdGenerator, UuidIdGenerator};
    use crate::clock::FixedClock;
    use crate::model::record::RecordId;
    use std::sync::Arc;

    #[test]
    fn base36_matches_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn timestamp_ids_start_with_clock_prefix() {
        let clock = Arc::new(FixedClock::from_millis(1_700_000_000_000));
        let mut ids = TimestampIdGenerator::new(clock);
        let RecordId::Key(id) = ids.next_id() else {
            panic!("timestamp ids are string keys");
        };
        assert!(id.starts_with(&to_base36(1_700_000_000_000)));
        assert_eq!(id.len(), to_base36(1_700_000_000_000).len() + 6);
    }

    #[test]
    fn sequence_ids_are_deterministic() {
        let mut ids = SequenceIdGenerator::new("item");
        assert_eq!(ids.next_id(), RecordId::key("item-1"));
        assert_eq!(ids.next_id(), RecordId::key("item-2"));
    }

    #[test]
    fn uuid_ids_differ() {
        let mut ids = UuidIdGenerator;
        assert_ne!(ids.next_id(), ids.next_id());
    }
}
