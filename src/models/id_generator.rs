use std::collections::VecDeque;
use std::sync::Mutex;

use super::Id;

/// Abstraction over ID generation to support deterministic tests and seeding.
pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> Id;
}

#[derive(Debug, Clone, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn new_id(&self) -> Id {
        Id::new()
    }
}

/// A deterministic generator that returns a pre-seeded sequence of IDs.
///
/// Panics if you request more IDs than provided.
#[derive(Debug, Default)]
pub struct FixedIdGenerator {
    ids: Mutex<VecDeque<Id>>,
}

impl FixedIdGenerator {
    pub fn new(ids: impl IntoIterator<Item = Id>) -> Self {
        Self {
            ids: Mutex::new(ids.into_iter().collect()),
        }
    }
}

impl IdGenerator for FixedIdGenerator {
    fn new_id(&self) -> Id {
        self.ids
            .lock()
            .expect("fixed id generator lock poisoned")
            .pop_front()
            .expect("fixed id generator exhausted")
    }
}

/// Generates `{prefix}-{n}` ids from a counter. Used for demo seeding so
/// re-seeding yields the same files.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: Mutex<u64>,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Mutex::new(1),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn new_id(&self) -> Id {
        let mut next = self.next.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let id = Id::sequential(&self.prefix, *next);
        *next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_generator_yields_in_order() {
        let ids = FixedIdGenerator::new([Id::from_string("a"), Id::from_string("b")]);
        assert_eq!(ids.new_id().as_str(), "a");
        assert_eq!(ids.new_id().as_str(), "b");
    }

    #[test]
    fn sequential_generator_counts_up() {
        let ids = SequentialIdGenerator::new("tx");
        assert_eq!(ids.new_id().as_str(), "tx-1");
        assert_eq!(ids.new_id().as_str(), "tx-2");
    }
}
