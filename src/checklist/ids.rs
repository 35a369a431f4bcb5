use std::cell::Cell;
use uuid::Uuid;

/// Produces globally-unique string identifiers for new entities.
/// Injected into the stores so tests can use deterministic ids.
pub trait IdGenerator {
    fn generate(&self) -> String;
}

/// Production generator: random v4 UUIDs.
#[derive(Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic generator for tests: "id-1", "id-2", ...
#[derive(Debug, Default)]
pub struct SequentialGenerator {
    counter: Cell<u64>,
}

impl SequentialGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialGenerator {
    fn generate(&self) -> String {
        let next = self.counter.get() + 1;
        self.counter.set(next);
        format!("id-{}", next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_ids_are_unique() {
        let ids = UuidGenerator;
        assert_ne!(ids.generate(), ids.generate());
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialGenerator::new();
        assert_eq!(ids.generate(), "id-1");
        assert_eq!(ids.generate(), "id-2");
    }
}
