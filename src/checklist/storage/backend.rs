use crate::error::Result;

/// Abstract interface for raw key-value I/O.
/// This trait handles the "how" of persistence (filesystem vs memory),
/// while the stores handle the "what" (invariants, ordering, events).
///
/// All methods take `&self`: backends use interior mutability where they
/// need state, since the execution model is single-threaded. Operations are
/// synchronous and complete within the call; a medium fault surfaces as an
/// immediate `Err`, never as a panic or a pending operation.
pub trait StorageBackend {
    /// Whether the medium accepted a write probe at startup.
    /// Stores treat an unavailable medium as empty and keep working from
    /// their in-memory state.
    fn available(&self) -> bool;

    /// Read the value for a key. `Ok(None)` if the key is absent;
    /// `Err` only on an actual medium fault.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Write a value. Must not leave a partially-written value behind on
    /// failure (filesystem backends write to a tmp file and rename).
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Enumerate all keys in the namespace, sorted.
    fn keys(&self) -> Result<Vec<String>>;
}
