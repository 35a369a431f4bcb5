//! # Storage Layer
//!
//! The persistence adapter for checklist data. The [`StorageBackend`] trait
//! is a thin synchronous key-value contract; everything above it (stores,
//! stats, settings) is backend-agnostic.
//!
//! ## Implementations
//!
//! - [`fs::FsBackend`]: production storage, one JSON file per key under a
//!   data directory, with atomic writes (tmp + rename).
//! - [`memory::MemBackend`]: in-memory storage for tests, with read/write
//!   fault injection.
//!
//! ## Key layout
//!
//! ```text
//! checklist_listas_meta          # JSON array of list metadata
//! checklist_lista_<listId>       # JSON array of tasks for one list
//! checklist_user_preferences     # settings + stats snapshot
//! ```
//!
//! Metadata and task collections are stored under separate keys so listing
//! lists never reads task data.

pub mod backend;
pub mod fs;
pub mod keys;
pub mod memory;

pub use backend::StorageBackend;
pub use fs::FsBackend;
pub use memory::MemBackend;
