//! # Checklist Architecture
//!
//! Checklist is a **UI-agnostic list and task manager**. This is not a CLI
//! application that happens to have some library code—it's a library that
//! happens to have a CLI client.
//!
//! This distinction drives the entire architecture and should guide all
//! development.
//!
//! ## The Layer Stack
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - ChecklistApp: wires the stores over one shared backend   │
//! │  - Hosts the cross-store operations (backup, stats persist) │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Store Layer (store/, stats.rs, settings.rs, export.rs)     │
//! │  - Pure business logic over Rust types                      │
//! │  - Publishes change notifications (events.rs)               │
//! │  - No I/O assumptions whatsoever                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (storage/)                                   │
//! │  - Abstract key-value StorageBackend trait                  │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward (API, stores, storage), code:
//! - Takes regular Rust function arguments
//! - Returns regular Rust types (`Result<T, ChecklistError>`)
//! - **Never** writes to stdout/stderr
//! - **Never** calls `std::process::exit`
//! - **Never** assumes a terminal environment
//!
//! This means the same core could serve a REST API, a desktop shell, or any
//! other UI. Errors carry an HTTP-style status code for exactly that reason;
//! see [`error::ChecklistError::status_code`].
//!
//! ## Persistence Model
//!
//! All data lives in a flat key-value namespace (see `storage::keys`): one
//! key for the list metadata array, one key per list for its task
//! collection, and one key for the preferences record. The list store
//! caches its metadata in memory and mirrors it out best-effort; the task
//! store is cacheless and re-reads on every operation, so the two can never
//! disagree about the same key.
//!
//! ## Testing Strategy
//!
//! The stores carry the lion's share of testing, as unit tests against
//! `MemBackend` (which can simulate read/write faults). The CLI is covered
//! by integration tests under `tests/` driving the real binary against a
//! temp data dir.
//!
//! ## Module Overview
//!
//! - [`api`]: The application facade—entry point for embedding
//! - [`store`]: List and task stores
//! - [`stats`]: Usage statistics engine
//! - [`settings`]: User preferences store
//! - [`export`]: Backup export/import with validation
//! - [`events`]: Synchronous pub/sub used by the stores
//! - [`storage`]: Storage abstraction and backends
//! - [`model`]: Core data types and wire formats
//! - [`ids`]: Identifier generation
//! - [`error`]: Error taxonomy
//! - `cli`: Argument parsing and printing for the binary (not part of the
//!   lib API)

pub mod api;
pub mod error;
pub mod events;
pub mod export;
pub mod ids;
pub mod model;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod store;
