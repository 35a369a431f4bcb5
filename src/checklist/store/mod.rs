//! # Store Layer
//!
//! The two entity stores. [`ListStore`] owns list metadata and keeps the
//! authoritative in-memory cache; [`TaskStore`] is deliberately cacheless
//! and re-reads each list's collection from the backend on every operation,
//! trading throughput for the guarantee that the two stores can never hold
//! diverging views of the same data.
//!
//! Both publish their new state synchronously after each mutation; see
//! [`crate::events`] for delivery semantics.

pub mod list_store;
pub mod task_store;

pub use list_store::ListStore;
pub use task_store::TaskStore;
