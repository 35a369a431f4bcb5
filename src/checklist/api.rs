//! The application facade: wires the stores together over one shared
//! backend and exposes the cross-store operations.

use crate::error::Result;
use crate::export;
use crate::ids::IdGenerator;
use crate::model::{AppStats, ImportReport};
use crate::settings::SettingsStore;
use crate::stats::StatsEngine;
use crate::storage::StorageBackend;
use crate::store::{ListStore, TaskStore};
use std::rc::Rc;

/// One instance per process. The individual stores are public; callers go
/// through them directly for single-store operations and through the
/// methods here for anything that spans stores (backup, import, stats
/// persistence).
pub struct ChecklistApp<S: StorageBackend> {
    pub lists: ListStore<S>,
    pub tasks: TaskStore<S>,
    pub stats: StatsEngine<S>,
    pub settings: SettingsStore<S>,
}

impl<S: StorageBackend> ChecklistApp<S> {
    pub fn new(storage: Rc<S>, ids: Rc<dyn IdGenerator>) -> Self {
        let settings = SettingsStore::new(Rc::clone(&storage));
        // Seed the engine with the persisted snapshot so usage counters
        // survive restarts.
        let stats = StatsEngine::new(Rc::clone(&storage), settings.saved_stats());
        Self {
            lists: ListStore::new(Rc::clone(&storage), Rc::clone(&ids)),
            tasks: TaskStore::new(storage, ids),
            stats,
            settings,
        }
    }

    /// The full data set as a pretty-printed backup document.
    pub fn export_json(&self) -> Result<String> {
        export::export_json(&self.lists)
    }

    /// Import a backup document, then bring the persisted stats up to date
    /// with the new contents.
    pub fn import_json(&self, text: &str) -> Result<ImportReport> {
        let report = export::import_bundle(&self.lists, &self.tasks, text)?;
        self.refresh_stats();
        Ok(report)
    }

    /// Recount stats from storage and persist the snapshot alongside the
    /// settings.
    pub fn refresh_stats(&self) -> AppStats {
        let stats = self.stats.refresh();
        self.settings.save_stats(&stats);
        stats
    }

    /// Credit one minute of usage, persisted immediately.
    pub fn record_activity(&self) -> AppStats {
        let stats = self.stats.record_activity();
        self.settings.save_stats(&stats);
        stats
    }
}
