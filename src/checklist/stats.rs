//! Usage statistics, recomputed on demand by scanning the stored data.

use crate::error::ChecklistError;
use crate::events::{Publisher, Subscription};
use crate::model::{AppStats, ListMeta, Task};
use crate::storage::keys::{list_key, LISTS_META_KEY, LIST_KEY_PREFIX};
use crate::storage::StorageBackend;
use chrono::Utc;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::warn;

/// Derives [`AppStats`] from whatever is currently in storage.
///
/// `refresh` recounts everything from the stored lists and tasks; the two
/// activity fields (`last_activity`, `total_usage_minutes`) are carried over
/// from the previous snapshot instead, since they track app usage rather
/// than data content and only `record_activity` advances them.
///
/// Scanning is tolerant: a list whose task collection is missing or corrupt
/// counts zero tasks and is logged, never failing the whole refresh.
pub struct StatsEngine<S: StorageBackend> {
    storage: Rc<S>,
    current: RefCell<AppStats>,
    changes: Publisher<AppStats>,
}

impl<S: StorageBackend> StatsEngine<S> {
    /// `initial` is the last persisted snapshot, so activity counters
    /// survive restarts.
    pub fn new(storage: Rc<S>, initial: AppStats) -> Self {
        Self {
            storage,
            current: RefCell::new(initial),
            changes: Publisher::new(),
        }
    }

    /// Observe every snapshot produced by `refresh` or `record_activity`.
    pub fn subscribe(&self, callback: impl Fn(&AppStats) + 'static) -> Subscription<AppStats> {
        self.changes.subscribe(callback)
    }

    /// The last computed snapshot, without rescanning.
    pub fn snapshot(&self) -> AppStats {
        self.current.borrow().clone()
    }

    /// Recount lists and tasks from storage and publish the new snapshot.
    ///
    /// Task collections are found by enumerating keys with the list-key
    /// prefix, so a collection orphaned from its metadata still counts
    /// toward the totals (it just can't be the busiest list, having no
    /// title to report).
    pub fn refresh(&self) -> AppStats {
        let metas = self.load_metas();

        let mut total_tasks = 0;
        let mut completed_tasks = 0;
        let mut counts: HashMap<String, usize> = HashMap::new();

        for list_id in self.task_collection_ids() {
            let tasks = self.load_tasks(&list_id);
            total_tasks += tasks.len();
            completed_tasks += tasks.iter().filter(|t| t.completed).count();
            counts.insert(list_id, tasks.len());
        }

        // Busiest: strictly more tasks than the current holder, walked in
        // metadata order so ties keep the earlier list. Empty lists never
        // qualify.
        let mut busiest: Option<(String, usize)> = None;
        for meta in &metas {
            let count = counts.get(&meta.id).copied().unwrap_or(0);
            if count == 0 {
                continue;
            }
            let is_new_max = match &busiest {
                Some((_, max)) => count > *max,
                None => true,
            };
            if is_new_max {
                busiest = Some((meta.title.clone(), count));
            }
        }

        let completion_rate = if total_tasks > 0 {
            let pct = completed_tasks as f64 / total_tasks as f64 * 100.0;
            (pct * 100.0).round() / 100.0
        } else {
            0.0
        };

        let mut current = self.current.borrow_mut();
        let stats = AppStats {
            total_lists: metas.len(),
            total_tasks,
            completed_tasks,
            active_tasks: total_tasks - completed_tasks,
            completion_rate,
            busiest_list: busiest.map(|(title, _)| title),
            last_activity: current.last_activity,
            total_usage_minutes: current.total_usage_minutes,
        };
        *current = stats.clone();
        drop(current);

        self.changes.publish(&stats);
        stats
    }

    /// Credit one minute of usage and stamp the activity time.
    pub fn record_activity(&self) -> AppStats {
        let stats = {
            let mut current = self.current.borrow_mut();
            current.last_activity = Some(Utc::now());
            current.total_usage_minutes += 1;
            current.clone()
        };
        self.changes.publish(&stats);
        stats
    }

    fn task_collection_ids(&self) -> Vec<String> {
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "stats: could not enumerate keys");
                return Vec::new();
            }
        };
        keys.into_iter()
            .filter_map(|key| key.strip_prefix(LIST_KEY_PREFIX).map(str::to_string))
            .collect()
    }

    fn load_metas(&self) -> Vec<ListMeta> {
        let raw = match self.storage.read(LISTS_META_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "stats: could not read list metadata");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(metas) => metas,
            Err(e) => {
                warn!(error = %ChecklistError::Serialization(e), "stats: corrupt list metadata");
                Vec::new()
            }
        }
    }

    fn load_tasks(&self, list_id: &str) -> Vec<Task> {
        let raw = match self.storage.read(&list_key(list_id)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(list = %list_id, error = %e, "stats: could not read task collection");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(list = %list_id, error = %e, "stats: corrupt task collection, counting zero");
                Vec::new()
            }
        }
    }
}
