use crate::error::{ChecklistError, Result};
use crate::events::{Publisher, Subscription};
use crate::ids::IdGenerator;
use crate::model::{ListMeta, ListWithTasks, Task};
use crate::storage::keys::{list_key, LISTS_META_KEY};
use crate::storage::StorageBackend;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Owns the authoritative in-memory sequence of lists, mirrored to the
/// backend under a single key.
///
/// Persistence is best-effort: once an operation passes its checks, the
/// cache is mutated and subscribers are notified even if the mirror write
/// fails. The cache is the operational source of truth; a failed write only
/// costs durability, not consistency, and is logged.
pub struct ListStore<S: StorageBackend> {
    storage: Rc<S>,
    ids: Rc<dyn IdGenerator>,
    cache: RefCell<Vec<ListMeta>>,
    changes: Publisher<Vec<ListMeta>>,
}

impl<S: StorageBackend> ListStore<S> {
    /// Load the persisted metadata into the cache. A missing key, an
    /// unavailable medium, or corrupt data all start the store empty; the
    /// failure is logged, never propagated.
    pub fn new(storage: Rc<S>, ids: Rc<dyn IdGenerator>) -> Self {
        let cache = if storage.available() {
            match storage.read(LISTS_META_KEY) {
                Ok(Some(raw)) => match serde_json::from_str::<Vec<ListMeta>>(&raw) {
                    Ok(lists) => lists,
                    Err(e) => {
                        warn!(error = %e, "corrupt list metadata, starting empty");
                        Vec::new()
                    }
                },
                Ok(None) => Vec::new(),
                Err(e) => {
                    warn!(error = %e, "could not read list metadata, starting empty");
                    Vec::new()
                }
            }
        } else {
            warn!("storage unavailable, starting with empty list metadata");
            Vec::new()
        };

        Self {
            storage,
            ids,
            cache: RefCell::new(cache),
            changes: Publisher::new(),
        }
    }

    /// Observe the full list sequence after every mutation.
    pub fn subscribe(&self, callback: impl Fn(&Vec<ListMeta>) + 'static) -> Subscription<Vec<ListMeta>> {
        self.changes.subscribe(callback)
    }

    /// All lists, in creation order. Always answers from the cache. (200)
    pub fn list(&self) -> Vec<ListMeta> {
        self.cache.borrow().clone()
    }

    /// A list joined with its tasks. The task collection is read from the
    /// backend on demand, not cached. (200; 404 if the id is unknown)
    pub fn get(&self, list_id: &str) -> Result<ListWithTasks> {
        let meta = self
            .cache
            .borrow()
            .iter()
            .find(|l| l.id == list_id)
            .cloned()
            .ok_or_else(|| ChecklistError::ListNotFound(list_id.to_string()))?;

        let tasks = match self.storage.read(&list_key(list_id))? {
            Some(raw) => serde_json::from_str::<Vec<Task>>(&raw)
                .map_err(|e| ChecklistError::Storage(format!("corrupt task collection: {}", e)))?,
            None => Vec::new(),
        };

        Ok(ListWithTasks { meta, tasks })
    }

    /// Create a list. The title is trimmed; duplicates are rejected by
    /// case-insensitive comparison before anything is written. An empty
    /// task collection is initialized under the list's derived key. (201)
    pub fn create(&self, title: &str) -> Result<ListMeta> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(ChecklistError::InvalidData(
                "list title cannot be empty".to_string(),
            ));
        }
        if self.title_taken(trimmed, None) {
            return Err(ChecklistError::ListExists(trimmed.to_string()));
        }

        let meta = ListMeta::new(self.ids.generate(), trimmed);
        debug!(id = %meta.id, title = %meta.title, "creating list");

        self.cache.borrow_mut().push(meta.clone());
        self.persist_meta();

        if let Err(e) = self.storage.write(&list_key(&meta.id), "[]") {
            warn!(id = %meta.id, error = %e, "could not initialize task collection");
        }

        self.publish();
        Ok(meta)
    }

    /// Rename a list. (200; 404 unknown id; 409 when another list already
    /// holds the title, case-insensitive)
    pub fn rename(&self, list_id: &str, new_title: &str) -> Result<ListMeta> {
        let trimmed = new_title.trim();
        if trimmed.is_empty() {
            return Err(ChecklistError::InvalidData(
                "list title cannot be empty".to_string(),
            ));
        }

        let updated = {
            let mut cache = self.cache.borrow_mut();
            let index = cache
                .iter()
                .position(|l| l.id == list_id)
                .ok_or_else(|| ChecklistError::ListNotFound(list_id.to_string()))?;

            let taken = cache.iter().enumerate().any(|(i, l)| {
                i != index && l.title.to_lowercase() == trimmed.to_lowercase()
            });
            if taken {
                return Err(ChecklistError::ListExists(trimmed.to_string()));
            }

            let list = &mut cache[index];
            list.title = trimmed.to_string();
            list.updated_at = chrono::Utc::now();
            list.clone()
        };

        self.persist_meta();
        self.publish();
        Ok(updated)
    }

    /// Delete a list and its entire task collection. The task key is
    /// removed first and the single publish happens after both steps, so
    /// observers never see the list gone with tasks still present. (200;
    /// 404 unknown id)
    pub fn delete(&self, list_id: &str) -> Result<()> {
        let index = self
            .cache
            .borrow()
            .iter()
            .position(|l| l.id == list_id)
            .ok_or_else(|| ChecklistError::ListNotFound(list_id.to_string()))?;

        // A failed key removal aborts before the cache mutates: a rejected
        // delete leaves no partial state.
        self.storage.remove(&list_key(list_id))?;

        self.cache.borrow_mut().remove(index);
        debug!(id = %list_id, "deleted list");

        self.persist_meta();
        self.publish();
        Ok(())
    }

    fn title_taken(&self, title: &str, exclude_id: Option<&str>) -> bool {
        let lowered = title.to_lowercase();
        self.cache
            .borrow()
            .iter()
            .any(|l| Some(l.id.as_str()) != exclude_id && l.title.to_lowercase() == lowered)
    }

    fn persist_meta(&self) {
        let serialized = match serde_json::to_string(&*self.cache.borrow()) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "could not serialize list metadata");
                return;
            }
        };
        if let Err(e) = self.storage.write(LISTS_META_KEY, &serialized) {
            warn!(error = %e, "could not persist list metadata, cache retained");
        }
    }

    fn publish(&self) {
        let snapshot = self.cache.borrow().clone();
        self.changes.publish(&snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialGenerator;
    use crate::storage::MemBackend;

    fn make_store() -> ListStore<MemBackend> {
        ListStore::new(Rc::new(MemBackend::new()), Rc::new(SequentialGenerator::new()))
    }

    fn make_store_with(backend: Rc<MemBackend>) -> ListStore<MemBackend> {
        ListStore::new(backend, Rc::new(SequentialGenerator::new()))
    }

    #[test]
    fn test_create_and_list() {
        let store = make_store();
        let meta = store.create("Groceries").unwrap();
        assert_eq!(meta.title, "Groceries");
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_create_trims_title() {
        let store = make_store();
        let meta = store.create("  Errands  ").unwrap();
        assert_eq!(meta.title, "Errands");
    }

    #[test]
    fn test_create_rejects_empty_title() {
        let store = make_store();
        let err = store.create("   ").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_duplicate_title_case_insensitive() {
        let store = make_store();
        store.create("X").unwrap();
        let err = store.create("x").unwrap_err();
        assert!(matches!(err, ChecklistError::ListExists(_)));
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_create_initializes_empty_task_collection() {
        let backend = Rc::new(MemBackend::new());
        let store = make_store_with(Rc::clone(&backend));
        let meta = store.create("Groceries").unwrap();
        assert_eq!(
            backend.read(&list_key(&meta.id)).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_get_unknown_id_is_not_found() {
        let store = make_store();
        let err = store.get("nope").unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_get_joins_tasks() {
        let backend = Rc::new(MemBackend::new());
        let store = make_store_with(Rc::clone(&backend));
        let meta = store.create("Groceries").unwrap();

        let task = Task::new("t-1".to_string(), "Milk", 0);
        backend.seed(
            &list_key(&meta.id),
            &serde_json::to_string(&vec![task]).unwrap(),
        );

        let full = store.get(&meta.id).unwrap();
        assert_eq!(full.meta.title, "Groceries");
        assert_eq!(full.tasks.len(), 1);
        assert_eq!(full.tasks[0].text, "Milk");
    }

    #[test]
    fn test_rename_updates_title_and_timestamp() {
        let store = make_store();
        let meta = store.create("Old").unwrap();
        let renamed = store.rename(&meta.id, "New").unwrap();
        assert_eq!(renamed.title, "New");
        assert!(renamed.updated_at >= meta.updated_at);
    }

    #[test]
    fn test_rename_to_own_title_is_allowed() {
        let store = make_store();
        let meta = store.create("Same").unwrap();
        assert!(store.rename(&meta.id, "same").is_ok());
    }

    #[test]
    fn test_rename_conflict_is_conflict() {
        let store = make_store();
        store.create("A").unwrap();
        let b = store.create("B").unwrap();
        let err = store.rename(&b.id, "a").unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_rename_unknown_id_is_not_found() {
        let store = make_store();
        assert_eq!(store.rename("nope", "T").unwrap_err().status_code(), 404);
    }

    #[test]
    fn test_delete_cascades_to_task_collection() {
        let backend = Rc::new(MemBackend::new());
        let store = make_store_with(Rc::clone(&backend));
        let meta = store.create("Groceries").unwrap();

        store.delete(&meta.id).unwrap();

        assert!(store.list().is_empty());
        assert!(backend.read(&list_key(&meta.id)).unwrap().is_none());
        assert!(!backend
            .keys()
            .unwrap()
            .iter()
            .any(|k| k == &list_key(&meta.id)));
    }

    #[test]
    fn test_delete_unknown_id_is_not_found() {
        let store = make_store();
        assert_eq!(store.delete("nope").unwrap_err().status_code(), 404);
    }

    #[test]
    fn test_mutations_notify_subscribers_in_order() {
        let store = make_store();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_ref = Rc::clone(&seen);
        let _sub = store.subscribe(move |lists: &Vec<ListMeta>| {
            seen_ref
                .borrow_mut()
                .push(lists.iter().map(|l| l.title.clone()).collect::<Vec<_>>());
        });

        store.create("A").unwrap();
        store.create("B").unwrap();
        let b_id = store.list()[1].id.clone();
        store.delete(&b_id).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                vec!["A".to_string()],
                vec!["A".to_string(), "B".to_string()],
                vec!["A".to_string()],
            ]
        );
    }

    #[test]
    fn test_write_failure_still_updates_cache_and_notifies() {
        let backend = Rc::new(MemBackend::new());
        let store = make_store_with(Rc::clone(&backend));
        let notified = Rc::new(RefCell::new(0));
        let n = Rc::clone(&notified);
        let _sub = store.subscribe(move |_| *n.borrow_mut() += 1);

        backend.set_simulate_write_error(true);
        let meta = store.create("Groceries").unwrap();

        assert_eq!(store.list().len(), 1);
        assert_eq!(*notified.borrow(), 1);

        // Nothing was mirrored
        backend.set_simulate_write_error(false);
        assert!(backend.read(LISTS_META_KEY).unwrap().is_none());
        assert!(backend.read(&list_key(&meta.id)).unwrap().is_none());
    }

    #[test]
    fn test_loads_persisted_lists_on_startup() {
        let backend = Rc::new(MemBackend::new());
        {
            let store = make_store_with(Rc::clone(&backend));
            store.create("Persisted").unwrap();
        }
        let reloaded = make_store_with(backend);
        assert_eq!(reloaded.list().len(), 1);
        assert_eq!(reloaded.list()[0].title, "Persisted");
    }

    #[test]
    fn test_corrupt_metadata_starts_empty() {
        let backend = Rc::new(MemBackend::new());
        backend.seed(LISTS_META_KEY, "{not json");
        let store = make_store_with(backend);
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_unavailable_medium_starts_empty() {
        let store = ListStore::new(
            Rc::new(MemBackend::unavailable()),
            Rc::new(SequentialGenerator::new()),
        );
        assert!(store.list().is_empty());
        // Still operational from the cache
        assert!(store.create("Offline").is_ok());
        assert_eq!(store.list().len(), 1);
    }
}
