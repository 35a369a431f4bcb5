use crate::error::{ChecklistError, Result};
use crate::events::{Publisher, Subscription};
use crate::ids::IdGenerator;
use crate::model::Task;
use crate::storage::keys::list_key;
use crate::storage::StorageBackend;
use chrono::Utc;
use std::rc::Rc;
use tracing::debug;

/// Event published after every task mutation: the owning list's id and the
/// full collection in its new order.
pub type TaskChange = (String, Vec<Task>);

/// Per-list task collections, persisted under one key per list.
///
/// Deliberately cacheless: every operation re-reads the relevant
/// collection, mutates, and re-writes it whole. Slower than caching, but
/// the task store can never diverge from what the list store's cascade
/// delete or an importer did to the same keys.
///
/// Unlike the list store, a failed write here fails the operation: nothing
/// was retained in memory, so pretending success would lose the change
/// silently.
pub struct TaskStore<S: StorageBackend> {
    storage: Rc<S>,
    ids: Rc<dyn IdGenerator>,
    changes: Publisher<TaskChange>,
}

impl<S: StorageBackend> TaskStore<S> {
    pub fn new(storage: Rc<S>, ids: Rc<dyn IdGenerator>) -> Self {
        Self {
            storage,
            ids,
            changes: Publisher::new(),
        }
    }

    /// Observe `(listId, tasks)` after every mutation.
    pub fn subscribe(&self, callback: impl Fn(&TaskChange) + 'static) -> Subscription<TaskChange> {
        self.changes.subscribe(callback)
    }

    /// Tasks of a list ordered by position. An unknown list id yields an
    /// empty sequence, not an error. (200)
    pub fn list(&self, list_id: &str) -> Result<Vec<Task>> {
        let mut tasks = self.load(list_id)?;
        tasks.sort_by_key(|t| t.position);
        Ok(tasks)
    }

    /// Append a task at the end of the list's ordering. Duplicate text
    /// within the list is rejected case-insensitively before any write.
    /// (201; 409 on duplicate)
    pub fn create(&self, list_id: &str, text: &str) -> Result<Task> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ChecklistError::InvalidData(
                "task text cannot be empty".to_string(),
            ));
        }

        let mut tasks = self.load(list_id)?;
        let lowered = trimmed.to_lowercase();
        if tasks.iter().any(|t| t.text.to_lowercase() == lowered) {
            return Err(ChecklistError::TaskExists(trimmed.to_string()));
        }

        let task = Task::new(self.ids.generate(), trimmed, tasks.len());
        debug!(list = %list_id, id = %task.id, "creating task");
        tasks.push(task.clone());
        self.persist(list_id, &tasks)?;
        Ok(task)
    }

    /// Replace a task's text. Duplicate text is intentionally not
    /// re-checked here; only creation enforces uniqueness. Blank text is
    /// still rejected. (200; 404; 400 on empty text)
    pub fn update(&self, list_id: &str, task_id: &str, new_text: &str) -> Result<Task> {
        let trimmed = new_text.trim();
        if trimmed.is_empty() {
            return Err(ChecklistError::InvalidData(
                "task text cannot be empty".to_string(),
            ));
        }

        let mut tasks = self.load(list_id)?;
        let task = Self::find_mut(&mut tasks, task_id)?;
        task.text = trimmed.to_string();
        task.updated_at = Utc::now();
        let updated = task.clone();
        self.persist(list_id, &tasks)?;
        Ok(updated)
    }

    /// Flip `completed` and mirror the new value into `selected`, keeping
    /// the two flags synchronized. (200; 404)
    pub fn toggle_completed(&self, list_id: &str, task_id: &str) -> Result<Task> {
        let mut tasks = self.load(list_id)?;
        let task = Self::find_mut(&mut tasks, task_id)?;
        task.completed = !task.completed;
        task.selected = task.completed;
        task.updated_at = Utc::now();
        let updated = task.clone();
        self.persist(list_id, &tasks)?;
        Ok(updated)
    }

    /// Remove one task and close the gap: remaining positions are
    /// reindexed to a dense 0..n-1 in their existing relative order.
    /// (200; 404)
    pub fn delete(&self, list_id: &str, task_id: &str) -> Result<()> {
        let mut tasks = self.load(list_id)?;
        let index = tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| ChecklistError::TaskNotFound(task_id.to_string()))?;
        tasks.remove(index);
        Self::reindex(&mut tasks);
        self.persist(list_id, &tasks)?;
        Ok(())
    }

    /// Remove every task with `selected = true`; returns how many were
    /// removed (possibly 0). Remainder is reindexed. (200)
    pub fn delete_selected(&self, list_id: &str) -> Result<usize> {
        let mut tasks = self.load(list_id)?;
        let before = tasks.len();
        tasks.retain(|t| !t.selected);
        let removed = before - tasks.len();
        Self::reindex(&mut tasks);
        self.persist(list_id, &tasks)?;
        debug!(list = %list_id, removed, "deleted selected tasks");
        Ok(removed)
    }

    /// Move the task at `from` so it ends up at index `to` (single-element
    /// move: elements after the removal point shift before reinsertion).
    /// Out-of-range indices are clamped to the valid range. Every task's
    /// `updatedAt` is touched, and all positions are reindexed to the new
    /// order. (200)
    pub fn reorder(&self, list_id: &str, from: usize, to: usize) -> Result<Vec<Task>> {
        let mut tasks = self.load(list_id)?;
        if tasks.is_empty() {
            return Ok(tasks);
        }

        let last = tasks.len() - 1;
        let from = from.min(last);
        let to = to.min(last);

        let moved = tasks.remove(from);
        tasks.insert(to, moved);

        let now = Utc::now();
        for (i, task) in tasks.iter_mut().enumerate() {
            task.position = i;
            task.updated_at = now;
        }

        self.persist(list_id, &tasks)?;
        Ok(tasks)
    }

    /// Set every task's `selected` AND `completed` to `value`. The bulk
    /// operation couples the two flags unconditionally, unlike the single
    /// toggle which only mirrors completion into selection. (200)
    pub fn select_all(&self, list_id: &str, value: bool) -> Result<Vec<Task>> {
        let mut tasks = self.load(list_id)?;
        let now = Utc::now();
        for task in tasks.iter_mut() {
            task.selected = value;
            task.completed = value;
            task.updated_at = now;
        }
        self.persist(list_id, &tasks)?;
        Ok(tasks)
    }

    fn find_mut<'a>(tasks: &'a mut [Task], task_id: &str) -> Result<&'a mut Task> {
        tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| ChecklistError::TaskNotFound(task_id.to_string()))
    }

    fn reindex(tasks: &mut [Task]) {
        for (i, task) in tasks.iter_mut().enumerate() {
            task.position = i;
        }
    }

    fn load(&self, list_id: &str) -> Result<Vec<Task>> {
        match self.storage.read(&list_key(list_id))? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| ChecklistError::Storage(format!("corrupt task collection: {}", e))),
            None => Ok(Vec::new()),
        }
    }

    fn persist(&self, list_id: &str, tasks: &[Task]) -> Result<()> {
        let serialized =
            serde_json::to_string(tasks).map_err(ChecklistError::Serialization)?;
        self.storage.write(&list_key(list_id), &serialized)?;
        self.changes.publish(&(list_id.to_string(), tasks.to_vec()));
        Ok(())
    }
}
