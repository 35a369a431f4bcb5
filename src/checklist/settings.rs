//! User preferences: load, partial update, reset, and text export/import.

use crate::error::{ChecklistError, Result};
use crate::events::{Publisher, Subscription};
use crate::model::{AppSettings, AppStats, SettingsUpdate, UserPreferences};
use crate::storage::keys::PREFERENCES_KEY;
use crate::storage::StorageBackend;
use chrono::Utc;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Owns the single preferences record (settings plus the last stats
/// snapshot) persisted under one key.
///
/// Settings follow the same best-effort policy as the list store: a failed
/// write keeps the in-memory value and notifies subscribers, so the running
/// session stays consistent even when the medium is gone. A missing or
/// corrupt record on load falls back to defaults rather than failing
/// startup.
pub struct SettingsStore<S: StorageBackend> {
    storage: Rc<S>,
    prefs: RefCell<UserPreferences>,
    changes: Publisher<AppSettings>,
}

impl<S: StorageBackend> SettingsStore<S> {
    pub fn new(storage: Rc<S>) -> Self {
        let prefs = match storage.read(PREFERENCES_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!(error = %e, "corrupt preferences record, using defaults");
                    UserPreferences::default()
                }
            },
            Ok(None) => UserPreferences::default(),
            Err(e) => {
                warn!(error = %e, "could not read preferences, using defaults");
                UserPreferences::default()
            }
        };
        Self {
            storage,
            prefs: RefCell::new(prefs),
            changes: Publisher::new(),
        }
    }

    /// Observe the effective settings after every change.
    pub fn subscribe(&self, callback: impl Fn(&AppSettings) + 'static) -> Subscription<AppSettings> {
        self.changes.subscribe(callback)
    }

    pub fn settings(&self) -> AppSettings {
        self.prefs.borrow().settings.clone()
    }

    /// The stats snapshot persisted alongside the settings.
    pub fn saved_stats(&self) -> AppStats {
        self.prefs.borrow().stats.clone()
    }

    /// Apply a partial update; unset fields keep their current value. (200)
    pub fn update(&self, update: &SettingsUpdate) -> AppSettings {
        let settings = {
            let mut prefs = self.prefs.borrow_mut();
            update.apply(&mut prefs.settings);
            prefs.settings.clone()
        };
        debug!("settings updated");
        self.persist();
        self.changes.publish(&settings);
        settings
    }

    /// Restore every setting to its default. Stats are untouched. (200)
    pub fn reset_to_defaults(&self) -> AppSettings {
        let settings = {
            let mut prefs = self.prefs.borrow_mut();
            prefs.settings = AppSettings::default();
            prefs.settings.clone()
        };
        self.persist();
        self.changes.publish(&settings);
        settings
    }

    /// Merge a fresh stats snapshot into the preferences record.
    pub fn save_stats(&self, stats: &AppStats) {
        self.prefs.borrow_mut().stats = stats.clone();
        self.persist();
    }

    /// The whole preferences record (settings, stats snapshot, timestamp)
    /// as a standalone JSON document, for sharing across devices. (200;
    /// 500 only if serialization itself fails)
    pub fn export_as_text(&self) -> Result<String> {
        let prefs = self.prefs.borrow();
        serde_json::to_string_pretty(&*prefs).map_err(ChecklistError::Serialization)
    }

    /// Apply settings from a document produced by [`export_as_text`].
    ///
    /// The document must carry a `settings` object; fields missing from it
    /// fall back to their defaults rather than to the current values, so an
    /// import is a full replacement. (200; 400 on malformed input)
    ///
    /// [`export_as_text`]: SettingsStore::export_as_text
    pub fn import_from_text(&self, text: &str) -> Result<AppSettings> {
        let document: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| ChecklistError::InvalidData(format!("not valid JSON: {}", e)))?;
        let settings_value = document
            .get("settings")
            .ok_or_else(|| ChecklistError::InvalidData("missing 'settings' field".to_string()))?;
        let settings: AppSettings = serde_json::from_value(settings_value.clone())
            .map_err(|e| ChecklistError::InvalidData(format!("invalid settings: {}", e)))?;

        self.prefs.borrow_mut().settings = settings.clone();
        self.persist();
        self.changes.publish(&settings);
        Ok(settings)
    }

    fn persist(&self) {
        let serialized = {
            let mut prefs = self.prefs.borrow_mut();
            prefs.last_updated = Utc::now();
            serde_json::to_string(&*prefs)
        };
        match serialized {
            Ok(raw) => {
                if let Err(e) = self.storage.write(PREFERENCES_KEY, &raw) {
                    warn!(error = %e, "could not persist preferences, keeping in-memory value");
                }
            }
            Err(e) => warn!(error = %e, "could not serialize preferences"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TaskSorting, Theme};
    use crate::storage::MemBackend;

    fn make_store() -> (Rc<MemBackend>, SettingsStore<MemBackend>) {
        let backend = Rc::new(MemBackend::new());
        let store = SettingsStore::new(Rc::clone(&backend));
        (backend, store)
    }

    #[test]
    fn test_empty_storage_yields_defaults() {
        let (_, store) = make_store();
        assert_eq!(store.settings(), AppSettings::default());
        assert_eq!(store.saved_stats(), AppStats::default());
    }

    #[test]
    fn test_corrupt_record_falls_back_to_defaults() {
        let backend = Rc::new(MemBackend::new());
        backend.seed(PREFERENCES_KEY, "{nope");
        let store = SettingsStore::new(backend);
        assert_eq!(store.settings(), AppSettings::default());
    }

    #[test]
    fn test_update_applies_only_set_fields() {
        let (_, store) = make_store();
        let updated = store.update(&SettingsUpdate {
            theme: Some(Theme::Dark),
            ..Default::default()
        });
        assert_eq!(updated.theme, Theme::Dark);
        assert!(updated.confirm_deletes);
    }

    #[test]
    fn test_settings_persist_across_instances() {
        let backend = Rc::new(MemBackend::new());
        {
            let store = SettingsStore::new(Rc::clone(&backend));
            store.update(&SettingsUpdate {
                task_sorting: Some(TaskSorting::Alphabetical),
                ..Default::default()
            });
        }
        let reopened = SettingsStore::new(backend);
        assert_eq!(reopened.settings().task_sorting, TaskSorting::Alphabetical);
    }

    #[test]
    fn test_reset_restores_defaults_and_keeps_stats() {
        let (_, store) = make_store();
        store.update(&SettingsUpdate {
            theme: Some(Theme::Light),
            sound_enabled: Some(true),
            ..Default::default()
        });
        store.save_stats(&AppStats {
            total_usage_minutes: 9,
            ..AppStats::default()
        });

        let reset = store.reset_to_defaults();
        assert_eq!(reset, AppSettings::default());
        assert_eq!(store.saved_stats().total_usage_minutes, 9);
    }

    #[test]
    fn test_save_stats_persists_snapshot() {
        let backend = Rc::new(MemBackend::new());
        {
            let store = SettingsStore::new(Rc::clone(&backend));
            store.save_stats(&AppStats {
                total_lists: 3,
                total_usage_minutes: 5,
                ..AppStats::default()
            });
        }
        let reopened = SettingsStore::new(backend);
        assert_eq!(reopened.saved_stats().total_lists, 3);
        assert_eq!(reopened.saved_stats().total_usage_minutes, 5);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let (_, store) = make_store();
        store.update(&SettingsUpdate {
            theme: Some(Theme::Dark),
            compact_mode: Some(true),
            ..Default::default()
        });
        store.save_stats(&AppStats {
            total_usage_minutes: 7,
            ..AppStats::default()
        });
        let text = store.export_as_text().unwrap();

        // The whole preferences record goes out, not just the settings
        assert!(text.contains("\"stats\""));
        assert!(text.contains("\"lastUpdated\""));
        assert!(text.contains("\"totalUsageMinutes\": 7"));

        let (_, other) = make_store();
        let imported = other.import_from_text(&text).unwrap();
        assert_eq!(imported.theme, Theme::Dark);
        assert!(imported.compact_mode);
    }

    #[test]
    fn test_import_rejects_non_json() {
        let (_, store) = make_store();
        let err = store.import_from_text("not json").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_import_requires_settings_field() {
        let (_, store) = make_store();
        let err = store.import_from_text(r#"{"exportDate":"2026-01-01"}"#).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_import_is_full_replacement_over_defaults() {
        let (_, store) = make_store();
        store.update(&SettingsUpdate {
            sound_enabled: Some(true),
            ..Default::default()
        });

        // Imported document only sets the theme; soundEnabled reverts to
        // its default instead of keeping the current value.
        let imported = store
            .import_from_text(r#"{"settings":{"theme":"light"}}"#)
            .unwrap();
        assert_eq!(imported.theme, Theme::Light);
        assert!(!imported.sound_enabled);
    }

    #[test]
    fn test_write_failure_keeps_in_memory_value() {
        let (backend, store) = make_store();
        backend.set_simulate_write_error(true);
        let updated = store.update(&SettingsUpdate {
            theme: Some(Theme::Dark),
            ..Default::default()
        });
        assert_eq!(updated.theme, Theme::Dark);
        assert_eq!(store.settings().theme, Theme::Dark);
    }

    #[test]
    fn test_update_publishes_effective_settings() {
        let (_, store) = make_store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_ref = Rc::clone(&seen);
        let _sub = store.subscribe(move |s: &AppSettings| seen_ref.borrow_mut().push(s.theme));

        store.update(&SettingsUpdate {
            theme: Some(Theme::Light),
            ..Default::default()
        });
        store.reset_to_defaults();

        assert_eq!(*seen.borrow(), vec![Theme::Light, Theme::Auto]);
    }
}
