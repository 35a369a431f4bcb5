use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for a single list. Persisted as part of the JSON array under the
/// lists-meta key; wire field names are camelCase for compatibility with
/// data written by earlier versions of the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListMeta {
    pub fn new(id: String, title: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A single checklist item. Scoped to exactly one list; the list id is part
/// of the storage key, never stored on the task itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub selected: bool,
    /// Zero-based rank within the list's display order. Dense: after every
    /// mutation the positions of a list's tasks are exactly 0..n.
    pub position: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: String, text: &str, position: usize) -> Self {
        let now = Utc::now();
        Self {
            id,
            text: text.trim().to_string(),
            completed: false,
            selected: false,
            position,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A list joined with its tasks. Derived on demand, never persisted in this
/// shape (metadata and task collections live under separate keys).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListWithTasks {
    #[serde(flatten)]
    pub meta: ListMeta,
    pub tasks: Vec<Task>,
}

// ---------------------------------------------------------------------------
// Settings & stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultView {
    List,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskSorting {
    Manual,
    Alphabetical,
    DateCreated,
    DateModified,
}

/// User preferences. The struct-level `default` means a persisted record
/// missing some fields deserializes with those fields at their defaults,
/// which is how settings written by older versions stay loadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub theme: Theme,
    pub compact_mode: bool,
    pub show_completed: bool,
    pub auto_save: bool,
    pub confirm_deletes: bool,
    pub animations_enabled: bool,
    pub sound_enabled: bool,
    pub default_view: DefaultView,
    pub task_sorting: TaskSorting,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Auto,
            compact_mode: false,
            show_completed: true,
            auto_save: true,
            confirm_deletes: true,
            animations_enabled: true,
            sound_enabled: false,
            default_view: DefaultView::List,
            task_sorting: TaskSorting::Manual,
        }
    }
}

/// A typed partial update: `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsUpdate {
    pub theme: Option<Theme>,
    pub compact_mode: Option<bool>,
    pub show_completed: Option<bool>,
    pub auto_save: Option<bool>,
    pub confirm_deletes: Option<bool>,
    pub animations_enabled: Option<bool>,
    pub sound_enabled: Option<bool>,
    pub default_view: Option<DefaultView>,
    pub task_sorting: Option<TaskSorting>,
}

impl SettingsUpdate {
    pub fn apply(&self, settings: &mut AppSettings) {
        if let Some(v) = self.theme {
            settings.theme = v;
        }
        if let Some(v) = self.compact_mode {
            settings.compact_mode = v;
        }
        if let Some(v) = self.show_completed {
            settings.show_completed = v;
        }
        if let Some(v) = self.auto_save {
            settings.auto_save = v;
        }
        if let Some(v) = self.confirm_deletes {
            settings.confirm_deletes = v;
        }
        if let Some(v) = self.animations_enabled {
            settings.animations_enabled = v;
        }
        if let Some(v) = self.sound_enabled {
            settings.sound_enabled = v;
        }
        if let Some(v) = self.default_view {
            settings.default_view = v;
        }
        if let Some(v) = self.task_sorting {
            settings.task_sorting = v;
        }
    }
}

/// Derived usage statistics. `completion_rate` is a percentage rounded to
/// two decimals; the activity fields are updated by explicit calls, never
/// derived from storage content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppStats {
    pub total_lists: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub active_tasks: usize,
    pub completion_rate: f64,
    pub busiest_list: Option<String>,
    pub last_activity: Option<DateTime<Utc>>,
    pub total_usage_minutes: u64,
}

impl Default for AppStats {
    fn default() -> Self {
        Self {
            total_lists: 0,
            total_tasks: 0,
            completed_tasks: 0,
            active_tasks: 0,
            completion_rate: 0.0,
            busiest_list: None,
            last_activity: None,
            total_usage_minutes: 0,
        }
    }
}

/// The single record persisted under the preferences key: settings plus the
/// last stats snapshot, merged together.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub settings: AppSettings,
    pub stats: AppStats,
    pub last_updated: DateTime<Utc>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            settings: AppSettings::default(),
            stats: AppStats::default(),
            last_updated: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Export bundle
// ---------------------------------------------------------------------------

/// On-disk backup format. The `listas` / `totalListas` / `totalTareas` field
/// names are the serialization contract of the 2.0 format and must not
/// change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub listas: Vec<ListWithTasks>,
    pub metadata: ExportCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportCounts {
    pub total_listas: usize,
    pub total_tareas: usize,
}

/// Outcome of a batch import. Individual failures are collected here rather
/// than aborting the batch.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub lists_created: usize,
    pub lists_skipped: usize,
    pub tasks_imported: usize,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_meta_trims_title() {
        let meta = ListMeta::new("id-1".to_string(), "  Groceries  ");
        assert_eq!(meta.title, "Groceries");
        assert_eq!(meta.created_at, meta.updated_at);
    }

    #[test]
    fn test_task_starts_unselected_and_incomplete() {
        let task = Task::new("t-1".to_string(), " Milk ", 3);
        assert_eq!(task.text, "Milk");
        assert!(!task.completed);
        assert!(!task.selected);
        assert_eq!(task.position, 3);
    }

    #[test]
    fn test_wire_field_names_are_camel_case() {
        let meta = ListMeta::new("id-1".to_string(), "Groceries");
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"updatedAt\""));
    }

    #[test]
    fn test_settings_deserialize_fills_missing_fields() {
        let settings: AppSettings = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert!(settings.show_completed);
        assert_eq!(settings.task_sorting, TaskSorting::Manual);
    }

    #[test]
    fn test_settings_unknown_fields_ignored() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"compactMode":true,"futureOption":42}"#).unwrap();
        assert!(settings.compact_mode);
    }

    #[test]
    fn test_task_sorting_wire_names() {
        let json = serde_json::to_string(&TaskSorting::DateCreated).unwrap();
        assert_eq!(json, "\"dateCreated\"");
    }

    #[test]
    fn test_settings_update_applies_only_set_fields() {
        let mut settings = AppSettings::default();
        let update = SettingsUpdate {
            theme: Some(Theme::Light),
            sound_enabled: Some(true),
            ..Default::default()
        };
        update.apply(&mut settings);
        assert_eq!(settings.theme, Theme::Light);
        assert!(settings.sound_enabled);
        assert!(settings.auto_save);
    }

    #[test]
    fn test_export_bundle_wire_contract() {
        let bundle = ExportBundle {
            version: "2.0".to_string(),
            export_date: Utc::now(),
            listas: Vec::new(),
            metadata: ExportCounts {
                total_listas: 0,
                total_tareas: 0,
            },
        };
        let json = serde_json::to_string(&bundle).unwrap();
        assert!(json.contains("\"listas\""));
        assert!(json.contains("\"totalListas\""));
        assert!(json.contains("\"totalTareas\""));
        assert!(json.contains("\"exportDate\""));
    }

    #[test]
    fn test_list_with_tasks_flattens_meta() {
        let lwt = ListWithTasks {
            meta: ListMeta::new("id-1".to_string(), "Groceries"),
            tasks: Vec::new(),
        };
        let json = serde_json::to_string(&lwt).unwrap();
        assert!(json.contains("\"title\":\"Groceries\""));
        assert!(json.contains("\"tasks\":[]"));
        assert!(!json.contains("\"meta\""));
    }
}
