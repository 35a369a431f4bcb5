//! Full-data backup: export everything as one JSON document and import it
//! back, validating before any write.

use crate::error::{ChecklistError, Result};
use crate::model::{ExportBundle, ExportCounts, ImportReport};
use crate::storage::StorageBackend;
use crate::store::{ListStore, TaskStore};
use chrono::Utc;
use tracing::{info, warn};

/// Version stamp written into every bundle. Readers accept any version; the
/// stamp exists so future formats can be told apart.
pub const EXPORT_FORMAT_VERSION: &str = "2.0";

/// A bundle that passed structural validation, reduced to the parts an
/// import actually uses.
#[derive(Debug, PartialEq)]
pub struct ImportList {
    pub title: String,
    pub tasks: Vec<String>,
}

/// Outcome of validating an import document before touching storage.
#[derive(Debug)]
pub enum ParsedImport {
    Valid(Vec<ImportList>),
    Invalid { reason: String },
}

/// Snapshot every list with its tasks into a bundle.
pub fn export_bundle<S: StorageBackend>(lists: &ListStore<S>) -> Result<ExportBundle> {
    let mut listas = Vec::new();
    for meta in lists.list() {
        listas.push(lists.get(&meta.id)?);
    }

    let total_tareas = listas.iter().map(|l| l.tasks.len()).sum();
    Ok(ExportBundle {
        version: EXPORT_FORMAT_VERSION.to_string(),
        export_date: Utc::now(),
        metadata: ExportCounts {
            total_listas: listas.len(),
            total_tareas,
        },
        listas,
    })
}

/// The bundle as pretty-printed JSON, ready to write to a file.
pub fn export_json<S: StorageBackend>(lists: &ListStore<S>) -> Result<String> {
    let bundle = export_bundle(lists)?;
    serde_json::to_string_pretty(&bundle).map_err(ChecklistError::Serialization)
}

/// Structurally validate an export document without writing anything.
///
/// Requirements: a JSON object with a `listas` array; each entry an object
/// with a non-empty string `title` and a `tasks` array whose entries each
/// carry a non-empty string `text`. Anything else names the first
/// offending part in `Invalid`.
pub fn parse_bundle(text: &str) -> ParsedImport {
    let document: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            return ParsedImport::Invalid {
                reason: format!("not valid JSON: {}", e),
            }
        }
    };

    let listas = match document.get("listas").and_then(|v| v.as_array()) {
        Some(listas) => listas,
        None => {
            return ParsedImport::Invalid {
                reason: "missing 'listas' array".to_string(),
            }
        }
    };

    let mut parsed = Vec::with_capacity(listas.len());
    for (i, entry) in listas.iter().enumerate() {
        let title = match entry.get("title").and_then(|v| v.as_str()) {
            Some(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => {
                return ParsedImport::Invalid {
                    reason: format!("list #{}: missing or empty 'title'", i + 1),
                }
            }
        };

        let raw_tasks = match entry.get("tasks").and_then(|v| v.as_array()) {
            Some(a) => a,
            None => {
                return ParsedImport::Invalid {
                    reason: format!("list #{} ('{}'): missing 'tasks' array", i + 1, title),
                }
            }
        };

        let mut tasks = Vec::with_capacity(raw_tasks.len());
        for (j, raw_task) in raw_tasks.iter().enumerate() {
            match raw_task.get("text").and_then(|v| v.as_str()) {
                Some(text) if !text.trim().is_empty() => tasks.push(text.to_string()),
                _ => {
                    return ParsedImport::Invalid {
                        reason: format!(
                            "list #{} ('{}'), task #{}: missing or empty 'text'",
                            i + 1,
                            title,
                            j + 1
                        ),
                    }
                }
            }
        }

        parsed.push(ImportList { title, tasks });
    }

    ParsedImport::Valid(parsed)
}

/// Import a full backup document.
///
/// A structurally invalid document is rejected outright with no writes. A
/// valid one is imported list by list: a title that already exists is
/// skipped (the existing list wins), and individual task failures are
/// collected into the report instead of aborting the batch. (200; 400 on
/// invalid structure)
pub fn import_bundle<S: StorageBackend>(
    lists: &ListStore<S>,
    tasks: &TaskStore<S>,
    text: &str,
) -> Result<ImportReport> {
    let parsed = match parse_bundle(text) {
        ParsedImport::Valid(parsed) => parsed,
        ParsedImport::Invalid { reason } => return Err(ChecklistError::InvalidData(reason)),
    };

    let mut report = ImportReport::default();
    for import in parsed {
        let meta = match lists.create(&import.title) {
            Ok(meta) => meta,
            Err(ChecklistError::ListExists(_)) => {
                report.lists_skipped += 1;
                continue;
            }
            Err(e) => {
                warn!(title = %import.title, error = %e, "import: could not create list");
                report.errors.push(format!("list '{}': {}", import.title, e));
                continue;
            }
        };
        report.lists_created += 1;

        for text in &import.tasks {
            match tasks.create(&meta.id, text) {
                Ok(_) => report.tasks_imported += 1,
                Err(e) => report
                    .errors
                    .push(format!("list '{}', task '{}': {}", import.title, text, e)),
            }
        }
    }

    info!(
        created = report.lists_created,
        skipped = report.lists_skipped,
        tasks = report.tasks_imported,
        errors = report.errors.len(),
        "import finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{IdGenerator, SequentialGenerator};
    use crate::storage::MemBackend;
    use std::rc::Rc;

    struct Fixture {
        lists: ListStore<MemBackend>,
        tasks: TaskStore<MemBackend>,
    }

    fn make_fixture() -> Fixture {
        let backend = Rc::new(MemBackend::new());
        let ids: Rc<dyn IdGenerator> = Rc::new(SequentialGenerator::new());
        Fixture {
            lists: ListStore::new(Rc::clone(&backend), Rc::clone(&ids)),
            tasks: TaskStore::new(backend, ids),
        }
    }

    fn reason(parsed: ParsedImport) -> String {
        match parsed {
            ParsedImport::Invalid { reason } => reason,
            ParsedImport::Valid(_) => panic!("expected invalid"),
        }
    }

    #[test]
    fn test_export_carries_version_and_counts() {
        let fx = make_fixture();
        let groceries = fx.lists.create("Groceries").unwrap();
        fx.tasks.create(&groceries.id, "Milk").unwrap();
        fx.tasks.create(&groceries.id, "Eggs").unwrap();
        fx.lists.create("Empty").unwrap();

        let bundle = export_bundle(&fx.lists).unwrap();
        assert_eq!(bundle.version, EXPORT_FORMAT_VERSION);
        assert_eq!(bundle.metadata.total_listas, 2);
        assert_eq!(bundle.metadata.total_tareas, 2);
        assert_eq!(bundle.listas[0].tasks.len(), 2);
    }

    #[test]
    fn test_export_then_import_into_empty_store() {
        let fx = make_fixture();
        let groceries = fx.lists.create("Groceries").unwrap();
        fx.tasks.create(&groceries.id, "Milk").unwrap();
        let milk = &fx.tasks.list(&groceries.id).unwrap()[0];
        fx.tasks.toggle_completed(&groceries.id, &milk.id).unwrap();
        fx.tasks.create(&groceries.id, "Eggs").unwrap();

        let json = export_json(&fx.lists).unwrap();

        let other = make_fixture();
        let report = import_bundle(&other.lists, &other.tasks, &json).unwrap();
        assert_eq!(report.lists_created, 1);
        assert_eq!(report.tasks_imported, 2);
        assert!(report.errors.is_empty());

        let imported = other.lists.list();
        assert_eq!(imported[0].title, "Groceries");
        let tasks = other.tasks.list(&imported[0].id).unwrap();
        assert_eq!(tasks.len(), 2);
        // Imported tasks start fresh: completion state is not carried over
        assert!(tasks.iter().all(|t| !t.completed));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(reason(parse_bundle("woops")).contains("not valid JSON"));
    }

    #[test]
    fn test_parse_rejects_missing_listas() {
        assert!(reason(parse_bundle(r#"{"version":"2.0"}"#)).contains("'listas'"));
    }

    #[test]
    fn test_parse_rejects_entry_without_title() {
        let doc = r#"{"listas":[{"tasks":[]}]}"#;
        assert!(reason(parse_bundle(doc)).contains("list #1"));
    }

    #[test]
    fn test_parse_rejects_task_without_text() {
        let doc = r#"{"listas":[{"title":"A","tasks":[{"completed":true}]}]}"#;
        let reason = reason(parse_bundle(doc));
        assert!(reason.contains("'A'"));
        assert!(reason.contains("task #1"));
    }

    #[test]
    fn test_parse_requires_tasks_array() {
        let doc = r#"{"listas":[{"title":"Bare"}]}"#;
        assert!(reason(parse_bundle(doc)).contains("'tasks'"));
    }

    #[test]
    fn test_parse_rejects_blank_task_text() {
        let doc = r#"{"listas":[{"title":"A","tasks":[{"text":"   "}]}]}"#;
        assert!(reason(parse_bundle(doc)).contains("task #1"));
    }

    #[test]
    fn test_parse_accepts_empty_task_array() {
        match parse_bundle(r#"{"listas":[{"title":"Bare","tasks":[]}]}"#) {
            ParsedImport::Valid(lists) => {
                assert_eq!(lists[0].title, "Bare");
                assert!(lists[0].tasks.is_empty());
            }
            ParsedImport::Invalid { reason } => panic!("unexpected rejection: {}", reason),
        }
    }

    #[test]
    fn test_import_invalid_document_writes_nothing() {
        let fx = make_fixture();
        let err = import_bundle(&fx.lists, &fx.tasks, r#"{"listas":"nope"}"#).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(fx.lists.list().is_empty());
    }

    #[test]
    fn test_import_skips_existing_titles() {
        let fx = make_fixture();
        let existing = fx.lists.create("Groceries").unwrap();
        fx.tasks.create(&existing.id, "Original").unwrap();

        let doc = r#"{"listas":[
            {"title":"groceries","tasks":[{"text":"Imported"}]},
            {"title":"New","tasks":[{"text":"Milk"}]}
        ]}"#;
        let report = import_bundle(&fx.lists, &fx.tasks, doc).unwrap();

        assert_eq!(report.lists_created, 1);
        assert_eq!(report.lists_skipped, 1);
        assert_eq!(report.tasks_imported, 1);

        // The existing list's tasks are untouched
        let tasks = fx.tasks.list(&existing.id).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "Original");
    }

    #[test]
    fn test_import_collects_task_errors_without_aborting() {
        let fx = make_fixture();
        let doc = r#"{"listas":[{"title":"L","tasks":[
            {"text":"Milk"},
            {"text":"milk"},
            {"text":"Eggs"}
        ]}]}"#;
        let report = import_bundle(&fx.lists, &fx.tasks, doc).unwrap();

        assert_eq!(report.lists_created, 1);
        assert_eq!(report.tasks_imported, 2);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("milk"));
    }
}
