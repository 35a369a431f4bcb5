//! Storage key constants and derivation.
//!
//! Key names are fixed: they match data written by earlier versions of the
//! app and must not change.

/// JSON array of [`crate::model::ListMeta`] records.
pub const LISTS_META_KEY: &str = "checklist_listas_meta";

/// Prefix for per-list task collections; the full key is the prefix plus
/// the list id.
pub const LIST_KEY_PREFIX: &str = "checklist_lista_";

/// Single record holding user settings and the last stats snapshot.
pub const PREFERENCES_KEY: &str = "checklist_user_preferences";

/// Derive the storage key for a list's task collection.
pub fn list_key(list_id: &str) -> String {
    format!("{}{}", LIST_KEY_PREFIX, list_id)
}
