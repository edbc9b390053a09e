// --- Default value functions ---

pub(super) fn default_data_dir() -> String {
    "~/.lexis".to_string()
}
pub(super) fn default_log_level() -> String {
    "info".to_string()
}
pub(super) fn default_language() -> String {
    crate::language::DEFAULT_LANGUAGE.to_string()
}
pub(super) fn default_fragments_dir() -> String {
    "locales".to_string()
}
pub(super) fn default_title_key() -> String {
    "title".to_string()
}
pub(super) fn default_db_path() -> String {
    "~/.lexis/data/preferences.db".to_string()
}
pub(super) fn default_true() -> bool {
    true
}
