use crate::error::{PhonebookError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const PHONEBOOK_DIR: &str = ".phonebook";
pub const STORAGE_DIR: &str = ".phonebook/storage";
pub const CONFIG_FILE: &str = ".phonebook/config.yaml";

/// Key under which the contact list is stored unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "phoneBook";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn phonebook_dir(root: &Path) -> PathBuf {
    root.join(PHONEBOOK_DIR)
}

pub fn storage_dir(root: &Path) -> PathBuf {
    root.join(STORAGE_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn storage_file(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

pub fn is_initialized(root: &Path) -> bool {
    phonebook_dir(root).is_dir()
}

pub fn ensure_initialized(root: &Path) -> Result<()> {
    if !is_initialized(root) {
        return Err(PhonebookError::NotInitialized);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Key validation
// ---------------------------------------------------------------------------

static KEY_RE: OnceLock<Regex> = OnceLock::new();

fn key_re() -> &'static Regex {
    KEY_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_\-]*$").unwrap())
}

/// Storage keys become file names, so they are restricted to a safe charset.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.len() > 64 || !key_re().is_match(key) {
        return Err(PhonebookError::InvalidKey(key.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
