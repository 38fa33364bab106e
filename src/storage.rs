//! Local key-value persistence for the session.
//!
//! Two keys are used: `installed_role` holds the role the session boots into
//! and `registered_users` holds the whole roster as JSON, rewritten in full on
//! every save.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::engine::roster::Roster;
use crate::error::AppError;
use crate::models::profile::Role;

pub const INSTALLED_ROLE_KEY: &str = "installed_role";
pub const REGISTERED_USERS_KEY: &str = "registered_users";

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), AppError>;
    fn clear(&mut self) -> Result<(), AppError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), AppError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), AppError> {
        self.entries.clear();
        Ok(())
    }
}

/// JSON object on disk, loaded once and rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|err| {
                AppError::Storage(format!("{} is not a valid store: {err}", path.display()))
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(AppError::Storage(format!(
                    "failed to read {}: {err}",
                    path.display()
                )));
            }
        };

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), AppError> {
        let raw = serde_json::to_string_pretty(&self.entries)
            .map_err(|err| AppError::Storage(format!("failed to encode store: {err}")))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)
            .and_then(|()| fs::rename(&tmp, &self.path))
            .map_err(|err| {
                AppError::Storage(format!("failed to write {}: {err}", self.path.display()))
            })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), AppError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn clear(&mut self) -> Result<(), AppError> {
        self.entries.clear();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::Storage(format!(
                "failed to remove {}: {err}",
                self.path.display()
            ))),
        }
    }
}

pub fn load_role(store: &dyn KeyValueStore) -> Option<Role> {
    let raw = store.get(INSTALLED_ROLE_KEY)?;
    match serde_json::from_value(serde_json::Value::String(raw.clone())) {
        Ok(role) => Some(role),
        Err(err) => {
            warn!(value = %raw, error = %err, "ignoring unknown installed role");
            None
        }
    }
}

pub fn save_role(store: &mut dyn KeyValueStore, role: Role) -> Result<(), AppError> {
    store.set(INSTALLED_ROLE_KEY, role.to_string())
}

/// The persisted roster, or the demo roster when nothing usable is stored.
pub fn load_roster(store: &dyn KeyValueStore) -> Roster {
    let Some(raw) = store.get(REGISTERED_USERS_KEY) else {
        return Roster::seeded();
    };

    match serde_json::from_str(&raw) {
        Ok(roster) => roster,
        Err(err) => {
            warn!(error = %err, "persisted roster is unreadable; seeding demo couriers");
            Roster::seeded()
        }
    }
}

pub fn save_roster(store: &mut dyn KeyValueStore, roster: &Roster) -> Result<(), AppError> {
    let raw = serde_json::to_string(roster)
        .map_err(|err| AppError::Storage(format!("failed to encode roster: {err}")))?;
    store.set(REGISTERED_USERS_KEY, raw)
}
