//! Configuration stores
//!
//! The controller only ever reads profiles. Writers (settings screens, the
//! CLI fixtures) go through the store-specific methods and then notify the
//! controller with a `ConfigurationChanged` event.

use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use super::params::ProfileValues;
use crate::error::{Result, SessionFxError};

/// File name prefix used by `JsonFileStore`
pub const DEFAULT_BASENAME: &str = "sessionfx";

/// Read access to stored profiles keyed by profile name
pub trait ConfigurationStore: Send + Sync {
    /// Fetch all values stored for `profile`
    ///
    /// Returns `ConfigurationMissing` when nothing is stored for the profile.
    fn get(&self, profile: &str) -> Result<ProfileValues>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    profiles: RwLock<HashMap<String, ProfileValues>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one value, creating the profile if needed
    pub fn set(&self, profile: &str, key: &str, value: impl Into<Value>) {
        let mut profiles = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
        profiles
            .entry(profile.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    /// Drop a profile, returning its values
    pub fn remove_profile(&self, profile: &str) -> Option<ProfileValues> {
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(profile)
    }
}

impl ConfigurationStore for MemoryStore {
    fn get(&self, profile: &str) -> Result<ProfileValues> {
        self.profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(profile)
            .cloned()
            .ok_or_else(|| SessionFxError::ConfigurationMissing {
                profile: profile.to_string(),
            })
    }
}

/// Directory of JSON objects, one file per profile: `<basename>.<profile>.json`
///
/// Files are read on every `get`, so edits take effect on the next resync.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
    basename: String,
}

impl JsonFileStore {
    pub fn new(dir: &Path) -> Self {
        Self::with_basename(dir, DEFAULT_BASENAME)
    }

    pub fn with_basename(dir: &Path, basename: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            basename: basename.to_string(),
        }
    }

    /// Path of the file holding `profile`
    pub fn profile_path(&self, profile: &str) -> PathBuf {
        self.dir.join(format!("{}.{}.json", self.basename, profile))
    }

    /// Write a profile to disk, creating the directory if needed
    pub fn save(&self, profile: &str, values: &ProfileValues) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| SessionFxError::FileWriteError {
                path: self.dir.clone(),
                source: e,
            })?;
        }

        let path = self.profile_path(profile);
        let content = serde_json::to_string_pretty(values)?;
        fs::write(&path, content).map_err(|e| SessionFxError::FileWriteError { path, source: e })
    }
}

impl ConfigurationStore for JsonFileStore {
    fn get(&self, profile: &str) -> Result<ProfileValues> {
        let path = self.profile_path(profile);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SessionFxError::ConfigurationMissing {
                    profile: profile.to_string(),
                })
            }
            Err(e) => return Err(SessionFxError::FileReadError { path, source: e }),
        };

        debug!("Loaded profile '{}' from {}", profile, path.display());
        let values: ProfileValues = serde_json::from_str(&content)?;
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_set_and_get() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get("speaker"),
            Err(SessionFxError::ConfigurationMissing { .. })
        ));

        store.set("speaker", "dsp.bass.mode", "300");
        store.set("speaker", "dsp.bass.enable", true);
        let values = store.get("speaker").unwrap();
        assert_eq!(values["dsp.bass.mode"], json!("300"));
        assert_eq!(values["dsp.bass.enable"], json!(true));

        assert!(store.remove_profile("speaker").is_some());
        assert!(store.get("speaker").is_err());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());

        let mut values = ProfileValues::new();
        values.insert("dsp.tone.eq.custom".to_string(), json!("1;2;3;4;5"));
        store.save("headset", &values).unwrap();

        assert!(store.profile_path("headset").ends_with("sessionfx.headset.json"));
        assert_eq!(store.get("headset").unwrap(), values);
    }

    #[test]
    fn test_file_store_missing_profile() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        let err = store.get("bluetooth").unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_MISSING");
    }

    #[test]
    fn test_file_store_rejects_bad_json() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        fs::write(store.profile_path("speaker"), "{ not json").unwrap();

        let err = store.get("speaker").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
