use crate::env;
use crate::error::{AquaError, Result};
use crate::lock::StoreLock;
use crate::record::{ProfileRecord, validate_profile_name};
use crate::suggest::profile_hint;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

pub const STORE_FILE_NAME: &str = "profiles.toml";

/// Mode bits refused on the store file, which holds secrets.
const FILE_DENIED_MODE: u32 = 0o077;

/// Mode bits refused on the config directory. Write access for anyone else
/// would let them replace the store file.
const DIR_DENIED_MODE: u32 = 0o022;

/// On-disk layout of the profile store.
///
/// The default is a single marker rather than a per-record flag, so two
/// defaults cannot be expressed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoreFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    profiles: IndexMap<String, ProfileRecord>,
}

/// A stored profile together with its default status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub record: ProfileRecord,
    pub is_default: bool,
}

/// Handle to the per-user profile store.
///
/// Constructed once at startup and passed to whatever needs it.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
    lock_timeout: Duration,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_lock_timeout(dir, env::lock_timeout())
    }

    pub fn with_lock_timeout(dir: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STORE_FILE_NAME)
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(format!("{}.lock", STORE_FILE_NAME))
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Look up a profile by name.
    pub fn get(&self, name: &str) -> Result<Profile> {
        let state = self.load()?;
        match state.profiles.get(name) {
            Some(record) => Ok(Profile {
                name: name.to_string(),
                record: record.clone(),
                is_default: state.default.as_deref() == Some(name),
            }),
            None => Err(not_found(name, &state)),
        }
    }

    /// Snapshot of every profile in insertion order.
    ///
    /// Each call re-reads the store, so the returned iterator reflects the
    /// state at call time.
    pub fn list(&self) -> Result<impl Iterator<Item = Profile> + use<>> {
        let StoreFile { default, profiles } = self.load()?;
        Ok(profiles.into_iter().map(move |(name, record)| Profile {
            is_default: default.as_deref() == Some(name.as_str()),
            name,
            record,
        }))
    }

    pub fn get_default(&self) -> Result<Profile> {
        let state = self.load()?;
        let name = state.default.ok_or(AquaError::NoDefaultProfile)?;
        let record = state
            .profiles
            .get(&name)
            .cloned()
            .ok_or(AquaError::NoDefaultProfile)?;
        Ok(Profile {
            name,
            record,
            is_default: true,
        })
    }

    pub fn has_default(&self) -> Result<bool> {
        Ok(self.load()?.default.is_some())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.load()?.profiles.is_empty())
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    pub fn create(&self, name: &str, record: ProfileRecord) -> Result<()> {
        validate_profile_name(name)?;
        record.validate()?;

        self.mutate(|state| {
            if state.profiles.contains_key(name) {
                return Err(AquaError::DuplicateProfile {
                    profile: name.to_string(),
                });
            }
            state.profiles.insert(name.to_string(), record);
            Ok(())
        })?;

        tracing::debug!("Created profile '{}'", name);
        Ok(())
    }

    /// Replace an existing profile's record, keeping its position and
    /// default status.
    pub fn update(&self, name: &str, record: ProfileRecord) -> Result<()> {
        record.validate()?;

        self.mutate(|state| match state.profiles.get_mut(name) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(not_found(name, state)),
        })?;

        tracing::debug!("Updated profile '{}'", name);
        Ok(())
    }

    /// Remove a profile. Deleting the default leaves the store without one.
    ///
    /// Returns whether the removed profile was the default, as seen under the
    /// lock.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let cleared_default = self.mutate(|state| {
            if state.profiles.shift_remove(name).is_none() {
                return Err(not_found(name, state));
            }
            let was_default = state.default.as_deref() == Some(name);
            if was_default {
                tracing::debug!("Deleted profile '{}' was the default; clearing it", name);
                state.default = None;
            }
            Ok(was_default)
        })?;

        tracing::debug!("Deleted profile '{}'", name);
        Ok(cleared_default)
    }

    pub fn set_default(&self, name: &str) -> Result<()> {
        self.mutate(|state| {
            if !state.profiles.contains_key(name) {
                return Err(not_found(name, state));
            }
            state.default = Some(name.to_string());
            Ok(())
        })?;

        tracing::debug!("Default profile is now '{}'", name);
        Ok(())
    }

    /// Run `f` against the current state under the store lock and commit the
    /// result. Nothing is written when `f` fails.
    fn mutate<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut StoreFile) -> Result<T>,
    {
        self.ensure_dir()?;
        let _lock = StoreLock::acquire(&self.lock_path(), self.lock_timeout)?;

        let mut state = self.load()?;
        let value = f(&mut state)?;
        self.commit(&state)?;
        Ok(value)
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    fn load(&self) -> Result<StoreFile> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::trace!("No profile store at {}", path.display());
                return Ok(StoreFile::default());
            }
            Err(e) => return Err(AquaError::store_io(&path, e)),
        };
        check_mode(&path, FILE_DENIED_MODE)?;
        check_mode(&self.dir, DIR_DENIED_MODE)?;

        let mut state = parse(&content).map_err(|source| AquaError::StoreCorrupted {
            path: path.clone(),
            source,
        })?;

        for name in state.profiles.keys() {
            if validate_profile_name(name).is_err() {
                return Err(AquaError::validation(format!(
                    "store {} contains invalid profile name '{}'",
                    path.display(),
                    name.escape_default()
                )));
            }
        }

        if let Some(default) = &state.default
            && !state.profiles.contains_key(default)
        {
            tracing::warn!(
                "Default profile '{}' does not exist in {}; ignoring it",
                default,
                path.display()
            );
            state.default = None;
        }

        Ok(state)
    }

    fn commit(&self, state: &StoreFile) -> Result<()> {
        let path = self.path();
        let content = serialize(state)?;

        let mut temp_file =
            NamedTempFile::new_in(&self.dir).map_err(|e| AquaError::store_io(&self.dir, e))?;

        #[cfg(unix)]
        fs::set_permissions(temp_file.path(), fs::Permissions::from_mode(0o600)).map_err(|e| {
            AquaError::Permission {
                path: temp_file.path().to_path_buf(),
                details: format!("Failed to restrict temporary file permissions: {}", e),
            }
        })?;

        temp_file
            .write_all(content.as_bytes())
            .and_then(|_| temp_file.flush())
            .and_then(|_| temp_file.as_file().sync_all())
            .map_err(|e| AquaError::store_io(temp_file.path(), e))?;

        temp_file
            .persist(&path)
            .map_err(|e| AquaError::store_io(&path, e.error))?;

        tracing::debug!(
            "Wrote {} profile(s) to {}",
            state.profiles.len(),
            path.display()
        );
        Ok(())
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            let mut builder = fs::DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::DirBuilderExt;
                builder.mode(0o700);
            }
            builder
                .create(&self.dir)
                .map_err(|e| AquaError::store_io(&self.dir, e))?;
            tracing::debug!("Created config directory {}", self.dir.display());
        }
        check_mode(&self.dir, DIR_DENIED_MODE)
    }
}

fn parse(content: &str) -> std::result::Result<StoreFile, toml_edit::de::Error> {
    toml_edit::de::from_str(content)
}

fn serialize(state: &StoreFile) -> Result<String> {
    Ok(toml_edit::ser::to_string_pretty(state)?)
}

/// Refuse a path whose mode has any of the `denied` bits set. Permissions are
/// never changed here.
#[cfg(unix)]
fn check_mode(path: &Path, denied: u32) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|e| AquaError::store_io(path, e))?;
    let mode = metadata.permissions().mode() & 0o777;
    if mode & denied != 0 {
        return Err(AquaError::Permission {
            path: path.to_path_buf(),
            details: format!(
                "Mode is {:o}; bits {:o} must not be set",
                mode,
                mode & denied
            ),
        });
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_mode(_path: &Path, _denied: u32) -> Result<()> {
    Ok(())
}

fn not_found(name: &str, state: &StoreFile) -> AquaError {
    AquaError::ProfileNotFound {
        profile: name.to_string(),
        suggestion: profile_hint(name, state.profiles.keys()),
        available_profiles: state.profiles.keys().cloned().collect(),
    }
}
