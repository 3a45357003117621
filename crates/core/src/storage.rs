//! Credential storage
//!
//! Tokens live in a small key/value store under fixed keys. The access
//! token's presence is what the HTTP client checks before attaching
//! authorization, so every read goes to the store instead of a cached copy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::config::AuthConfig;
use crate::error::{CoreError, CoreResult};

/// Keys understood by a [`CredentialStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StorageKey {
    #[serde(rename = "accessToken")]
    AccessToken,
    #[serde(rename = "refreshToken")]
    RefreshToken,
    /// Post-login target kept across the OAuth round trip
    #[serde(rename = "redirect_after_login")]
    RedirectAfterLogin,
}

impl StorageKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => AuthConfig::ACCESS_TOKEN_KEY,
            Self::RefreshToken => AuthConfig::REFRESH_TOKEN_KEY,
            Self::RedirectAfterLogin => AuthConfig::REDIRECT_AFTER_LOGIN_KEY,
        }
    }
}

/// Access token plus the optional refresh token issued with it
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Key/value storage for credentials
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: StorageKey) -> CoreResult<Option<String>>;

    fn set(&self, key: StorageKey, value: &str) -> CoreResult<()>;

    fn remove(&self, key: StorageKey) -> CoreResult<()>;

    fn access_token(&self) -> CoreResult<Option<String>> {
        self.get(StorageKey::AccessToken)
    }

    fn refresh_token(&self) -> CoreResult<Option<String>> {
        self.get(StorageKey::RefreshToken)
    }

    /// Persist a freshly issued pair. A pair without a refresh token leaves
    /// any stored refresh token untouched.
    fn store_credentials(&self, pair: &CredentialPair) -> CoreResult<()> {
        self.set(StorageKey::AccessToken, &pair.access_token)?;
        if let Some(refresh) = &pair.refresh_token {
            self.set(StorageKey::RefreshToken, refresh)?;
        }
        Ok(())
    }

    /// Remove both tokens
    fn clear_credentials(&self) -> CoreResult<()> {
        self.remove(StorageKey::AccessToken)?;
        self.remove(StorageKey::RefreshToken)
    }

    /// Read and remove the stored post-login target
    fn take_redirect(&self) -> CoreResult<Option<String>> {
        let value = self.get(StorageKey::RedirectAfterLogin)?;
        if value.is_some() {
            self.remove(StorageKey::RedirectAfterLogin)?;
        }
        Ok(value)
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<BTreeMap<StorageKey, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a credential pair
    pub fn with_credentials(pair: &CredentialPair) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(StorageKey::AccessToken, pair.access_token.clone());
        if let Some(refresh) = &pair.refresh_token {
            entries.insert(StorageKey::RefreshToken, refresh.clone());
        }
        Self {
            entries: Mutex::new(entries),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<StorageKey, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: StorageKey) -> CoreResult<Option<String>> {
        Ok(self.lock().get(&key).cloned())
    }

    fn set(&self, key: StorageKey, value: &str) -> CoreResult<()> {
        self.lock().insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> CoreResult<()> {
        self.lock().remove(&key);
        Ok(())
    }
}

/// JSON file store that survives between console invocations.
///
/// Every mutation is written through immediately. On Unix the file is
/// readable by the owner only.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<StorageKey, String>>,
}

impl FileCredentialStore {
    /// Open the store at `path`, loading existing entries if the file exists
    pub fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            debug!("Loading credentials from {}", path.display());
            let raw = fs::read_to_string(&path).map_err(|e| CoreError::io("read", &path, &e))?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw).map_err(|e| CoreError::corrupt(&path, &e))?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<StorageKey, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the file with `entries`. The new content is staged in a
    /// sibling file and renamed over the old one.
    fn persist(&self, entries: &BTreeMap<StorageKey, String>) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CoreError::io("create directory", parent, &e))?;
        }

        let json = serde_json::to_vec_pretty(entries).map_err(|e| CoreError::Storage {
            message: format!("Failed to encode credentials: {e}"),
        })?;
        let staging = self.path.with_extension("json.tmp");
        write_owner_only(&staging, &json).map_err(|e| CoreError::io("write", &staging, &e))?;
        fs::rename(&staging, &self.path).map_err(|e| CoreError::io("replace", &self.path, &e))
    }

    /// Apply `change` to a copy of the entries; memory is only updated once
    /// the file holds the new state
    fn update(&self, change: impl FnOnce(&mut BTreeMap<StorageKey, String>)) -> CoreResult<()> {
        let mut entries = self.lock();
        let mut next = entries.clone();
        change(&mut next);
        if next == *entries {
            return Ok(());
        }
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

/// Write `contents` to a file that is never readable by other users, not
/// even while it is being written
fn write_owner_only(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    // `mode` only applies on creation; a leftover staging file keeps its bits
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents)?;
    file.sync_all()
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: StorageKey) -> CoreResult<Option<String>> {
        Ok(self.lock().get(&key).cloned())
    }

    fn set(&self, key: StorageKey, value: &str) -> CoreResult<()> {
        self.update(|entries| {
            entries.insert(key, value.to_string());
        })
    }

    fn remove(&self, key: StorageKey) -> CoreResult<()> {
        self.update(|entries| {
            entries.remove(&key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pair() -> CredentialPair {
        CredentialPair {
            access_token: "access-1".to_string(),
            refresh_token: Some("refresh-1".to_string()),
        }
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryCredentialStore::new();
        store.store_credentials(&pair()).unwrap();
        assert_eq!(store.access_token().unwrap().as_deref(), Some("access-1"));
        assert_eq!(store.refresh_token().unwrap().as_deref(), Some("refresh-1"));

        store.clear_credentials().unwrap();
        assert!(store.access_token().unwrap().is_none());
        assert!(store.refresh_token().unwrap().is_none());
    }

    #[test]
    fn test_pair_without_refresh_keeps_existing_refresh() {
        let store = MemoryCredentialStore::with_credentials(&pair());
        store
            .store_credentials(&CredentialPair {
                access_token: "access-2".to_string(),
                refresh_token: None,
            })
            .unwrap();
        assert_eq!(store.access_token().unwrap().as_deref(), Some("access-2"));
        assert_eq!(store.refresh_token().unwrap().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_take_redirect_consumes_value() {
        let store = MemoryCredentialStore::new();
        store
            .set(StorageKey::RedirectAfterLogin, "/dashboard/users")
            .unwrap();
        assert_eq!(
            store.take_redirect().unwrap().as_deref(),
            Some("/dashboard/users")
        );
        assert!(store.take_redirect().unwrap().is_none());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("credentials.json");

        let store = FileCredentialStore::open(&path).unwrap();
        store.store_credentials(&pair()).unwrap();
        assert!(path.exists());

        let reopened = FileCredentialStore::open(&path).unwrap();
        assert_eq!(reopened.access_token().unwrap().as_deref(), Some("access-1"));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("accessToken"));
        assert!(raw.contains("refreshToken"));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        let store = FileCredentialStore::open(&path).unwrap();
        store.set(StorageKey::AccessToken, "secret").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        fs::write(&path, "not json").unwrap();

        let err = FileCredentialStore::open(&path).unwrap_err();
        assert!(matches!(err, CoreError::CorruptStore { .. }));
    }

    #[test]
    fn test_failed_write_leaves_memory_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let store_dir = temp_dir.path().join("state");
        let store = FileCredentialStore::open(store_dir.join("credentials.json")).unwrap();
        // A plain file where the directory should be makes every write fail
        fs::write(&store_dir, "").unwrap();

        let err = store.set(StorageKey::AccessToken, "never-written").unwrap_err();
        assert!(matches!(err, CoreError::Storage { .. }));
        assert!(store.access_token().unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_rewrite_tightens_loose_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileCredentialStore::open(&path).unwrap();
        store.set(StorageKey::AccessToken, "secret").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let rendered = format!("{:?}", pair());
        assert!(!rendered.contains("access-1"));
        assert!(!rendered.contains("refresh-1"));
    }
}
