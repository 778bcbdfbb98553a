//! Local persistence of the last authenticated session, one JSON file per app
//! client id. The file holds bearer tokens, so it is created owner-only on unix and
//! its contents are never logged.

use crate::error::AuthError;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::debug;

/// Tokens are treated as expired this many seconds early to absorb clock drift.
pub const EXPIRY_LEEWAY_SECS: u64 = 30;

/// Tokens of the last signed-in user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub username: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix seconds.
    pub expires_at: u64,
}

impl StoredSession {
    #[must_use]
    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_add(EXPIRY_LEEWAY_SECS) >= self.expires_at
    }
}

impl fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredSession")
            .field("username", &self.username)
            .field("access_token", &"REDACTED")
            .field("id_token", &self.id_token.as_ref().map(|_| "REDACTED"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "REDACTED"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Current time in unix seconds.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

#[derive(Clone, Debug)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    #[must_use]
    pub fn new(dir: &Path, client_id: &str) -> Self {
        Self {
            path: dir.join(format!("{client_id}.json")),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// # Errors
    /// Returns `AuthError::Store` if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Option<StoredSession>, AuthError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(store_error(&self.path, &err)),
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| store_error(&self.path, &err))
    }

    /// # Errors
    /// Returns `AuthError::Store` if the directory or file cannot be written.
    pub fn save(&self, session: &StoredSession) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| store_error(parent, &err))?;
        }

        let payload =
            serde_json::to_vec_pretty(session).map_err(|err| store_error(&self.path, &err))?;

        let mut file = open_private(&self.path).map_err(|err| store_error(&self.path, &err))?;
        file.write_all(&payload)
            .map_err(|err| store_error(&self.path, &err))?;

        debug!("stored session for {}", session.username);

        Ok(())
    }

    /// Removes the stored session; a missing file is not an error.
    ///
    /// # Errors
    /// Returns `AuthError::Store` if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(store_error(&self.path, &err)),
        }
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

fn store_error(path: &Path, err: &dyn fmt::Display) -> AuthError {
    AuthError::Store(format!("{}: {err}", path.display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn session(expires_at: u64) -> StoredSession {
        StoredSession {
            username: "a@b.com".to_string(),
            access_token: "access".to_string(),
            id_token: Some("id".to_string()),
            refresh_token: Some("refresh".to_string()),
            expires_at,
        }
    }

    #[test]
    fn load_without_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path(), "client");
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_then_load_returns_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(&dir.path().join("nested"), "client");
        store.save(&session(100)).unwrap();
        assert_eq!(store.load().unwrap(), Some(session(100)));
        assert!(store.path().ends_with("nested/client.json"));
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path(), "client");
        store.save(&session(100)).unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path(), "client");
        store.save(&session(100)).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path(), "client");
        fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.load(), Err(AuthError::Store(_))));
    }

    #[test]
    fn expiry_applies_leeway() {
        let stored = session(1_000);
        assert!(!stored.is_expired(1_000 - EXPIRY_LEEWAY_SECS - 1));
        assert!(stored.is_expired(1_000 - EXPIRY_LEEWAY_SECS));
        assert!(stored.is_expired(2_000));
    }

    #[test]
    fn debug_redacts_tokens() {
        let rendered = format!("{:?}", session(1));
        assert!(!rendered.contains("access\""));
        assert!(!rendered.contains("refresh\""));
        assert!(rendered.contains("REDACTED"));
    }
}
