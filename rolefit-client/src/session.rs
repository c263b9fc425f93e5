//! Persisted session token
//!
//! The bearer token is the only piece of client state that outlives a
//! request. It is read before every call and cleared on logout or when the
//! backend answers 401. Three backends:
//! - [`FileTokenStore`]: `session.toml` next to the config file, key `token`
//! - [`KeyringTokenStore`]: OS keyring (Keychain / Credential Manager / Secret Service)
//! - [`MemoryTokenStore`]: process-local

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::SessionError;

/// Fixed key the token is stored under.
pub const TOKEN_KEY: &str = "token";
const KEYRING_SERVICE: &str = "rolefit";

pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, SessionError>;

    fn save(&self, token: &str) -> Result<(), SessionError>;

    /// Remove the token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), SessionError>;

    fn has_token(&self) -> bool {
        matches!(self.load(), Ok(Some(_)))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// Token persisted as TOML on disk.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn in_config_dir() -> Result<Self, SessionError> {
        let dir = crate::config::app_config_dir().ok_or(SessionError::NoConfigDir)?;
        Ok(Self::new(dir.join("session.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file: SessionFile = toml::from_str(&content)?;
        Ok(file.token.filter(|t| !t.is_empty()))
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = SessionFile {
            token: Some(token.to_string()),
        };
        std::fs::write(&self.path, toml::to_string(&file)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Token stored in the OS keyring.
#[derive(Debug, Clone, Default)]
pub struct KeyringTokenStore;

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self
    }

    fn entry() -> Result<keyring::Entry, SessionError> {
        Ok(keyring::Entry::new(KEYRING_SERVICE, TOKEN_KEY)?)
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        match Self::entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        Self::entry()?.set_password(token).map_err(Into::into)
    }

    fn clear(&self) -> Result<(), SessionError> {
        match Self::entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local token. Counts clears so callers can observe session resets.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
    clears: AtomicUsize,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
            clears: AtomicUsize::new(0),
        }
    }

    /// Number of times `clear` ran.
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::Relaxed)
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.token.lock().clone())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        *self.token.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.clears.fetch_add(1, Ordering::Relaxed);
        *self.token.lock() = None;
        Ok(())
    }
}
