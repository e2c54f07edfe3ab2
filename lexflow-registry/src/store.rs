//! Encrypted on-disk persistence of the registry.
//!
//! Two artifacts live side by side:
//! - the registry blob: `nonce(12) || AES-256-GCM(ciphertext || tag)` of the
//!   pretty-printed JSON entry array
//! - the salt: 32 raw bytes, unencrypted, created on the first save
//!
//! Every save derives the key, draws a fresh nonce and replaces the blob
//! atomically.

use crate::entry::RegistryEntry;
use crate::error::{RegistryError, RegistryResult};
use lexflow_crypto::{derive_key, open, seal, CryptoError, KdfParams, RegistryKey, Salt};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name of the encrypted registry blob.
pub const REGISTRY_FILE_NAME: &str = ".lexflow-issued-keys.enc";

/// File name of the registry salt.
pub const SALT_FILE_NAME: &str = ".lexflow-registry-salt";

/// Minimum length, in characters, of a new registry password.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Handle to the registry artifacts in one directory.
///
/// Holds no file handles and no decrypted state between calls.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    registry_path: PathBuf,
    salt_path: PathBuf,
    kdf_params: KdfParams,
}

impl RegistryStore {
    /// Store using the standard artifact names inside `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::with_paths(dir.join(REGISTRY_FILE_NAME), dir.join(SALT_FILE_NAME))
    }

    /// Store with explicit artifact paths.
    pub fn with_paths(registry_path: impl Into<PathBuf>, salt_path: impl Into<PathBuf>) -> Self {
        Self {
            registry_path: registry_path.into(),
            salt_path: salt_path.into(),
            kdf_params: KdfParams::default(),
        }
    }

    /// Overrides the scrypt parameters.
    ///
    /// A registry can only be opened with the parameters it was saved with.
    #[must_use]
    pub fn with_kdf_params(mut self, kdf_params: KdfParams) -> Self {
        self.kdf_params = kdf_params;
        self
    }

    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }

    pub fn salt_path(&self) -> &Path {
        &self.salt_path
    }

    /// Whether a registry blob is present.
    pub fn exists(&self) -> bool {
        self.registry_path.exists()
    }

    /// Decrypts and returns all entries.
    ///
    /// A missing registry blob is the first-run case and yields no entries.
    ///
    /// # Errors
    ///
    /// - `Corrupt` if the blob exists without a salt, the salt has the
    ///   wrong length, the blob is truncated, or the decrypted JSON is invalid
    /// - `AuthFailure` if authenticated decryption fails
    pub fn open(&self, password: &str) -> RegistryResult<Vec<RegistryEntry>> {
        if !self.exists() {
            debug!(path = %self.registry_path.display(), "no registry yet, starting empty");
            return Ok(Vec::new());
        }

        let salt = self.read_salt()?.ok_or_else(|| self.missing_salt())?;

        let key = self.derive(password, &salt)?;
        let blob = fs::read(&self.registry_path)?;

        let plaintext = open(&key, &blob).map_err(|e| match e {
            CryptoError::Truncated { min, actual } => RegistryError::Corrupt(format!(
                "registry blob is {actual} bytes, need at least {min}"
            )),
            CryptoError::Unauthentic => {
                warn!(path = %self.registry_path.display(), "registry decryption failed");
                RegistryError::AuthFailure
            }
            other => RegistryError::Crypto(other),
        })?;

        let entries: Vec<RegistryEntry> = serde_json::from_slice(&plaintext)
            .map_err(|e| RegistryError::Corrupt(format!("invalid registry JSON: {e}")))?;

        debug!(entries = entries.len(), "registry opened");
        Ok(entries)
    }

    /// Encrypts `entries` under a fresh nonce and atomically replaces the blob.
    ///
    /// Creates the salt on the first save, which is also when the password
    /// policy applies. An existing blob is never re-keyed under a new salt.
    ///
    /// # Errors
    ///
    /// - `PasswordTooShort` when creating a registry with a short password
    /// - `Corrupt` if an existing salt has the wrong length, or the blob
    ///   exists without a salt (the blob is left untouched)
    pub fn save(&self, password: &str, entries: &[RegistryEntry]) -> RegistryResult<()> {
        let salt = match self.read_salt()? {
            Some(salt) => salt,
            None if self.exists() => return Err(self.missing_salt()),
            None => self.create_salt(password)?,
        };

        let key = self.derive(password, &salt)?;
        let plaintext = serde_json::to_vec_pretty(entries)?;
        let blob = seal(&key, &plaintext)?;

        write_atomic(&self.registry_path, &blob)?;
        info!(entries = entries.len(), path = %self.registry_path.display(), "registry saved");
        Ok(())
    }

    fn derive(&self, password: &str, salt: &Salt) -> RegistryResult<RegistryKey> {
        Ok(derive_key(password, salt, &self.kdf_params)?)
    }

    fn read_salt(&self) -> RegistryResult<Option<Salt>> {
        let bytes = match fs::read(&self.salt_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Salt::from_slice(&bytes)
            .map(Some)
            .map_err(|e| RegistryError::Corrupt(format!("salt {}: {e}", self.salt_path.display())))
    }

    fn missing_salt(&self) -> RegistryError {
        RegistryError::Corrupt(format!(
            "salt {} missing while registry exists",
            self.salt_path.display()
        ))
    }

    fn create_salt(&self, password: &str) -> RegistryResult<Salt> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RegistryError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        let salt = Salt::random();
        write_atomic(&self.salt_path, salt.as_bytes())?;
        info!(path = %self.salt_path.display(), "created registry salt");
        Ok(salt)
    }
}

/// Writes `data` to `path` via a synced temporary file and a rename.
fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp_path, path)
}
