//! Per-environment encrypted key/value store.
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use super::cipher;
use super::secret::{SecretStore, current_user};
use crate::error::CredentialError;
use crate::logging::Log;
use crate::paths::is_valid_name;
use crate::prompt::Prompt;
use crate::resources::helpers::fs;

/// Environment that always exists, even before its first write.
pub const MAIN_ENV: &str = "main";

const EXTENSION: &str = "enc";
const DIR_MODE: u32 = 0o700;
const FILE_MODE: u32 = 0o600;

/// Decrypted contents of one credential environment.
pub type Credentials = BTreeMap<String, String>;

/// Encrypted credential environments under one directory.
///
/// Each environment is a single `<env>.enc` file. Passwords come from the
/// OS secret storage when saved there, otherwise from the prompt, and are
/// cached for the lifetime of the store.
pub struct CredentialStore<'a> {
    dir: PathBuf,
    prefix: String,
    account: String,
    secrets: &'a dyn SecretStore,
    prompt: &'a dyn Prompt,
    log: &'a dyn Log,
    passwords: RefCell<HashMap<String, String>>,
}

impl fmt::Debug for CredentialStore<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("dir", &self.dir)
            .field("prefix", &self.prefix)
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl<'a> CredentialStore<'a> {
    /// Store rooted at `dir`, looking passwords up under `prefix + env`.
    pub fn new(
        dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        secrets: &'a dyn SecretStore,
        prompt: &'a dyn Prompt,
        log: &'a dyn Log,
    ) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            account: current_user(),
            secrets,
            prompt,
            log,
            passwords: RefCell::new(HashMap::new()),
        }
    }

    /// Use `account` instead of the current user for secret-storage lookups.
    #[must_use]
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    /// Directory holding the ciphertext files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ciphertext path for `env`.
    ///
    /// # Errors
    ///
    /// [`CredentialError::InvalidName`] unless `env` is letters, digits,
    /// `-` and `_`, so a name can never leave the store directory.
    pub fn path(&self, env: &str) -> Result<PathBuf, CredentialError> {
        if !is_valid_name(env) {
            return Err(CredentialError::InvalidName(env.to_string()));
        }
        Ok(self.dir.join(format!("{env}.{EXTENSION}")))
    }

    /// Create an empty environment.
    ///
    /// # Errors
    ///
    /// [`CredentialError::ReservedName`] for `main`,
    /// [`CredentialError::InvalidName`] for a malformed name,
    /// [`CredentialError::AlreadyExists`] when a ciphertext is present, or
    /// any error from obtaining the password or writing the file.
    pub fn create(&self, env: &str) -> Result<(), CredentialError> {
        if env == MAIN_ENV {
            return Err(CredentialError::ReservedName(env.to_string()));
        }
        if self.path(env)?.exists() {
            return Err(CredentialError::AlreadyExists(env.to_string()));
        }
        self.encrypt(env, &Credentials::new())?;
        self.log.info(&format!("created credential environment '{env}'"));
        Ok(())
    }

    /// Password for `env`.
    ///
    /// Looks in the cache, then secret storage, then asks. A typed password
    /// is saved to secret storage only when the user agrees.
    ///
    /// # Errors
    ///
    /// [`CredentialError::MissingArgument`] when no password is stored and
    /// nobody can be asked, or [`CredentialError::InvalidName`].
    pub fn password(&self, env: &str) -> Result<String, CredentialError> {
        let confirm = !self.path(env)?.exists();
        self.password_for(env, confirm)
    }

    fn password_for(&self, env: &str, confirm: bool) -> Result<String, CredentialError> {
        if let Some(cached) = self.passwords.borrow().get(env) {
            return Ok(cached.clone());
        }

        let service = format!("{}{env}", self.prefix);
        let stored = match self.secrets.get(&service, &self.account) {
            Ok(stored) => stored,
            Err(e) => {
                self.log.warn(&format!("{e}; falling back to prompt"));
                None
            }
        };

        let password = if let Some(password) = stored {
            self.log.debug(&format!("password for '{env}' from secret storage"));
            password
        } else {
            self.ask_password(env, &service, confirm)?
        };

        self.passwords
            .borrow_mut()
            .insert(env.to_string(), password.clone());
        Ok(password)
    }

    fn ask_password(
        &self,
        env: &str,
        service: &str,
        confirm: bool,
    ) -> Result<String, CredentialError> {
        if !self.prompt.is_interactive() {
            return Err(CredentialError::MissingArgument("password"));
        }
        let password = self
            .prompt
            .password(&format!("Password for credentials '{env}'"), confirm)
            .map_err(|_| CredentialError::MissingArgument("password"))?;

        let save = self
            .prompt
            .confirm("Save this password to the system keychain?", false)
            .unwrap_or(false);
        if save {
            match self.secrets.set(service, &self.account, &password) {
                Ok(()) => self.log.info(&format!("saved password for '{env}' to keychain")),
                Err(e) => self.log.warn(&e.to_string()),
            }
        }
        Ok(password)
    }

    /// Decrypted contents of `env`; empty when no ciphertext exists yet.
    ///
    /// # Errors
    ///
    /// [`CredentialError::DecryptionFailure`] for a wrong password or corrupt
    /// file, [`CredentialError::InvalidName`], or an I/O or password error.
    pub fn decrypt(&self, env: &str) -> Result<Credentials, CredentialError> {
        let path = self.path(env)?;
        if !path.exists() {
            return Ok(Credentials::new());
        }
        let armored = std::fs::read_to_string(&path).map_err(|source| CredentialError::Io {
            path: path.clone(),
            source,
        })?;
        let password = self.password_for(env, false)?;

        cipher::open(&password, &armored)
            .and_then(|plaintext| serde_json::from_slice(&plaintext).ok())
            .ok_or_else(|| {
                self.passwords.borrow_mut().remove(env);
                CredentialError::DecryptionFailure {
                    env: env.to_string(),
                }
            })
    }

    /// Replace the contents of `env` with `credentials`.
    ///
    /// # Errors
    ///
    /// Returns an error if the password cannot be obtained or the file
    /// cannot be written.
    pub fn encrypt(&self, env: &str, credentials: &Credentials) -> Result<(), CredentialError> {
        let path = self.path(env)?;
        let password = self.password_for(env, !path.exists())?;
        let plaintext = serde_json::to_vec(credentials)
            .map_err(|e| io_error(&path, io::Error::other(e.to_string())))?;
        let armored = cipher::seal(&password, &plaintext);

        self.ensure_dir()?;
        fs::write_atomic(&path, armored.as_bytes(), Some(FILE_MODE))
            .map_err(|e| io_error(&path, io::Error::other(format!("{e:#}"))))?;
        self.log
            .debug(&format!("wrote {} keys to {}", credentials.len(), path.display()));
        Ok(())
    }

    fn ensure_dir(&self) -> Result<(), CredentialError> {
        if !self.dir.is_dir() {
            std::fs::create_dir_all(&self.dir).map_err(|source| io_error(&self.dir, source))?;
        } else if let Some(mode) = fs::mode_of(&self.dir).filter(|m| m & 0o077 != 0) {
            self.log.warn(&format!(
                "{} had mode {mode:o}; restricting to {DIR_MODE:o}",
                self.dir.display()
            ));
        } else {
            return Ok(());
        }
        fs::set_mode(&self.dir, DIR_MODE)
            .map_err(|e| io_error(&self.dir, io::Error::other(format!("{e:#}"))))
    }

    /// Set `key` to `value` in `env`.
    ///
    /// # Errors
    ///
    /// Returns an error if `env` cannot be decrypted or written.
    pub fn add_key(&self, env: &str, key: &str, value: &str) -> Result<(), CredentialError> {
        let mut credentials = self.decrypt(env)?;
        credentials.insert(key.to_string(), value.to_string());
        self.encrypt(env, &credentials)
    }

    /// Delete `key` from `env`.
    ///
    /// # Errors
    ///
    /// [`CredentialError::KeyNotFound`] if absent, or a decrypt/write error.
    pub fn remove_key(&self, env: &str, key: &str) -> Result<(), CredentialError> {
        let mut credentials = self.decrypt(env)?;
        if credentials.remove(key).is_none() {
            return Err(not_found(key, env));
        }
        self.encrypt(env, &credentials)
    }

    /// Value of `key` in `env`.
    ///
    /// # Errors
    ///
    /// [`CredentialError::KeyNotFound`] if absent, or a decrypt error.
    pub fn get_key(&self, env: &str, key: &str) -> Result<String, CredentialError> {
        self.decrypt(env)?
            .remove(key)
            .ok_or_else(|| not_found(key, env))
    }

    /// Pairs to place in the caller's session: keys of `env` containing
    /// `filter` (all keys when `None`).
    ///
    /// # Errors
    ///
    /// Returns an error if `env` cannot be decrypted.
    pub fn load_into_environment(
        &self,
        env: &str,
        filter: Option<&str>,
    ) -> Result<Vec<(String, String)>, CredentialError> {
        let selected: Vec<_> = filtered(self.decrypt(env)?, filter).collect();
        self.log
            .debug(&format!("loaded {} keys from '{env}'", selected.len()));
        Ok(selected)
    }

    /// Write filtered `KEY=VALUE` lines of `env` to `path` with mode 0600.
    /// Returns the number of keys written.
    ///
    /// # Errors
    ///
    /// Returns an error if `env` cannot be decrypted or `path` written.
    pub fn export_to_file(
        &self,
        env: &str,
        path: &Path,
        filter: Option<&str>,
    ) -> Result<usize, CredentialError> {
        let mut body = String::new();
        let mut count = 0;
        for (key, value) in filtered(self.decrypt(env)?, filter) {
            body.push_str(&key);
            body.push('=');
            body.push_str(&value);
            body.push('\n');
            count += 1;
        }
        fs::ensure_parent_dir(path)
            .and_then(|()| fs::write_atomic(path, body.as_bytes(), Some(FILE_MODE)))
            .map_err(|e| io_error(path, io::Error::other(format!("{e:#}"))))?;
        self.log
            .info(&format!("exported {count} keys from '{env}' to {}", path.display()));
        Ok(count)
    }

    /// Merge filtered keys of `source` into `target`; `source` wins on
    /// conflicts. Returns the number of keys copied.
    ///
    /// # Errors
    ///
    /// Returns an error if either environment cannot be decrypted or the
    /// target cannot be written.
    pub fn copy_keys(
        &self,
        source: &str,
        target: &str,
        filter: Option<&str>,
    ) -> Result<usize, CredentialError> {
        let from = self.decrypt(source)?;
        let mut into = self.decrypt(target)?;
        let mut count = 0;
        for (key, value) in filtered(from, filter) {
            into.insert(key, value);
            count += 1;
        }
        self.encrypt(target, &into)?;
        self.log
            .info(&format!("copied {count} keys from '{source}' to '{target}'"));
        Ok(count)
    }

    /// `main` plus every environment with a ciphertext file, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub fn environments(&self) -> Result<Vec<String>, CredentialError> {
        let mut names = BTreeSet::from([MAIN_ENV.to_string()]);
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(names.into_iter().collect()),
            Err(source) => return Err(io_error(&self.dir, source)),
        };
        for entry in entries {
            let path = entry.map_err(|source| io_error(&self.dir, source))?.path();
            if path.extension().is_some_and(|ext| ext == EXTENSION)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && is_valid_name(stem)
            {
                names.insert(stem.to_string());
            }
        }
        Ok(names.into_iter().collect())
    }

    /// Key names of `env` with masked values.
    ///
    /// # Errors
    ///
    /// Returns an error if `env` cannot be decrypted.
    pub fn list(&self, env: &str) -> Result<Vec<(String, String)>, CredentialError> {
        Ok(self
            .decrypt(env)?
            .into_iter()
            .map(|(key, value)| (key, mask(&value)))
            .collect())
    }
}

fn filtered(
    credentials: Credentials,
    filter: Option<&str>,
) -> impl Iterator<Item = (String, String)> {
    let filter = filter.unwrap_or_default().to_string();
    credentials
        .into_iter()
        .filter(move |(key, _)| key.contains(filter.as_str()))
}

/// Short prefix of longer values, stars otherwise.
fn mask(value: &str) -> String {
    const SHOWN: usize = 4;
    if value.chars().count() <= SHOWN * 2 {
        return "*".repeat(8);
    }
    let head: String = value.chars().take(SHOWN).collect();
    format!("{head}****")
}

fn not_found(key: &str, env: &str) -> CredentialError {
    CredentialError::KeyNotFound {
        key: key.to_string(),
        env: env.to_string(),
    }
}

fn io_error(path: &Path, source: io::Error) -> CredentialError {
    CredentialError::Io {
        path: path.to_path_buf(),
        source,
    }
}
