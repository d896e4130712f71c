//! OS secret storage for credential passwords.
use crate::error::CredentialError;

/// Password storage keyed by `(service, account)`.
#[cfg_attr(test, mockall::automock)]
pub trait SecretStore {
    /// Stored secret for `(service, account)`, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::SecretStore`] if the backend fails.
    fn get(&self, service: &str, account: &str) -> Result<Option<String>, CredentialError>;

    /// Store `secret` for `(service, account)`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::SecretStore`] if the backend fails.
    fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), CredentialError>;
}

/// Secret storage backed by the platform keychain (macOS Keychain,
/// Secret Service on Linux, Credential Manager on Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringStore;

impl KeyringStore {
    fn entry(service: &str, account: &str) -> Result<keyring::Entry, CredentialError> {
        keyring::Entry::new(service, account).map_err(|e| CredentialError::SecretStore(e.to_string()))
    }
}

impl SecretStore for KeyringStore {
    fn get(&self, service: &str, account: &str) -> Result<Option<String>, CredentialError> {
        match Self::entry(service, account)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CredentialError::SecretStore(e.to_string())),
        }
    }

    fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), CredentialError> {
        Self::entry(service, account)?
            .set_password(secret)
            .map_err(|e| CredentialError::SecretStore(e.to_string()))
    }
}

/// Account name used for secret-storage lookups.
#[must_use]
pub fn current_user() -> String {
    whoami::username()
}
