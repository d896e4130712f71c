//! Domain-specific error types for the workstation engine.
//!
//! Internal modules return typed errors (e.g., [`RegistryError`],
//! [`CredentialError`]) while command handlers at the CLI boundary convert
//! them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error types
//!
//! ```text
//! RegistryError     : registry lookup and parsing
//! EntryError        : a single config entry failed to apply
//! CredentialError   : encrypted credential store
//! EnvironmentError  : development environment registry
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise while locating and parsing registry documents.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// No registry document with this name exists in the registry directory.
    #[error("registry '{name}' not found in {}", .dir.display())]
    NotFound {
        /// Requested registry name.
        name: String,
        /// Directory that was searched.
        dir: PathBuf,
    },

    /// The registry document exists but cannot be parsed.
    #[error("invalid registry document {}: {message}", .path.display())]
    Parse {
        /// Path of the malformed document.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// An I/O error occurred while reading the registry directory or a document.
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that fail a single config entry without aborting the registry.
#[derive(Error, Debug)]
pub enum EntryError {
    /// The entry's source artifact does not exist.
    #[error("source missing: {}", .path.display())]
    SourceMissing {
        /// Resolved source path.
        path: PathBuf,
    },

    /// The target path references variables that are not defined (strict mode only).
    #[error("unresolved variable(s) in target '{target}': {}", .names.join(", "))]
    UnresolvedVariable {
        /// Target as written in the registry.
        target: String,
        /// Names of the undefined variables.
        names: Vec<String>,
    },

    /// The source exists but cannot be used with the entry's strategy.
    #[error("invalid source {}: {reason}", .path.display())]
    InvalidSource {
        /// Resolved source path.
        path: PathBuf,
        /// Why the source is unusable.
        reason: String,
    },

    /// Backing up the existing target failed; the destructive step was not run.
    #[error("backup of {} failed: {source}", .path.display())]
    Backup {
        /// Path that was being backed up.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Applying the strategy failed after any backup was taken.
    #[error("apply failed: {reason}")]
    Apply {
        /// Human-readable failure chain.
        reason: String,
    },
}

/// Errors that arise from the encrypted credential store.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// The environment name does not match `^[A-Za-z0-9_-]+$`.
    #[error("invalid credential environment name '{0}': use letters, digits, '-' and '_' only")]
    InvalidName(String),

    /// The environment name is reserved and always exists.
    #[error("environment '{0}' is reserved and already exists")]
    ReservedName(String),

    /// An encrypted store already exists for this environment.
    #[error("environment '{0}' already exists")]
    AlreadyExists(String),

    /// The key is not present in the environment.
    #[error("key '{key}' not found in environment '{env}'")]
    KeyNotFound {
        /// Requested key.
        key: String,
        /// Environment that was searched.
        env: String,
    },

    /// The ciphertext could not be decrypted (wrong password or corruption).
    #[error("cannot decrypt environment '{env}': wrong password or corrupt file")]
    DecryptionFailure {
        /// Environment whose ciphertext failed to decrypt.
        env: String,
    },

    /// A required argument was not supplied and no prompt is available.
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    /// The OS secret storage reported an error.
    #[error("secret storage error: {0}")]
    SecretStore(String),

    /// An I/O error occurred reading or writing a ciphertext file.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from the development environment registry.
#[derive(Error, Debug)]
pub enum EnvironmentError {
    /// The name does not match `^[A-Za-z0-9_-]+$`.
    #[error("invalid environment name '{0}': use letters, digits, '-' and '_' only")]
    InvalidName(String),

    /// An environment directory with this name already exists.
    #[error("environment '{0}' already exists")]
    AlreadyExists(String),

    /// No environment with this name exists.
    #[error("environment '{0}' not found")]
    NotFound(String),

    /// The requested kind is not one of python, node, cpp, generic.
    #[error("unknown environment kind '{0}': expected python, node, cpp or generic")]
    UnknownKind(String),

    /// An environment is already active in the calling shell.
    #[error("environment '{active}' is already active; run 'deactivate' before activating '{requested}'")]
    NestedActivation {
        /// Environment currently active.
        active: String,
        /// Environment the caller tried to activate.
        requested: String,
    },

    /// An I/O error occurred while materializing or reading an environment.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn registry_not_found_display() {
        let e = RegistryError::NotFound {
            name: "shell".to_string(),
            dir: PathBuf::from("/repo/registries"),
        };
        assert_eq!(
            e.to_string(),
            "registry 'shell' not found in /repo/registries"
        );
    }

    #[test]
    fn registry_io_has_source() {
        use std::error::Error as StdError;
        let e = RegistryError::Io {
            path: PathBuf::from("/repo/registries"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.source().is_some());
    }

    #[test]
    fn entry_source_missing_display() {
        let e = EntryError::SourceMissing {
            path: PathBuf::from("/repo/shell/.zshrc"),
        };
        assert_eq!(e.to_string(), "source missing: /repo/shell/.zshrc");
    }

    #[test]
    fn entry_unresolved_variable_lists_names() {
        let e = EntryError::UnresolvedVariable {
            target: "$FOO/$BAR".to_string(),
            names: vec!["FOO".to_string(), "BAR".to_string()],
        };
        assert!(e.to_string().contains("FOO, BAR"));
    }

    #[test]
    fn credential_key_not_found_display() {
        let e = CredentialError::KeyNotFound {
            key: "OPENAI_API_KEY".to_string(),
            env: "ai-tools".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "key 'OPENAI_API_KEY' not found in environment 'ai-tools'"
        );
    }

    #[test]
    fn environment_nested_activation_names_both() {
        let e = EnvironmentError::NestedActivation {
            active: "outer".to_string(),
            requested: "inner".to_string(),
        };
        let msg = e.to_string();
        assert!(msg.contains("outer"));
        assert!(msg.contains("inner"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<RegistryError>();
        assert_send_sync::<EntryError>();
        assert_send_sync::<CredentialError>();
        assert_send_sync::<EnvironmentError>();
    }

    #[test]
    fn credential_error_converts_to_anyhow() {
        let e = CredentialError::MissingArgument("environment name");
        let _anyhow_err: anyhow::Error = e.into();
    }
}
