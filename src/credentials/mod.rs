//! Encrypted per-environment credential storage.
//!
//! Each credential environment is a JSON map encrypted into
//! `<credentials_dir>/<env>.enc` with an OpenSSL-compatible envelope. The
//! password lives in the OS keychain when the user chooses to save it.

pub mod cipher;
pub mod secret;
pub mod store;

pub use secret::{KeyringStore, SecretStore};
pub use store::{CredentialStore, Credentials, MAIN_ENV};
