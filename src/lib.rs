//! Workstation setup engine.
//!
//! Declarative configuration registries installed with backup-on-overwrite,
//! encrypted per-environment credentials, and named development
//! environments with reversible activation.
//!
//! The public API is organised into these layers:
//!
//! - **[`config`]**: registry documents and user settings
//! - **[`resources`]**: idempotent `check + apply` install strategies
//! - **[`installer`]**: applies and verifies registries entry by entry
//! - **[`credentials`]**: encrypted key/value stores per environment
//! - **[`environments`]**: development environment records and activation
//! - **[`commands`]**: subcommand orchestration behind the CLI
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

/// Command-line argument definitions.
pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod environments;
pub mod error;
pub mod exec;
pub mod installer;
pub mod logging;
pub mod paths;
pub mod prompt;
pub mod resources;
