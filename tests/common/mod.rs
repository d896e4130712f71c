// Shared helpers for integration tests.
//
// Provides a temporary repository and home directory with a fluent builder,
// plus in-memory stand-ins for logging, prompting and the OS keychain, so
// each integration test runs without touching the real user environment.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use workstation::config::RegistryStore;
use workstation::credentials::SecretStore;
use workstation::error::CredentialError;
use workstation::logging::{EntryStatus, Log};
use workstation::paths::Dirs;
use workstation::prompt::Prompt;

/// An isolated repository and home directory backed by a
/// [`tempfile::TempDir`].
pub struct IntegrationTestContext {
    /// Owns every path below.
    pub tmp: tempfile::TempDir,
    /// Repository root containing `registries/`.
    pub root: PathBuf,
    /// Stand-in for `$HOME`.
    pub home: PathBuf,
}

impl IntegrationTestContext {
    /// Create a context with an empty `registries/` directory.
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let root = tmp.path().join("repo");
        let home = tmp.path().join("home");
        std::fs::create_dir_all(root.join("registries")).expect("create registries dir");
        std::fs::create_dir_all(&home).expect("create home dir");
        Self { tmp, root, home }
    }

    /// XDG directories rooted at the fake home.
    pub fn dirs(&self) -> Dirs {
        let home = self.home.to_string_lossy().into_owned();
        Dirs::from_lookup(move |name| (name == "HOME").then(|| home.clone())).expect("dirs")
    }

    /// Variables for target expansion.
    pub fn env(&self) -> HashMap<String, String> {
        HashMap::from([("HOME".to_string(), self.home.to_string_lossy().into_owned())])
    }

    /// Registry store over `registries/`.
    pub fn store(&self) -> RegistryStore {
        RegistryStore::new(self.root.join("registries"))
    }

    /// Path under the fake home.
    pub fn home_path(&self, relative: &str) -> PathBuf {
        self.home.join(relative)
    }

    /// Scratch directory outside the repository and home.
    pub fn scratch(&self, name: &str) -> PathBuf {
        self.tmp.path().join(name)
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write `registries/<name>.toml`.
    pub fn with_registry(self, name: &str, content: &str) -> Self {
        let path = self.ctx.root.join("registries").join(format!("{name}.toml"));
        std::fs::write(path, content).expect("write registry");
        self
    }

    /// Write a source file inside the repository.
    pub fn with_source(self, relative: &str, content: &str) -> Self {
        write_file(&self.ctx.root.join(relative), content);
        self
    }

    /// Write a file under the fake home.
    pub fn with_home_file(self, relative: &str, content: &str) -> Self {
        write_file(&self.ctx.home.join(relative), content);
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, content).expect("write file");
}

/// A [`Log`] that keeps messages in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    pub lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    fn push(&self, level: &str, msg: &str) {
        self.lines
            .lock()
            .expect("log lock")
            .push(format!("{level}: {msg}"));
    }

    /// Messages at `level`.
    pub fn at(&self, level: &str) -> Vec<String> {
        let prefix = format!("{level}: ");
        self.lines
            .lock()
            .expect("log lock")
            .iter()
            .filter_map(|l| l.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }
}

impl Log for MemoryLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn record(&self, name: &str, status: EntryStatus, _message: Option<&str>) {
        self.push("record", &format!("{name}: {status:?}"));
    }
}

/// A [`Prompt`] answering from queues.
#[derive(Debug, Default)]
pub struct Answers {
    inputs: RefCell<VecDeque<String>>,
    confirms: RefCell<VecDeque<bool>>,
}

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(self, answer: &str) -> Self {
        self.inputs.borrow_mut().push_back(answer.to_string());
        self
    }

    pub fn with_confirm(self, answer: bool) -> Self {
        self.confirms.borrow_mut().push_back(answer);
        self
    }
}

fn unanswered(prompt: &str) -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, format!("unanswered: {prompt}"))
}

impl Prompt for Answers {
    fn input(&self, prompt: &str) -> io::Result<String> {
        self.inputs
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| unanswered(prompt))
    }

    fn password(&self, prompt: &str, _confirm: bool) -> io::Result<String> {
        self.input(prompt)
    }

    fn confirm(&self, prompt: &str, _default: bool) -> io::Result<bool> {
        self.confirms
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| unanswered(prompt))
    }
}

/// In-memory keychain.
#[derive(Debug, Default)]
pub struct MemoryKeychain {
    secrets: Mutex<HashMap<(String, String), String>>,
}

impl MemoryKeychain {
    /// Keychain holding `password` for every environment in `envs`.
    pub fn with_passwords(prefix: &str, account: &str, envs: &[&str], password: &str) -> Self {
        let keychain = Self::default();
        for env in envs {
            keychain
                .set(&format!("{prefix}{env}"), account, password)
                .expect("seed keychain");
        }
        keychain
    }

    pub fn contains(&self, service: &str, account: &str) -> bool {
        self.secrets
            .lock()
            .expect("keychain lock")
            .contains_key(&(service.to_string(), account.to_string()))
    }
}

impl SecretStore for MemoryKeychain {
    fn get(&self, service: &str, account: &str) -> Result<Option<String>, CredentialError> {
        Ok(self
            .secrets
            .lock()
            .expect("keychain lock")
            .get(&(service.to_string(), account.to_string()))
            .cloned())
    }

    fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), CredentialError> {
        self.secrets
            .lock()
            .expect("keychain lock")
            .insert((service.to_string(), account.to_string()), secret.to_string());
        Ok(())
    }
}
