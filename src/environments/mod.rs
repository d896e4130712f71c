//! Named development environments.
//!
//! Each environment is a directory under the environments root holding a
//! kind-specific skeleton, an `environment.toml` record and an `activate`
//! script. Activation happens in the caller's shell by sourcing that
//! script; [`EnvironmentRegistry::run`] applies the same changes to a child
//! process instead.

pub mod activation;
pub mod kind;
pub mod record;
pub mod scaffold;

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;

pub use activation::{ActivationContext, ActivationScript, ActivationStack, ShellSnapshot};
pub use kind::Kind;
pub use record::{EnvironmentInfo, EnvironmentRecord};

pub use crate::paths::is_valid_name;

use crate::error::EnvironmentError;
use crate::exec::Executor;
use crate::logging::Log;
use crate::prompt::Prompt;

fn validate(name: &str) -> Result<(), EnvironmentError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(EnvironmentError::InvalidName(name.to_string()))
    }
}

fn io_error(path: &Path, source: io::Error) -> EnvironmentError {
    EnvironmentError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Environments stored under one root directory.
pub struct EnvironmentRegistry<'a> {
    root: PathBuf,
    python_version: String,
    executor: &'a dyn Executor,
    log: &'a dyn Log,
}

impl std::fmt::Debug for EnvironmentRegistry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentRegistry")
            .field("root", &self.root)
            .field("python_version", &self.python_version)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl<'a> EnvironmentRegistry<'a> {
    /// Registry rooted at `root`.
    pub fn new(
        root: impl Into<PathBuf>,
        python_version: impl Into<String>,
        executor: &'a dyn Executor,
        log: &'a dyn Log,
    ) -> Self {
        Self {
            root: root.into(),
            python_version: python_version.into(),
            executor,
            log,
        }
    }

    /// Directory of environment `name`.
    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn existing(&self, name: &str) -> Result<PathBuf, EnvironmentError> {
        validate(name)?;
        let dir = self.path(name);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(EnvironmentError::NotFound(name.to_string()))
        }
    }

    /// Create environment `name` of `kind`.
    ///
    /// # Errors
    ///
    /// [`EnvironmentError::InvalidName`], [`EnvironmentError::AlreadyExists`],
    /// or an I/O error while materializing. A partially created directory
    /// is removed again.
    pub fn create(&self, name: &str, kind: Kind) -> Result<EnvironmentRecord, EnvironmentError> {
        validate(name)?;
        let dir = self.path(name);
        if dir.exists() {
            return Err(EnvironmentError::AlreadyExists(name.to_string()));
        }
        std::fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;

        match self.materialize(name, kind, &dir) {
            Ok(record) => {
                self.log
                    .info(&format!("created {kind} environment '{name}' at {}", dir.display()));
                Ok(record)
            }
            Err(e) => {
                if let Err(cleanup) = std::fs::remove_dir_all(&dir) {
                    self.log
                        .warn(&format!("cannot remove {}: {cleanup}", dir.display()));
                }
                Err(e)
            }
        }
    }

    fn materialize(
        &self,
        name: &str,
        kind: Kind,
        dir: &Path,
    ) -> Result<EnvironmentRecord, EnvironmentError> {
        scaffold::skeleton(kind, name, dir, &self.python_version).map_err(|e| io_error(dir, e))?;
        if kind == Kind::Python {
            self.populate_venv(dir);
        }

        let record = EnvironmentRecord {
            name: name.to_string(),
            kind,
            created_at: Utc::now(),
        };
        record.write(dir)?;
        write_script(&ActivationScript::for_environment(name, kind, dir), dir)?;
        Ok(record)
    }

    fn populate_venv(&self, dir: &Path) {
        if !self.executor.which("python3") {
            self.log
                .debug("python3 not on PATH; leaving venv skeleton empty");
            return;
        }
        match self.executor.run_in(dir, "python3", &["-m", "venv", "venv"]) {
            Ok(_) => self.log.debug("populated venv with python3 -m venv"),
            Err(e) => self.log.warn(&format!("python3 -m venv failed: {e:#}")),
        }
    }

    /// Every environment, sorted by name. Directories without readable
    /// metadata are listed with an unknown kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the root exists but cannot be read.
    pub fn list(&self) -> Result<Vec<EnvironmentInfo>, EnvironmentError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.root, e)),
        };

        let mut found = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| io_error(&self.root, e))?.path();
            if !path.is_dir() {
                continue;
            }
            let record = EnvironmentRecord::read(&path).ok();
            found.push(EnvironmentInfo {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                kind: record.as_ref().map(|r| r.kind),
                created_at: record.map(|r| r.created_at),
                root: path,
            });
        }
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    /// Delete environment `name` after confirmation. Returns `false` when
    /// the user declines.
    ///
    /// # Errors
    ///
    /// [`EnvironmentError::NotFound`] or an I/O error while deleting.
    pub fn remove(&self, name: &str, prompt: &dyn Prompt) -> Result<bool, EnvironmentError> {
        let dir = self.existing(name)?;
        let confirmed = prompt
            .confirm(
                &format!("Remove environment '{name}' and everything in {}?", dir.display()),
                false,
            )
            .unwrap_or(false);
        if !confirmed {
            self.log.info(&format!("kept environment '{name}'"));
            return Ok(false);
        }
        std::fs::remove_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        self.log.info(&format!("removed environment '{name}'"));
        Ok(true)
    }

    fn script_for(&self, name: &str, dir: &Path) -> ActivationScript {
        let kind = EnvironmentRecord::read(dir).map_or_else(
            |_| {
                self.log
                    .warn(&format!("no readable metadata for '{name}'; treating as generic"));
                Kind::Generic
            },
            |r| r.kind,
        );
        ActivationScript::for_environment(name, kind, dir)
    }

    /// Path of the activation script for `name`, for the caller to source.
    /// The script is regenerated if it has gone missing.
    ///
    /// # Errors
    ///
    /// [`EnvironmentError::NestedActivation`] when `shell` already has an
    /// environment active, [`EnvironmentError::NotFound`], or an I/O error.
    pub fn activate(&self, name: &str, shell: &ShellSnapshot) -> Result<PathBuf, EnvironmentError> {
        if let Some(active) = &shell.active {
            return Err(EnvironmentError::NestedActivation {
                active: active.clone(),
                requested: name.to_string(),
            });
        }
        let dir = self.existing(name)?;
        let script = dir.join(activation::SCRIPT_FILE);
        if !script.is_file() {
            write_script(&self.script_for(name, &dir), &dir)?;
        }
        Ok(script)
    }

    /// Run `command` with environment `name` applied to its process
    /// environment. Returns the command's exit code.
    ///
    /// # Errors
    ///
    /// [`EnvironmentError::NestedActivation`] when `shell` already has an
    /// environment active, [`EnvironmentError::NotFound`], or an I/O error
    /// if the command cannot be started.
    pub fn run(
        &self,
        name: &str,
        command: &[String],
        shell: ShellSnapshot,
    ) -> Result<i32, EnvironmentError> {
        let dir = self.existing(name)?;
        let Some((program, args)) = command.split_first() else {
            return Err(io_error(
                &dir,
                io::Error::new(io::ErrorKind::InvalidInput, "no command given"),
            ));
        };
        let script = self.script_for(name, &dir);
        let mut stack = ActivationStack::new();
        let context = stack.activate(&script, shell)?;
        let env = script.child_env(&context.current);

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.log.debug(&format!("running {program} in '{name}'"));
        let code = self
            .executor
            .run_attached(program, &args, &env)
            .map_err(|e| io_error(Path::new(program), io::Error::other(format!("{e:#}"))))?;
        stack.deactivate();
        Ok(code)
    }

    /// Create environment `name` and add starter project files.
    /// Returns the record and the files written.
    ///
    /// # Errors
    ///
    /// Any error from [`create`](Self::create), or an I/O error while
    /// writing starter files.
    pub fn scaffold(
        &self,
        kind: Kind,
        name: &str,
    ) -> Result<(EnvironmentRecord, Vec<String>), EnvironmentError> {
        let record = self.create(name, kind)?;
        let dir = self.path(name);
        let written = scaffold::starter_files(kind, name, &dir).map_err(|e| io_error(&dir, e))?;
        for file in &written {
            self.log.debug(&format!("wrote {file}"));
        }
        Ok((record, written))
    }
}

fn write_script(script: &ActivationScript, dir: &Path) -> Result<(), EnvironmentError> {
    let path = dir.join(activation::SCRIPT_FILE);
    std::fs::write(&path, script.render()).map_err(|e| io_error(&path, e))
}
