//! External process execution.
use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::{Command, Output};

/// Result of a command execution.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited successfully.
    pub success: bool,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Seam over process spawning so environment and scaffolding code can be
/// tested without touching the host.
pub trait Executor: std::fmt::Debug {
    /// Run a command in `dir`, capturing output. Fails on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command with inherited stdio and the given environment
    /// overrides, returning its exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned.
    fn run_attached(&self, program: &str, args: &[&str], env: &[(String, String)]) -> Result<i32>;

    /// Check if a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

/// Execute a command and return the result, bailing on non-zero exit.
fn execute_checked(mut cmd: Command, label: &str) -> Result<ExecResult> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to execute: {label}"))?;
    let result = ExecResult::from(output);
    if !result.success {
        bail!(
            "{label} failed (exit {}): {}",
            result.code.unwrap_or(-1),
            result.stderr.trim()
        );
    }
    Ok(result)
}

impl Executor for SystemExecutor {
    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(dir);
        execute_checked(cmd, &format!("{program} in {}", dir.display()))
    }

    fn run_attached(&self, program: &str, args: &[&str], env: &[(String, String)]) -> Result<i32> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        for (k, v) in env {
            cmd.env(k, v);
        }
        let status = cmd
            .status()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(status.code().unwrap_or(1))
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Shared test double for [`Executor`].
#[cfg(test)]
pub mod test_helpers {
    use super::{ExecResult, Executor};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// A configurable mock executor.
    ///
    /// Every call is recorded as `program arg...`. `run_in` succeeds unless
    /// constructed with [`failing`](Self::failing); `which` returns the
    /// configured value.
    #[derive(Debug, Default)]
    pub struct MockExecutor {
        calls: Mutex<Vec<String>>,
        envs: Mutex<Vec<Vec<(String, String)>>>,
        dirs: Mutex<Vec<PathBuf>>,
        which_result: bool,
        fail: bool,
        exit_code: i32,
    }

    impl MockExecutor {
        /// Mock where every program is found and every call succeeds.
        #[must_use]
        pub fn available() -> Self {
            Self {
                which_result: true,
                ..Self::default()
            }
        }

        /// Mock where no program is found.
        #[must_use]
        pub fn unavailable() -> Self {
            Self::default()
        }

        /// Mock where programs are found but every `run_in` fails.
        #[must_use]
        pub fn failing() -> Self {
            Self {
                which_result: true,
                fail: true,
                ..Self::default()
            }
        }

        /// Set the exit code returned by `run_attached`.
        #[must_use]
        pub const fn with_exit_code(mut self, code: i32) -> Self {
            self.exit_code = code;
            self
        }

        /// Recorded command lines.
        #[must_use]
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map_or_else(|_| vec![], |g| g.clone())
        }

        /// Environment overrides passed to each `run_attached` call.
        #[must_use]
        pub fn envs(&self) -> Vec<Vec<(String, String)>> {
            self.envs.lock().map_or_else(|_| vec![], |g| g.clone())
        }

        /// Working directories passed to each `run_in` call.
        #[must_use]
        pub fn dirs(&self) -> Vec<PathBuf> {
            self.dirs.lock().map_or_else(|_| vec![], |g| g.clone())
        }

        fn push(&self, program: &str, args: &[&str]) {
            if let Ok(mut guard) = self.calls.lock() {
                let mut line = program.to_string();
                for a in args {
                    line.push(' ');
                    line.push_str(a);
                }
                guard.push(line);
            }
        }
    }

    impl Executor for MockExecutor {
        fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            self.push(program, args);
            if let Ok(mut guard) = self.dirs.lock() {
                guard.push(dir.to_path_buf());
            }
            if self.fail {
                anyhow::bail!("mock command failed");
            }
            Ok(ExecResult {
                stdout: String::new(),
                stderr: String::new(),
                success: true,
                code: Some(0),
            })
        }

        fn run_attached(
            &self,
            program: &str,
            args: &[&str],
            env: &[(String, String)],
        ) -> anyhow::Result<i32> {
            self.push(program, args);
            if let Ok(mut guard) = self.envs.lock() {
                guard.push(env.to_vec());
            }
            Ok(self.exit_code)
        }

        fn which(&self, _: &str) -> bool {
            self.which_result
        }
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn run_in_echo() {
        let dir = std::env::temp_dir();
        let result = SystemExecutor.run_in(&dir, "echo", &["hello"]).unwrap();
        assert!(result.success, "echo command should succeed");
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[test]
    fn run_in_failure() {
        let dir = std::env::temp_dir();
        let result = SystemExecutor.run_in(&dir, "false", &[]);
        assert!(result.is_err(), "non-zero exit should produce an error");
    }

    #[test]
    fn run_attached_returns_exit_code() {
        let code = SystemExecutor
            .run_attached("sh", &["-c", "exit 3"], &[])
            .unwrap();
        assert_eq!(code, 3);
    }

    #[test]
    fn run_attached_applies_env() {
        let code = SystemExecutor
            .run_attached(
                "sh",
                &["-c", "test \"$WORKSTATION_PROBE\" = on"],
                &[("WORKSTATION_PROBE".to_string(), "on".to_string())],
            )
            .unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn which_finds_known_program() {
        assert!(SystemExecutor.which("sh"), "sh should be found on Unix");
    }

    #[test]
    fn which_missing_program() {
        assert!(
            !SystemExecutor.which("this-program-does-not-exist-12345"),
            "non-existent program should not be found"
        );
    }
}
