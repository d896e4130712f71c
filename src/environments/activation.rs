//! Activation as data: what an environment exports, prepends and tags, and
//! the reversible shell context it produces.
use std::path::{Path, PathBuf};

use super::kind::Kind;
use crate::error::EnvironmentError;

/// Script written into every environment directory.
pub const SCRIPT_FILE: &str = "activate";
/// Exported name of the active environment.
pub const ENV_NAME_VAR: &str = "WORKSTATION_ENV_NAME";
/// Exported kind of the active environment.
pub const ENV_KIND_VAR: &str = "WORKSTATION_ENV_KIND";
/// Exported root of the active environment.
pub const ENV_ROOT_VAR: &str = "WORKSTATION_ENV_ROOT";

const SAVED_PATH: &str = "_WORKSTATION_OLD_PATH";
const SAVED_PS1: &str = "_WORKSTATION_OLD_PS1";

/// Shell state touched by activation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellSnapshot {
    /// `PATH`.
    pub path: String,
    /// `PS1`, when exported.
    pub prompt: Option<String>,
    /// Name of the environment already active, if any.
    pub active: Option<String>,
}

impl ShellSnapshot {
    /// Capture from `lookup` (normally the process environment).
    pub fn capture(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            path: lookup("PATH").unwrap_or_default(),
            prompt: lookup("PS1"),
            active: lookup(ENV_NAME_VAR).filter(|v| !v.is_empty()),
        }
    }

    /// Capture from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::capture(|name| std::env::var(name).ok())
    }
}

/// Everything activation changes, rendered to a script by
/// [`ActivationScript::render`] and applied to child processes by
/// [`ActivationScript::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationScript {
    /// Environment name.
    pub name: String,
    /// Variables exported while active.
    pub exports: Vec<(String, String)>,
    /// Directories placed in front of `PATH`, in order.
    pub path_prepend: Vec<PathBuf>,
    /// Prefix added to the prompt.
    pub prompt_tag: String,
}

impl ActivationScript {
    /// Activation data for environment `name` of `kind` rooted at `root`.
    #[must_use]
    pub fn for_environment(name: &str, kind: Kind, root: &Path) -> Self {
        let mut exports = vec![
            (ENV_NAME_VAR.to_string(), name.to_string()),
            (ENV_KIND_VAR.to_string(), kind.to_string()),
            (ENV_ROOT_VAR.to_string(), root.display().to_string()),
        ];
        let bin = match kind {
            Kind::Python => {
                let venv = root.join("venv");
                exports.push(("VIRTUAL_ENV".to_string(), venv.display().to_string()));
                venv.join("bin")
            }
            Kind::Node => {
                exports.push((
                    "NODE_PATH".to_string(),
                    root.join("node_modules").display().to_string(),
                ));
                root.join("node_modules").join(".bin")
            }
            Kind::Cpp | Kind::Generic => root.join("bin"),
        };
        Self {
            name: name.to_string(),
            exports,
            path_prepend: vec![bin],
            prompt_tag: format!("({name}) "),
        }
    }

    /// The shell state after activating on top of `previous`.
    #[must_use]
    pub fn apply(&self, previous: &ShellSnapshot) -> ShellSnapshot {
        let mut segments: Vec<String> = self
            .path_prepend
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        if !previous.path.is_empty() {
            segments.push(previous.path.clone());
        }
        ShellSnapshot {
            path: segments.join(":"),
            prompt: Some(format!(
                "{}{}",
                self.prompt_tag,
                previous.prompt.as_deref().unwrap_or_default()
            )),
            active: Some(self.name.clone()),
        }
    }

    /// Variables to set on a child process for the state `current`.
    #[must_use]
    pub fn child_env(&self, current: &ShellSnapshot) -> Vec<(String, String)> {
        let mut env = self.exports.clone();
        env.push(("PATH".to_string(), current.path.clone()));
        if let Some(prompt) = &current.prompt {
            env.push(("PS1".to_string(), prompt.clone()));
        }
        env
    }

    /// Render as a script for `source` in bash or zsh.
    ///
    /// `deactivate` restores `PATH` and `PS1` as they were, unsetting `PS1`
    /// again when it was unset before activation.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = vec![
            "# Activate with: . <this file>".to_string(),
            format!("if [ -n \"${{{ENV_NAME_VAR}:-}}\" ]; then"),
            format!(
                "    echo \"environment '${ENV_NAME_VAR}' is already active; run 'deactivate' first\" >&2"
            ),
            "    return 1 2>/dev/null || exit 1".to_string(),
            "fi".to_string(),
            String::new(),
            format!("{SAVED_PATH}=\"$PATH\""),
            format!("unset {SAVED_PS1}"),
            "if [ -n \"${PS1+set}\" ]; then".to_string(),
            format!("    {SAVED_PS1}=\"$PS1\""),
            "fi".to_string(),
            String::new(),
        ];
        lines.extend(
            self.exports
                .iter()
                .map(|(name, value)| format!("export {name}={}", shell_quote(value))),
        );
        lines.extend(
            self.path_prepend
                .iter()
                .rev()
                .map(|dir| format!("PATH={}:\"$PATH\"", shell_quote(&dir.display().to_string()))),
        );
        let names: Vec<&str> = self.exports.iter().map(|(n, _)| n.as_str()).collect();
        lines.extend([
            "export PATH".to_string(),
            format!("PS1={}\"${{PS1:-}}\"", shell_quote(&self.prompt_tag)),
            String::new(),
            "deactivate() {".to_string(),
            format!("    PATH=\"${SAVED_PATH}\""),
            "    export PATH".to_string(),
            format!("    if [ -n \"${{{SAVED_PS1}+set}}\" ]; then"),
            format!("        PS1=\"${SAVED_PS1}\""),
            "    else".to_string(),
            "        unset PS1".to_string(),
            "    fi".to_string(),
            format!("    unset {}", names.join(" ")),
            format!("    unset {SAVED_PATH} {SAVED_PS1}"),
            "    unset -f deactivate".to_string(),
            "    hash -r 2>/dev/null || true".to_string(),
            "}".to_string(),
            String::new(),
            "hash -r 2>/dev/null || true".to_string(),
        ]);
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// Single-quote `value` for POSIX shells.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// One activation: the state before and after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationContext {
    /// State to restore on deactivation.
    pub previous: ShellSnapshot,
    /// State while active.
    pub current: ShellSnapshot,
}

/// Activation frames for one process. At most one frame is allowed; a
/// second activation is rejected instead of overwriting the saved state.
#[derive(Debug, Default)]
pub struct ActivationStack {
    frames: Vec<ActivationContext>,
}

impl ActivationStack {
    /// Empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Activate `script` on top of `snapshot`.
    ///
    /// # Errors
    ///
    /// [`EnvironmentError::NestedActivation`] when a frame is already on the
    /// stack or `snapshot` shows another environment active.
    pub fn activate(
        &mut self,
        script: &ActivationScript,
        snapshot: ShellSnapshot,
    ) -> Result<ActivationContext, EnvironmentError> {
        let active = self
            .frames
            .last()
            .and_then(|frame| frame.current.active.clone())
            .or_else(|| snapshot.active.clone());
        if let Some(active) = active {
            return Err(EnvironmentError::NestedActivation {
                active,
                requested: script.name.clone(),
            });
        }
        let context = ActivationContext {
            current: script.apply(&snapshot),
            previous: snapshot,
        };
        self.frames.push(context.clone());
        Ok(context)
    }

    /// Leave the active environment, returning the state it replaced.
    pub fn deactivate(&mut self) -> Option<ShellSnapshot> {
        self.frames.pop().map(|frame| frame.previous)
    }

    /// Active frame, if any.
    #[must_use]
    pub fn current(&self) -> Option<&ActivationContext> {
        self.frames.last()
    }
}
