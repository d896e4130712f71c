//! Config installer: applies registry entries with backup-on-overwrite.
//!
//! Entries are processed sequentially in registry order. A failing entry is
//! recorded in the report and never stops the entries after it; only a
//! registry that cannot be loaded aborts the run.
pub mod report;
pub mod scan;
pub mod target;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::{ConfigEntry, Registry, RegistryStore, Strategy};
use crate::error::{EntryError, RegistryError};
use crate::logging::Log;
use crate::paths::Dirs;
use crate::prompt::Prompt;
use crate::resources::copy::CopyResource;
use crate::resources::symlink::SymlinkResource;
use crate::resources::template::TemplateResource;
use crate::resources::{Resource, ResourceChange, ResourceState};

pub use report::{CheckEntry, CheckReport, EntryOutcome, InstallReport, Outcome, RegistrySummary};

/// Applies and verifies registries against the local filesystem.
pub struct Installer<'a> {
    root: PathBuf,
    dirs: Dirs,
    env: HashMap<String, String>,
    strict: bool,
    prompt: &'a dyn Prompt,
    log: &'a dyn Log,
}

impl std::fmt::Debug for Installer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("root", &self.root)
            .field("dirs", &self.dirs)
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

impl<'a> Installer<'a> {
    /// Create an installer for the repository at `root`, reading variables
    /// from the process environment.
    #[must_use]
    pub fn new(root: PathBuf, dirs: Dirs, prompt: &'a dyn Prompt, log: &'a dyn Log) -> Self {
        Self {
            root,
            dirs,
            env: std::env::vars().collect(),
            strict: false,
            prompt,
            log,
        }
    }

    /// Fail entries whose target references an undefined variable instead
    /// of leaving the reference verbatim.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Replace the variables used for target expansion.
    #[must_use]
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Load `name` from `store` and install every entry.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] if the registry cannot be loaded. Entry
    /// failures are reported in the returned [`InstallReport`].
    pub fn install(&self, store: &RegistryStore, name: &str) -> Result<InstallReport, RegistryError> {
        let registry = store.load(name)?;
        Ok(self.install_registry(&registry))
    }

    /// Install every entry of an already loaded registry.
    #[must_use]
    pub fn install_registry(&self, registry: &Registry) -> InstallReport {
        self.log.stage(&format!("Installing {}", registry.name));

        let entries = registry
            .entries
            .iter()
            .map(|entry| {
                let outcome = match self.apply_entry(entry) {
                    Ok(ResourceChange::Applied { backup }) => {
                        if let Some(b) = &backup {
                            self.log.info(&format!("{}: backed up to {}", entry.name, b.display()));
                        }
                        self.log.info(&format!("{}: applied ({})", entry.name, entry.strategy));
                        Outcome::Applied { backup }
                    }
                    Ok(ResourceChange::AlreadyCorrect) => {
                        self.log.debug(&format!("{}: already correct", entry.name));
                        Outcome::AlreadyCorrect
                    }
                    Err(e) => {
                        self.log.error(&format!("{}: {e}", entry.name));
                        Outcome::Failed(e)
                    }
                };
                EntryOutcome {
                    name: entry.name.clone(),
                    outcome,
                }
            })
            .collect();

        InstallReport {
            registry: registry.name.clone(),
            entries,
        }
    }

    /// Load `name` from `store` and verify every entry without modifying
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] if the registry cannot be loaded.
    pub fn check(&self, store: &RegistryStore, name: &str) -> Result<CheckReport, RegistryError> {
        let registry = store.load(name)?;
        Ok(self.check_registry(&registry))
    }

    /// Verify every entry of an already loaded registry.
    #[must_use]
    pub fn check_registry(&self, registry: &Registry) -> CheckReport {
        self.log.stage(&format!("Checking {}", registry.name));

        let entries = registry
            .entries
            .iter()
            .map(|entry| {
                let (passed, detail) = match self.check_entry(entry) {
                    Ok((ResourceState::Correct, target)) => (true, target.display().to_string()),
                    Ok((ResourceState::Missing, target)) => {
                        (false, format!("missing: {}", target.display()))
                    }
                    Ok((ResourceState::Incorrect { current }, target)) => {
                        (false, format!("{}: {current}", target.display()))
                    }
                    Ok((ResourceState::Invalid { reason }, _)) => (false, reason),
                    Err(e) => (false, e.to_string()),
                };
                if passed {
                    self.log.debug(&format!("{}: ok", entry.name));
                } else {
                    self.log.warn(&format!("{}: {detail}", entry.name));
                }
                CheckEntry {
                    name: entry.name.clone(),
                    passed,
                    detail,
                }
            })
            .collect();

        CheckReport {
            registry: registry.name.clone(),
            entries,
        }
    }

    /// Every registry in `store` with its description and entry count.
    ///
    /// Documents that fail to parse are logged and left out.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] if the registry directory cannot be read.
    pub fn list(&self, store: &RegistryStore) -> Result<Vec<RegistrySummary>, RegistryError> {
        let mut out = Vec::new();
        for name in store.list()? {
            match store.load(&name) {
                Ok(registry) => out.push(RegistrySummary {
                    entries: registry.entries.len(),
                    name: registry.name,
                    description: registry.description,
                }),
                Err(e) => self.log.warn(&e.to_string()),
            }
        }
        Ok(out)
    }

    /// Resolve, validate and apply a single entry.
    fn apply_entry(&self, entry: &ConfigEntry) -> Result<ResourceChange, EntryError> {
        let target = self.resolve_target(entry)?;
        let source = self.resolve_source(entry);
        if !source.exists() {
            return Err(EntryError::SourceMissing { path: source });
        }
        let resource = self.resource(entry.strategy, source, target);
        self.log.debug(&format!("{}: {}", entry.name, resource.description()));
        resource.apply()
    }

    fn check_entry(&self, entry: &ConfigEntry) -> Result<(ResourceState, PathBuf), EntryError> {
        let target = self.resolve_target(entry)?;
        let source = self.resolve_source(entry);
        let state = self
            .resource(entry.strategy, source, target.clone())
            .current_state()?;
        Ok((state, target))
    }

    fn resource(&self, strategy: Strategy, source: PathBuf, target: PathBuf) -> Box<dyn Resource + '_> {
        match strategy {
            Strategy::Symlink => Box::new(SymlinkResource::new(source, target)),
            Strategy::Copy => Box::new(CopyResource::new(source, target)),
            Strategy::Template => Box::new(TemplateResource::new(source, target, self.prompt)),
        }
    }

    /// Expand the entry's target against the environment and XDG defaults.
    fn resolve_target(&self, entry: &ConfigEntry) -> Result<PathBuf, EntryError> {
        let resolved = target::expand(&entry.target, &self.dirs.home, |name| {
            self.env
                .get(name)
                .filter(|v| !v.is_empty())
                .cloned()
                .or_else(|| {
                    self.dirs
                        .fallback_for(name)
                        .map(|p| p.to_string_lossy().into_owned())
                })
        });

        if !resolved.unresolved.is_empty() {
            if self.strict {
                return Err(EntryError::UnresolvedVariable {
                    target: entry.target.clone(),
                    names: resolved.unresolved,
                });
            }
            self.log.warn(&format!(
                "{}: undefined variable(s) {} left verbatim in {}",
                entry.name,
                resolved.unresolved.join(", "),
                resolved.path.display()
            ));
        }
        Ok(resolved.path)
    }

    fn resolve_source(&self, entry: &ConfigEntry) -> PathBuf {
        let source = Path::new(&entry.source);
        if source.is_absolute() {
            source.to_path_buf()
        } else {
            self.root.join(source)
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::logging::RecordingLog;
    use crate::prompt::test_helpers::ScriptedPrompt;

    struct Fixture {
        _tmp: tempfile::TempDir,
        root: PathBuf,
        home: PathBuf,
        dirs: Dirs,
    }

    fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("repo");
        let home = tmp.path().join("home");
        std::fs::create_dir_all(root.join("shell")).unwrap();
        std::fs::create_dir_all(&home).unwrap();
        let home_str = home.to_string_lossy().to_string();
        let dirs = Dirs::from_lookup(move |n| (n == "HOME").then(|| home_str.clone())).unwrap();
        Fixture {
            _tmp: tmp,
            root,
            home,
            dirs,
        }
    }

    fn entry(name: &str, source: &str, target: &str, strategy: Strategy) -> ConfigEntry {
        ConfigEntry {
            name: name.to_string(),
            description: String::new(),
            source: source.to_string(),
            target: target.to_string(),
            strategy,
        }
    }

    fn registry(entries: Vec<ConfigEntry>) -> Registry {
        Registry {
            name: "test".to_string(),
            description: String::new(),
            entries,
        }
    }

    #[test]
    fn missing_source_does_not_stop_later_entries() {
        let fx = fixture();
        std::fs::write(fx.root.join("shell/.zshrc"), "# zsh").unwrap();
        let log = RecordingLog::default();
        let prompt = ScriptedPrompt::new();
        let installer = Installer::new(fx.root.clone(), fx.dirs.clone(), &prompt, &log)
            .with_env(HashMap::new());

        let report = installer.install_registry(&registry(vec![
            entry("a", "shell/missing", "$HOME/.a", Strategy::Symlink),
            entry("b", "shell/.zshrc", "$HOME/.zshrc", Strategy::Symlink),
        ]));

        assert!(matches!(
            report.outcome("a"),
            Some(Outcome::Failed(EntryError::SourceMissing { .. }))
        ));
        assert!(matches!(
            report.outcome("b"),
            Some(Outcome::Applied { backup: None })
        ));
        assert!(fx.home.join(".zshrc").symlink_metadata().is_ok());
        assert_eq!(log.at("error").len(), 1);
    }

    #[test]
    fn xdg_variables_fall_back_to_defaults() {
        let fx = fixture();
        std::fs::write(fx.root.join("shell/starship.toml"), "").unwrap();
        let log = RecordingLog::default();
        let prompt = ScriptedPrompt::new();
        let installer = Installer::new(fx.root.clone(), fx.dirs.clone(), &prompt, &log)
            .with_env(HashMap::new());

        let report = installer.install_registry(&registry(vec![entry(
            "starship",
            "shell/starship.toml",
            "${XDG_CONFIG_HOME}/starship.toml",
            Strategy::Copy,
        )]));

        assert_eq!(report.failures(), 0);
        assert!(fx.home.join(".config/starship.toml").exists());
    }

    #[test]
    fn unresolved_variable_warns_by_default() {
        let fx = fixture();
        std::fs::write(fx.root.join("shell/rc"), "").unwrap();
        let log = RecordingLog::default();
        let prompt = ScriptedPrompt::new();
        let installer = Installer::new(fx.root.clone(), fx.dirs.clone(), &prompt, &log)
            .with_env(HashMap::new());

        let t = installer
            .resolve_target(&entry("rc", "shell/rc", "$NOPE/rc", Strategy::Copy))
            .unwrap();

        assert_eq!(t, PathBuf::from("$NOPE/rc"));
        assert_eq!(log.at("warn").len(), 1);
    }

    #[test]
    fn unresolved_variable_fails_entry_when_strict() {
        let fx = fixture();
        std::fs::write(fx.root.join("shell/rc"), "").unwrap();
        let log = RecordingLog::default();
        let prompt = ScriptedPrompt::new();
        let installer = Installer::new(fx.root.clone(), fx.dirs.clone(), &prompt, &log)
            .with_env(HashMap::new())
            .strict(true);

        let report =
            installer.install_registry(&registry(vec![entry("rc", "shell/rc", "$NOPE/rc", Strategy::Copy)]));

        let Some(Outcome::Failed(EntryError::UnresolvedVariable { names, .. })) = report.outcome("rc")
        else {
            panic!("expected an unresolved variable failure");
        };
        assert_eq!(names, &vec!["NOPE".to_string()]);
    }

    #[test]
    fn environment_overrides_fallbacks() {
        let fx = fixture();
        let log = RecordingLog::default();
        let prompt = ScriptedPrompt::new();
        let env = HashMap::from([(
            "XDG_CONFIG_HOME".to_string(),
            "/custom/config".to_string(),
        )]);
        let installer =
            Installer::new(fx.root.clone(), fx.dirs.clone(), &prompt, &log).with_env(env);

        let t = installer
            .resolve_target(&entry("x", "x", "${XDG_CONFIG_HOME}/x", Strategy::Copy))
            .unwrap();
        assert_eq!(t, PathBuf::from("/custom/config/x"));
    }

    #[test]
    fn check_reports_each_entry() {
        let fx = fixture();
        std::fs::write(fx.root.join("shell/.zshrc"), "").unwrap();
        std::fs::write(fx.root.join("shell/aliases"), "").unwrap();
        let log = RecordingLog::default();
        let prompt = ScriptedPrompt::new();
        let installer = Installer::new(fx.root.clone(), fx.dirs.clone(), &prompt, &log)
            .with_env(HashMap::new());
        let reg = registry(vec![
            entry("zshrc", "shell/.zshrc", "~/.zshrc", Strategy::Symlink),
            entry("aliases", "shell/aliases", "~/.aliases", Strategy::Copy),
        ]);

        let before = installer.check_registry(&reg);
        assert!(!before.passed());
        assert!(before.entries.iter().all(|e| !e.passed));

        let _ = installer.install_registry(&reg);
        let after = installer.check_registry(&reg);
        assert!(after.passed(), "{after:?}");
    }

    #[test]
    fn absolute_source_is_used_as_is() {
        let fx = fixture();
        let abs = fx.home.join("outside");
        std::fs::write(&abs, "").unwrap();
        let log = RecordingLog::default();
        let prompt = ScriptedPrompt::new();
        let installer = Installer::new(fx.root.clone(), fx.dirs.clone(), &prompt, &log);
        let e = entry("abs", &abs.to_string_lossy(), "~/x", Strategy::Symlink);
        assert_eq!(installer.resolve_source(&e), abs);
    }
}
