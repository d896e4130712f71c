#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for `config install`, `config check` and `config list`.
//!
//! Each test builds a throwaway repository and home directory, then drives
//! the [`Installer`] against them exactly as the command handler does.

mod common;

use common::{Answers, IntegrationTestContext, MemoryLog, TestContextBuilder};
use workstation::error::{EntryError, RegistryError};
use workstation::installer::{Installer, Outcome};

const SHELL_REGISTRY: &str = r#"
name = "shell"
description = "Interactive shell configuration"

[[configs]]
name = "zshrc"
source = "shell/.zshrc"
target = "$HOME/.zshrc"
type = "symlink"

[[configs]]
name = "aliases"
source = "shell/aliases.zsh"
target = "${HOME}/.config/zsh/aliases.zsh"
type = "symlink"
"#;

fn shell_repo() -> IntegrationTestContext {
    TestContextBuilder::new()
        .with_registry("shell", SHELL_REGISTRY)
        .with_source("shell/.zshrc", "source ~/.config/zsh/aliases.zsh\n")
        .with_source("shell/aliases.zsh", "alias ll='ls -l'\n")
        .build()
}

fn installer<'a>(ctx: &IntegrationTestContext, prompt: &'a Answers, log: &'a MemoryLog) -> Installer<'a> {
    Installer::new(ctx.root.clone(), ctx.dirs(), prompt, log).with_env(ctx.env())
}

// ---------------------------------------------------------------------------
// Shell registry scenario
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn shell_registry_installs_links_and_checks_clean() {
    let ctx = shell_repo();
    let (prompt, log) = (Answers::new(), MemoryLog::default());
    let installer = installer(&ctx, &prompt, &log);

    let report = installer.install(&ctx.store(), "shell").unwrap();
    assert_eq!(report.failures(), 0);
    assert!(matches!(report.outcome("zshrc"), Some(Outcome::Applied { backup: None })));

    let link = ctx.home_path(".zshrc");
    assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
    assert_eq!(
        link.canonicalize().unwrap(),
        ctx.root.join("shell/.zshrc").canonicalize().unwrap()
    );

    let check = installer.check(&ctx.store(), "shell").unwrap();
    assert!(check.passed(), "{check:?}");
    assert_eq!(check.entries.len(), 2);
}

#[cfg(unix)]
#[test]
fn second_install_changes_nothing() {
    let ctx = shell_repo();
    let (prompt, log) = (Answers::new(), MemoryLog::default());
    let installer = installer(&ctx, &prompt, &log);

    installer.install(&ctx.store(), "shell").unwrap();
    let again = installer.install(&ctx.store(), "shell").unwrap();

    assert!(again
        .entries
        .iter()
        .all(|e| matches!(e.outcome, Outcome::AlreadyCorrect)));
    assert_eq!(again.backups().count(), 0);
}

// ---------------------------------------------------------------------------
// Backup and isolation
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn existing_file_is_backed_up_before_replacement() {
    let ctx = TestContextBuilder::new()
        .with_registry("shell", SHELL_REGISTRY)
        .with_source("shell/.zshrc", "managed\n")
        .with_source("shell/aliases.zsh", "")
        .with_home_file(".zshrc", "handwritten\n")
        .build();
    let (prompt, log) = (Answers::new(), MemoryLog::default());

    let report = installer(&ctx, &prompt, &log)
        .install(&ctx.store(), "shell")
        .unwrap();

    let backups: Vec<_> = report.backups().cloned().collect();
    assert_eq!(backups.len(), 1);
    let backup = &backups[0];
    assert!(backup
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with(".zshrc.backup-"));
    assert_eq!(std::fs::read_to_string(backup).unwrap(), "handwritten\n");
    assert_eq!(
        std::fs::read_to_string(ctx.home_path(".zshrc")).unwrap(),
        "managed\n"
    );
}

#[cfg(unix)]
#[test]
fn failing_entry_does_not_stop_later_entries() {
    let ctx = TestContextBuilder::new()
        .with_registry(
            "mixed",
            r#"
[[configs]]
name = "missing"
source = "nowhere/file"
target = "$HOME/.missing"

[[configs]]
name = "vimrc"
source = "vim/.vimrc"
target = "$HOME/.vimrc"
type = "copy"
"#,
        )
        .with_source("vim/.vimrc", "set number\n")
        .build();
    let (prompt, log) = (Answers::new(), MemoryLog::default());

    let report = installer(&ctx, &prompt, &log)
        .install(&ctx.store(), "mixed")
        .unwrap();

    assert_eq!(report.registry, "mixed");
    assert_eq!(report.failures(), 1);
    assert!(matches!(
        report.outcome("missing"),
        Some(Outcome::Failed(EntryError::SourceMissing { .. }))
    ));
    assert_eq!(
        std::fs::read_to_string(ctx.home_path(".vimrc")).unwrap(),
        "set number\n"
    );
    assert_eq!(log.at("error").len(), 1);
}

#[test]
fn strict_mode_rejects_undefined_variables() {
    let ctx = TestContextBuilder::new()
        .with_registry(
            "work",
            r#"
[[configs]]
name = "project-rc"
source = "work/rc"
target = "$WORKSPACE_ROOT/.rc"
"#,
        )
        .with_source("work/rc", "")
        .build();
    let (prompt, log) = (Answers::new(), MemoryLog::default());

    let report = installer(&ctx, &prompt, &log)
        .strict(true)
        .install(&ctx.store(), "work")
        .unwrap();

    assert!(matches!(
        report.outcome("project-rc"),
        Some(Outcome::Failed(EntryError::UnresolvedVariable { names, .. })) if names == &["WORKSPACE_ROOT"]
    ));
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

#[test]
fn template_entry_is_rendered_from_answers() {
    let ctx = TestContextBuilder::new()
        .with_registry(
            "git",
            r#"
[[configs]]
name = "gitconfig"
source = "git/gitconfig.tmpl"
target = "$HOME/.gitconfig"
type = "template"
"#,
        )
        .with_source("git/gitconfig.tmpl", "[user]\n  name = {{NAME}}\n  email = {{EMAIL}}\n")
        .build();
    let prompt = Answers::new().with_input("Dev").with_input("dev@example.com");
    let log = MemoryLog::default();

    let report = installer(&ctx, &prompt, &log)
        .install(&ctx.store(), "git")
        .unwrap();

    assert_eq!(report.failures(), 0);
    assert_eq!(
        std::fs::read_to_string(ctx.home_path(".gitconfig")).unwrap(),
        "[user]\n  name = Dev\n  email = dev@example.com\n"
    );
}

// ---------------------------------------------------------------------------
// Registry lookup
// ---------------------------------------------------------------------------

#[test]
fn unknown_registry_is_not_found() {
    let ctx = IntegrationTestContext::new();
    let (prompt, log) = (Answers::new(), MemoryLog::default());
    let err = installer(&ctx, &prompt, &log)
        .install(&ctx.store(), "nope")
        .unwrap_err();
    assert!(matches!(err, RegistryError::NotFound { ref name, .. } if name == "nope"));
}

#[test]
fn list_reports_entry_counts_and_skips_broken_documents() {
    let ctx = TestContextBuilder::new()
        .with_registry("shell", SHELL_REGISTRY)
        .with_registry("broken", "[[configs]\nname = ")
        .build();
    let (prompt, log) = (Answers::new(), MemoryLog::default());

    let listed = installer(&ctx, &prompt, &log).list(&ctx.store()).unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "shell");
    assert_eq!(listed[0].entries, 2);
    assert_eq!(listed[0].description, "Interactive shell configuration");
    assert_eq!(log.at("warn").len(), 1);
}
