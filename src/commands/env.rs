//! Command: `env ...`.
use std::process::ExitCode;

use anyhow::Result;

use super::{CommandSetup, required};
use crate::cli::EnvCommand;
use crate::environments::{EnvironmentRegistry, Kind, ShellSnapshot};
use crate::exec::SystemExecutor;
use crate::logging::Logger;
use crate::prompt::Prompt;

fn kind_or_ask(kind: Option<&String>, prompt: &dyn Prompt) -> Result<Kind> {
    if let Some(kind) = kind {
        return Ok(kind.parse()?);
    }
    if !prompt.is_interactive() {
        return Ok(Kind::Generic);
    }
    let answer = prompt.input("Environment kind (python, node, cpp, generic)")?;
    Ok(answer.parse()?)
}

/// Run an `env` verb. Returns the exit code of `env run`, success otherwise.
///
/// # Errors
///
/// Returns any environment registry error, or a missing required argument.
#[allow(clippy::print_stdout)]
pub fn run(cmd: &EnvCommand, setup: &CommandSetup, prompt: &dyn Prompt, log: &Logger) -> Result<ExitCode> {
    let executor = SystemExecutor;
    let registry = EnvironmentRegistry::new(
        setup.settings.environments_dir.clone(),
        setup.settings.python_version.clone(),
        &executor,
        log,
    );

    match cmd {
        EnvCommand::Create { name, kind } => {
            let name = required(name.clone(), prompt, "Environment name", "environment name")?;
            let kind = kind_or_ask(kind.as_ref(), prompt)?;
            registry.create(&name, kind)?;
            log.info(&format!(
                "activate with: . \"$(workstation env activate {name})\""
            ));
        }
        EnvCommand::List => {
            for env in registry.list()? {
                let created = env
                    .created_at
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                println!("{:<20} {:<8} {created}", env.name, env.kind_label());
            }
        }
        EnvCommand::Activate { name } => {
            let name = required(name.clone(), prompt, "Environment name", "environment name")?;
            let script = registry.activate(&name, &ShellSnapshot::from_env())?;
            println!("{}", script.display());
        }
        EnvCommand::Remove { name } => {
            let name = required(name.clone(), prompt, "Environment name", "environment name")?;
            registry.remove(&name, prompt)?;
        }
        EnvCommand::Run { name, command } => {
            let code = registry.run(name, command, ShellSnapshot::from_env())?;
            return Ok(u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from));
        }
        EnvCommand::Scaffold { kind, name } => {
            let kind: Kind = kind.parse()?;
            let (_, written) = registry.scaffold(kind, name)?;
            log.info(&format!("scaffolded {kind} project '{name}' ({} files)", written.len()));
        }
    }
    Ok(ExitCode::SUCCESS)
}
