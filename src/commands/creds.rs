//! Command: `creds ...`.
use anyhow::Result;

use super::{CommandSetup, required};
use crate::cli::CredsCommand;
use crate::credentials::{CredentialStore, KeyringStore, MAIN_ENV};
use crate::logging::Logger;
use crate::prompt::Prompt;

fn env_or_main(env: Option<&String>) -> &str {
    env.map_or(MAIN_ENV, String::as_str)
}

/// `export KEY='value'` for `eval`, or `None` when `key` is not a valid
/// shell identifier.
#[must_use]
pub fn export_line(key: &str, value: &str) -> Option<String> {
    let mut chars = key.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then(|| format!("export {key}='{}'", value.replace('\'', r"'\''")))
}

/// Run a `creds` verb.
///
/// # Errors
///
/// Returns any credential store error, or a missing required argument.
#[allow(clippy::print_stdout)]
pub fn run(cmd: &CredsCommand, setup: &CommandSetup, prompt: &dyn Prompt, log: &Logger) -> Result<()> {
    let secrets = KeyringStore;
    let store = CredentialStore::new(
        setup.settings.credentials_dir.clone(),
        setup.settings.keychain_prefix.clone(),
        &secrets,
        prompt,
        log,
    );

    match cmd {
        CredsCommand::Environments => {
            for name in store.environments()? {
                println!("{name}");
            }
        }
        CredsCommand::CreateEnv { name } => {
            let name = required(name.clone(), prompt, "Environment name", "environment name")?;
            store.create(&name)?;
        }
        CredsCommand::List { env } => {
            let env = env_or_main(env.as_ref());
            for (key, masked) in store.list(env)? {
                println!("{key}={masked}");
            }
        }
        CredsCommand::Add { key, value, env } => {
            let env = env_or_main(env.as_ref());
            store.add_key(env, key, value)?;
            log.info(&format!("set {key} in '{env}'"));
        }
        CredsCommand::Get { key, env } => {
            println!("{}", store.get_key(env_or_main(env.as_ref()), key)?);
        }
        CredsCommand::Remove { key, env } => {
            let env = env_or_main(env.as_ref());
            store.remove_key(env, key)?;
            log.info(&format!("removed {key} from '{env}'"));
        }
        CredsCommand::Load { filter, env } => {
            let pairs = store.load_into_environment(env_or_main(env.as_ref()), filter.as_deref())?;
            for (key, value) in pairs {
                match export_line(&key, &value) {
                    Some(line) => println!("{line}"),
                    None => log.warn(&format!("skipping '{key}': not a valid variable name")),
                }
            }
        }
        CredsCommand::Export { file, filter, env } => {
            store.export_to_file(env_or_main(env.as_ref()), file, filter.as_deref())?;
        }
        CredsCommand::Copy {
            source,
            target,
            filter,
        } => {
            store.copy_keys(source, target, filter.as_deref())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_line_quotes_value() {
        assert_eq!(
            export_line("OPENAI_API_KEY", "sk-'x'").as_deref(),
            Some(r"export OPENAI_API_KEY='sk-'\''x'\'''")
        );
    }

    #[test]
    fn export_line_rejects_invalid_names() {
        assert!(export_line("1ABC", "v").is_none());
        assert!(export_line("MY-KEY", "v").is_none());
        assert!(export_line("", "v").is_none());
        assert!(export_line("_OK", "v").is_some());
    }

    #[test]
    fn missing_env_defaults_to_main() {
        assert_eq!(env_or_main(None), MAIN_ENV);
        let work = "work".to_string();
        assert_eq!(env_or_main(Some(&work)), "work");
    }
}
