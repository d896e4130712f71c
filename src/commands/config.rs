//! Command: `config install | check | scan | list`.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::ConfigCommand;
use crate::config::RegistryStore;
use crate::installer::{Installer, scan};
use crate::logging::Logger;
use crate::prompt::Prompt;

/// Run a `config` verb.
///
/// # Errors
///
/// Returns an error if the registry cannot be loaded, a check finds
/// out-of-date entries, or a scan fails. Failed install entries are
/// reported in the summary without failing the command.
#[allow(clippy::print_stdout)]
pub fn run(cmd: &ConfigCommand, setup: &CommandSetup, prompt: &dyn Prompt, log: &Logger) -> Result<()> {
    let store = RegistryStore::new(setup.settings.registry_dir.clone());
    let installer = Installer::new(setup.root.clone(), setup.dirs.clone(), prompt, log)
        .strict(setup.strict);

    match cmd {
        ConfigCommand::Install { registry } => {
            let report = installer.install(&store, registry)?;
            report.record_into(log);
            log.print_summary();
            let failures = report.failures();
            if failures > 0 {
                log.warn(&format!("{failures} of {} entries failed", report.entries.len()));
            }
            Ok(())
        }
        ConfigCommand::Check { registry } => {
            let report = installer.check(&store, registry)?;
            report.record_into(log);
            log.print_summary();
            if !report.passed() {
                anyhow::bail!("registry '{registry}' is not fully installed");
            }
            Ok(())
        }
        ConfigCommand::Scan => {
            log.stage("Scanning for existing dotfiles");
            let candidates = scan::default_candidates(&setup.dirs);
            let adopted = scan::scan(&setup.root, &candidates, prompt, log)?;
            if adopted.is_empty() {
                log.info("nothing adopted");
                return Ok(());
            }
            log.info(&format!(
                "adopted {} file(s); add this to a registry under {}:",
                adopted.len(),
                store.dir().display()
            ));
            println!("{}", scan::snippet(&adopted)?);
            Ok(())
        }
        ConfigCommand::List => {
            let registries = installer.list(&store)?;
            if registries.is_empty() {
                log.info(&format!("no registries in {}", store.dir().display()));
            }
            for r in registries {
                println!("{:<20} {:>3} entries  {}", r.name, r.entries, r.description);
            }
            Ok(())
        }
    }
}
