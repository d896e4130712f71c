//! Command: print version information.

/// Print the workstation version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("workstation {}", crate::logging::version());
}
