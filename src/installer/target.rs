//! Target path expansion: `~`, `$VAR` and `${VAR}`.
use std::convert::Infallible;
use std::path::{Path, PathBuf};

/// A target path after expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Expanded path; unknown variables remain as written.
    pub path: PathBuf,
    /// Variables that had no value, in order of appearance.
    pub unresolved: Vec<String>,
}

/// Expand `raw` using `home` for `~` and `lookup` for variables.
///
/// Unknown variables are left verbatim and reported in
/// [`ResolvedTarget::unresolved`].
pub fn expand(raw: &str, home: &Path, lookup: impl Fn(&str) -> Option<String>) -> ResolvedTarget {
    let mut unresolved: Vec<String> = Vec::new();
    let home = home.to_string_lossy().into_owned();

    let expanded = shellexpand::full_with_context(
        raw,
        || Some(home),
        |name: &str| -> Result<Option<String>, Infallible> {
            let value = lookup(name);
            if value.is_none() && !unresolved.iter().any(|n| n == name) {
                unresolved.push(name.to_string());
            }
            Ok(value)
        },
    )
    .map_or_else(|e| match e.cause {}, std::borrow::Cow::into_owned);

    ResolvedTarget {
        path: PathBuf::from(expanded),
        unresolved,
    }
}
