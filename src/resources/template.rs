//! Template resource: `{{NAME}}` placeholders filled in interactively.
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use super::copy::CopyResource;
use super::helpers::fs;
use super::{
    Applicable, Resource, ResourceChange, ResourceState, apply_failed, backup_target,
    presence_state,
};
use crate::error::EntryError;
use crate::prompt::Prompt;

static PLACEHOLDER: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*)\}\}"));

fn placeholder_regex() -> Result<&'static Regex, EntryError> {
    PLACEHOLDER.as_ref().map_err(|e| EntryError::Apply {
        reason: format!("placeholder pattern: {e}"),
    })
}

/// Distinct placeholder names in `content`, in order of first appearance.
///
/// # Errors
///
/// Returns an error only if the placeholder pattern fails to compile.
pub fn placeholders(content: &str) -> Result<Vec<String>, EntryError> {
    let re = placeholder_regex()?;
    let mut names: Vec<String> = Vec::new();
    for caps in re.captures_iter(content) {
        if let Some(name) = caps.get(1).map(|m| m.as_str())
            && !names.iter().any(|n| n == name)
        {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

/// Replace every `{{NAME}}` in `content` with `values[NAME]`. Names without
/// a value are left as written.
///
/// # Errors
///
/// Returns an error only if the placeholder pattern fails to compile.
pub fn render(content: &str, values: &HashMap<String, String>) -> Result<String, EntryError> {
    let re = placeholder_regex()?;
    Ok(re
        .replace_all(content, |caps: &regex::Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            caps.get(1)
                .and_then(|m| values.get(m.as_str()))
                .map_or_else(|| whole.to_string(), Clone::clone)
        })
        .into_owned())
}

/// A file rendered from a template source.
#[derive(Clone)]
pub struct TemplateResource<'a> {
    /// Template file.
    pub source: PathBuf,
    /// Rendered destination.
    pub target: PathBuf,
    prompt: &'a dyn Prompt,
}

impl std::fmt::Debug for TemplateResource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateResource")
            .field("source", &self.source)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl<'a> TemplateResource<'a> {
    /// Create a template resource that asks `prompt` for placeholder values.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf, prompt: &'a dyn Prompt) -> Self {
        Self {
            source,
            target,
            prompt,
        }
    }
}

impl Applicable for TemplateResource<'_> {
    fn description(&self) -> String {
        format!("{} <= {} (template)", self.target.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange, EntryError> {
        if !self.source.is_file() {
            return Err(EntryError::InvalidSource {
                path: self.source.clone(),
                reason: "template source must be a file".to_string(),
            });
        }

        let bytes = std::fs::read(&self.source).map_err(|e| EntryError::Apply {
            reason: format!("read {}: {e}", self.source.display()),
        })?;
        let Ok(content) = String::from_utf8(bytes) else {
            return CopyResource::new(self.source.clone(), self.target.clone()).apply();
        };
        let names = placeholders(&content)?;
        if names.is_empty() {
            return CopyResource::new(self.source.clone(), self.target.clone()).apply();
        }

        fs::ensure_parent_dir(&self.target).map_err(apply_failed)?;
        let backup = backup_target(&self.target)?;

        let mut values = HashMap::with_capacity(names.len());
        for name in names {
            let value = self
                .prompt
                .input(&format!("Value for {{{{{name}}}}}"))
                .map_err(|e| EntryError::Apply {
                    reason: format!("no value for {name}: {e}"),
                })?;
            values.insert(name, value);
        }
        let rendered = render(&content, &values)?;

        if self.target.is_dir() && !self.target.is_symlink() {
            fs::remove_path(&self.target).map_err(apply_failed)?;
        }
        fs::write_atomic(&self.target, rendered.as_bytes(), fs::mode_of(&self.source))
            .map_err(apply_failed)?;

        Ok(ResourceChange::Applied { backup })
    }
}

impl Resource for TemplateResource<'_> {
    fn current_state(&self) -> Result<ResourceState, EntryError> {
        Ok(presence_state(&self.source, &self.target))
    }
}
