use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{ClipwiseError, Result};

const BUILTIN_REPLY: &str = "Reply to the following $context message in a $style tone. \
Make sure the reply says: $keyword\n\nThe message is:\n$content";

const BUILTIN_REWRITE: &str =
    "Rewrite the following text in a $style tone, the way a natural English speaker would:\n\n$content";

/// Placeholders: `$$`, `$name`, `${name}`.
const PLACEHOLDER: &str =
    r"\$(?:(?P<escaped>\$)|(?P<named>[_a-zA-Z][_a-zA-Z0-9]*)|\{(?P<braced>[_a-zA-Z][_a-zA-Z0-9]*)\})";

/// Why a prompt could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    NotFound,
    MissingParam(String),
}

/// Prompt templates by name: `<dir>/<name>.txt` first, then the built-ins.
pub struct PromptLibrary {
    dir: Option<PathBuf>,
    placeholder: Regex,
}

impl PromptLibrary {
    pub fn new(dir: Option<PathBuf>) -> Result<Self> {
        let placeholder = Regex::new(PLACEHOLDER).map_err(|e| ClipwiseError::Backend {
            reason: format!("invalid placeholder pattern: {e}"),
        })?;
        Ok(Self { dir, placeholder })
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Look up a template's source text.
    pub fn source(&self, name: &str) -> Option<String> {
        // Template names come off the wire; never let them walk the filesystem.
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return None;
        }

        if let Some(dir) = &self.dir {
            let path = dir.join(format!("{}.txt", name));
            match std::fs::read_to_string(&path) {
                Ok(text) => return Some(text),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!("failed to read prompt {}: {}", path.display(), e);
                    return None;
                }
            }
        }

        match name {
            "reply" => Some(BUILTIN_REPLY.to_string()),
            "rewrite" => Some(BUILTIN_REWRITE.to_string()),
            _ => None,
        }
    }

    /// Render the named template with `params`.
    pub fn render(
        &self,
        name: &str,
        params: &BTreeMap<String, String>,
    ) -> std::result::Result<String, PromptError> {
        let source = self.source(name).ok_or(PromptError::NotFound)?;
        self.substitute(&source, params)
    }

    /// Substitute placeholders. A `$` that starts no placeholder is kept as is.
    pub fn substitute(
        &self,
        source: &str,
        params: &BTreeMap<String, String>,
    ) -> std::result::Result<String, PromptError> {
        let mut out = String::with_capacity(source.len());
        let mut last = 0;
        for caps in self.placeholder.captures_iter(source) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&source[last..whole.start()]);
            if caps.name("escaped").is_some() {
                out.push('$');
            } else if let Some(name) = caps.name("named").or_else(|| caps.name("braced")) {
                let value = params
                    .get(name.as_str())
                    .ok_or_else(|| PromptError::MissingParam(name.as_str().to_string()))?;
                out.push_str(value);
            }
            last = whole.end();
        }
        out.push_str(&source[last..]);
        Ok(out)
    }
}
