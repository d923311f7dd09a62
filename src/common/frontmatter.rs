//! Markdown documents with a YAML frontmatter block.
//!
//! Frontmatter is held as an ordered `serde_yaml::Mapping`, so keys this crate
//! does not know about survive a rewrite in their original position. The body
//! is everything after the closing `---` line and round-trips byte for byte.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

const DELIMITER: &str = "---";

#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("Invalid frontmatter format: {0}")]
    InvalidFormat(String),
    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// A parsed note file: ordered frontmatter plus the raw body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub frontmatter: Mapping,
    pub body: String,
}

impl Document {
    #[must_use]
    pub fn new(frontmatter: Mapping, body: impl Into<String>) -> Self {
        Self {
            frontmatter,
            body: body.into(),
        }
    }

    /// Look up a string-valued frontmatter key.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.frontmatter.get(key).and_then(Value::as_str)
    }

    /// Look up a boolean frontmatter key, treating absence as `false`.
    #[must_use]
    pub fn get_flag(&self, key: &str) -> bool {
        self.frontmatter
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Set a key, keeping its position if it already exists.
    pub fn set(&mut self, key: &str, value: Value) {
        self.frontmatter.insert(Value::String(key.to_string()), value);
    }
}

/// Parse note content into a [`Document`].
///
/// Content without a leading `---` line has no frontmatter; the whole input
/// becomes the body.
pub fn parse_document(content: &str) -> Result<Document, FrontmatterError> {
    let mut lines = content.split_inclusive('\n');
    let opens = lines
        .next()
        .is_some_and(|first| first.trim_end_matches(['\r', '\n']) == DELIMITER);
    if !opens {
        return Ok(Document::new(Mapping::new(), content));
    }

    let mut offset = lines_len(content.split_inclusive('\n').take(1));
    let yaml_start = offset;
    for line in lines {
        if line.trim_end_matches(['\r', '\n']) == DELIMITER {
            let yaml = content.get(yaml_start..offset).unwrap_or_default();
            let body = content.get(offset + line.len()..).unwrap_or_default();
            return Ok(Document::new(parse_mapping(yaml)?, body));
        }
        offset += line.len();
    }

    Err(FrontmatterError::InvalidFormat(
        "Missing closing '---' for frontmatter".to_string(),
    ))
}

/// Render a [`Document`] back into note content.
pub fn render_document(document: &Document) -> Result<String, FrontmatterError> {
    if document.frontmatter.is_empty() {
        return Ok(document.body.clone());
    }
    let yaml = serde_yaml::to_string(&Value::Mapping(document.frontmatter.clone()))?;
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{}", document.body))
}

fn parse_mapping(yaml: &str) -> Result<Mapping, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(FrontmatterError::InvalidFormat(
            "Frontmatter must be a key-value mapping".to_string(),
        )),
    }
}

fn lines_len<'a>(lines: impl Iterator<Item = &'a str>) -> usize {
    lines.map(str::len).sum()
}

#[cfg(test)]
#[path = "frontmatter_tests.rs"]
mod tests;
