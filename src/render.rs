//! Template rendering for packaging manifests.
//!
//! Placeholders have the form `{{key}}`. Tokens come from a JSON object,
//! given either as a file path or as literal JSON text.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{BuildstampError, Result};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("placeholder pattern is valid"));

/// Token names mapped to literal replacement strings.
///
/// Tokens keep their insertion order, which is also the replacement order:
/// a value that contains a later token's placeholder gets that placeholder
/// filled, one that contains an earlier token's does not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderConfig {
    tokens: Vec<(String, String)>,
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a token, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Replace the value of an existing key in place, or append a new one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.tokens.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.tokens.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.tokens
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn tokens(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tokens.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Load tokens from a JSON file path, or from the input itself as JSON
    pub fn load(input: &str) -> Result<Self> {
        let path = Path::new(input);
        if path.is_file() {
            let text = fs::read_to_string(path)?;
            return Self::from_json(&text)
                .map_err(|e| BuildstampError::render(format!("{}: {}", path.display(), e)));
        }
        Self::from_json(input).map_err(|_| {
            BuildstampError::render("config is not a valid file path or a JSON string")
        })
    }

    /// Parse a JSON object in document order; strings are used verbatim,
    /// everything else as its compact JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| BuildstampError::render(format!("invalid JSON: {}", e)))?;
        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(BuildstampError::render(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let mut config = RenderConfig::new();
        for (key, value) in object {
            let rendered = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            config.insert(key, rendered);
        }
        Ok(config)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Template content from a file if `input` names one, else the literal text
pub fn load_template(input: &str) -> Result<String> {
    let path = Path::new(input);
    if path.is_file() {
        return Ok(fs::read_to_string(path)?);
    }
    Ok(input.to_string())
}

/// Replace every `{{key}}` occurrence with its value, in insertion order
pub fn fill_template(config: &RenderConfig, template: &str) -> String {
    config
        .tokens()
        .fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{{{}}}}}", key), value)
        })
}

/// Placeholder names still present in rendered text
pub fn unresolved_placeholders(rendered: &str) -> Vec<String> {
    let mut names: Vec<String> = PLACEHOLDER
        .captures_iter(rendered)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Renders one template file to one output file
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    config: RenderConfig,
}

impl TemplateRenderer {
    pub fn new(config: RenderConfig) -> Self {
        TemplateRenderer { config }
    }

    /// Render in memory, warning about placeholders left unresolved
    pub fn render_str(&self, template: &str) -> String {
        let rendered = fill_template(&self.config, template);
        for name in unresolved_placeholders(&rendered) {
            tracing::warn!(placeholder = %name, "template placeholder has no value");
        }
        rendered
    }

    /// Read `template`, fill it, and write the result to `output`
    pub fn render_to(&self, template: &Path, output: &Path) -> Result<()> {
        let text = fs::read_to_string(template).map_err(|e| {
            BuildstampError::render(format!("cannot read template {}: {}", template.display(), e))
        })?;
        let rendered = self.render_str(&text);
        fs::write(output, rendered).map_err(|e| {
            BuildstampError::render(format!("cannot write {}: {}", output.display(), e))
        })?;
        tracing::info!(
            template = %template.display(),
            output = %output.display(),
            "rendered manifest"
        );
        Ok(())
    }
}
