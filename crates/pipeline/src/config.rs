//! Batch configuration.
//!
//! Loaded from YAML:
//!
//! ```yaml
//! parallel: true
//! output_dir: ${COMPOSER_OUT:-./out}
//! recipes:
//!   - true_color
//!   - preset: dust
//!   - name: ir_window
//!     description: "C13 inverted"
//!     red:   { source: [{ band: 13 }], clip: { lower: 180.0, upper: 320.0 }, invert: true }
//!     green: { source: [{ band: 13 }], clip: { lower: 180.0, upper: 320.0 }, invert: true }
//!     blue:  { source: [{ band: 13 }], clip: { lower: 180.0, upper: 320.0 }, invert: true }
//! ```
//!
//! Supports `${VAR}` and `${VAR:-default}` substitution in the file, and the
//! `COMPOSER_OUTPUT_DIR` / `COMPOSER_PARALLEL` environment overrides.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use compositor::{preset, preset_names, CompositeRecipe};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const OUTPUT_DIR_ENV: &str = "COMPOSER_OUTPUT_DIR";
pub const PARALLEL_ENV: &str = "COMPOSER_PARALLEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unknown preset '{name}' (known: {known})")]
    UnknownPreset { name: String, known: String },

    #[error("recipe '{0}' is defined more than once")]
    DuplicateRecipe(String),

    #[error("recipe names cannot be empty")]
    EmptyRecipeName,

    #[error("environment variable {0} not set")]
    UnsetVariable(String),

    #[error("unclosed variable substitution: ${{{0}")]
    UnclosedSubstitution(String),

    #[error("invalid value '{value}' for {name}")]
    InvalidValue { name: String, value: String },
}

/// One configured composite: a preset by name, or a full inline recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipeEntry {
    Name(String),
    Preset { preset: String },
    Inline(CompositeRecipe),
}

impl RecipeEntry {
    pub fn preset(name: impl Into<String>) -> Self {
        RecipeEntry::Preset {
            preset: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_recipes")]
    pub recipes: Vec<RecipeEntry>,
    /// Evaluate recipes on the rayon thread pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

fn default_recipes() -> Vec<RecipeEntry> {
    preset_names()
        .iter()
        .map(|name| RecipeEntry::preset(*name))
        .collect()
}

fn default_parallel() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            recipes: default_recipes(),
            parallel: default_parallel(),
            output_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a YAML document, expanding `${VAR}` references.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(content)?;
        let config: PipelineConfig = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content)?;
        debug!(path = %path.display(), recipes = config.recipes.len(), "Loaded pipeline config");
        Ok(config)
    }

    /// Apply `COMPOSER_OUTPUT_DIR` and `COMPOSER_PARALLEL` from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(OUTPUT_DIR_ENV).filter(|v| !v.is_empty()) {
            self.output_dir = Some(PathBuf::from(dir));
        }
        if let Some(value) = lookup(PARALLEL_ENV).filter(|v| !v.is_empty()) {
            self.parallel = parse_bool(&value).ok_or_else(|| ConfigError::InvalidValue {
                name: PARALLEL_ENV.to_string(),
                value,
            })?;
        }
        Ok(self)
    }

    /// Check that every entry resolves and that names are unique.
    pub fn validate(&self) -> Result<(), ConfigError> {
        resolve_recipes(self).map(|_| ())
    }
}

/// Turn configured entries into recipes, in configuration order.
pub fn resolve_recipes(config: &PipelineConfig) -> Result<Vec<CompositeRecipe>, ConfigError> {
    let mut seen = HashSet::new();
    let mut recipes = Vec::with_capacity(config.recipes.len());

    for entry in &config.recipes {
        let recipe = match entry {
            RecipeEntry::Name(name) | RecipeEntry::Preset { preset: name } => {
                preset(name).ok_or_else(|| ConfigError::UnknownPreset {
                    name: name.clone(),
                    known: preset_names().join(", "),
                })?
            }
            RecipeEntry::Inline(recipe) => recipe.clone(),
        };

        if recipe.name.trim().is_empty() {
            return Err(ConfigError::EmptyRecipeName);
        }
        if !seen.insert(recipe.name.clone()) {
            return Err(ConfigError::DuplicateRecipe(recipe.name));
        }
        recipes.push(recipe);
    }

    Ok(recipes)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand `${VAR}` and `${VAR:-default}` references.
fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut var_expr = String::new();
            let mut brace_count = 1;

            while brace_count > 0 {
                match chars.next() {
                    Some('{') => {
                        brace_count += 1;
                        var_expr.push('{');
                    }
                    Some('}') => {
                        brace_count -= 1;
                        if brace_count > 0 {
                            var_expr.push('}');
                        }
                    }
                    Some(c) => var_expr.push(c),
                    None => return Err(ConfigError::UnclosedSubstitution(var_expr)),
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String, ConfigError> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).map_err(|_| ConfigError::UnsetVariable(expr.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_vars_simple() {
        std::env::set_var("PIPELINE_TEST_VAR", "test_value");
        let result = expand_env_vars("prefix_${PIPELINE_TEST_VAR}_suffix").unwrap();
        assert_eq!(result, "prefix_test_value_suffix");
    }

    #[test]
    fn test_expand_env_vars_with_default() {
        std::env::remove_var("PIPELINE_NONEXISTENT_VAR");
        let result = expand_env_vars("value_${PIPELINE_NONEXISTENT_VAR:-default}_end").unwrap();
        assert_eq!(result, "value_default_end");
    }

    #[test]
    fn test_expand_env_vars_missing_required() {
        std::env::remove_var("PIPELINE_REQUIRED_VAR");
        assert!(matches!(
            expand_env_vars("${PIPELINE_REQUIRED_VAR}"),
            Err(ConfigError::UnsetVariable(name)) if name == "PIPELINE_REQUIRED_VAR"
        ));
    }

    #[test]
    fn test_expand_env_vars_unclosed() {
        assert!(matches!(
            expand_env_vars("dir: ${OOPS"),
            Err(ConfigError::UnclosedSubstitution(_))
        ));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_default_config_lists_every_preset() {
        let config = PipelineConfig::default();
        assert!(config.parallel);
        let names: Vec<String> = resolve_recipes(&config)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, preset_names());
    }
}
