//! chunkrel Configuration Management
//!
//! Handles configuration from TOML files and environment variables.
//! The grammar, tag overrides and action-verb allow-list are all supplied
//! here; the engine has none of them built in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Chunk grammar and pass count
    pub grammar: GrammarConfig,

    /// Closed-class tag overrides
    pub tagging: TaggingConfig,

    /// Relation extractor labels and allow-list
    pub extractor: ExtractorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (environment, test maps)
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Grammar
        if let Some(passes) = lookup("CHUNKREL_PASSES") {
            self.grammar.passes = passes
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "CHUNKREL_PASSES".to_string(),
                    value: passes.clone(),
                })?;
        }
        if let Some(label) = lookup("CHUNKREL_ROOT_LABEL") {
            if label.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "CHUNKREL_ROOT_LABEL".to_string(),
                    value: label,
                });
            }
            self.grammar.root_label = label.trim().to_string();
        }

        // Action verbs (comma-separated)
        if let Some(verbs) = lookup("CHUNKREL_ACTION_VERBS") {
            self.extractor.action_verbs = verbs
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Logging
        if let Some(level) = lookup("CHUNKREL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("CHUNKREL_LOG_JSON") {
            self.logging.json_format = match json.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "CHUNKREL_LOG_JSON".to_string(),
                        value: json,
                    })
                }
            };
        }

        Ok(self)
    }
}

/// Chunk grammar configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    /// Number of passes of the whole rule list over a sentence
    pub passes: usize,

    /// Label of the branch wrapping a chunked sentence
    pub root_label: String,

    /// Rule text in the grammar mini-language
    pub source: String,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            passes: 1,
            root_label: "S".to_string(),
            source: String::new(),
        }
    }
}

/// Tag rewriter configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TaggingConfig {
    /// Lower-cased word -> forced tag
    pub overrides: BTreeMap<String, String>,
}

/// Relation extractor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Labels treated as noun phrases (subjects and objects)
    pub noun_phrase_labels: Vec<String>,

    /// Labels treated as verb phrases (candidate actions)
    pub verb_phrase_labels: Vec<String>,

    /// Labels of nested clauses walked recursively
    pub clause_labels: Vec<String>,

    /// Relative pronoun kept as a subject placeholder
    pub relative_pronoun: String,

    /// Verb substrings that count as actions
    pub action_verbs: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            noun_phrase_labels: vec!["NP".to_string(), "MNP".to_string()],
            verb_phrase_labels: vec!["VP".to_string()],
            clause_labels: vec![
                "CLAUSE".to_string(),
                "THATCLAUSE".to_string(),
                "WHETHERCLAUSE".to_string(),
            ],
            relative_pronoun: "which".to_string(),
            action_verbs: Vec::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.grammar.passes, 1);
        assert_eq!(config.grammar.root_label, "S");
        assert!(config.grammar.source.is_empty());
        assert!(config.extractor.action_verbs.is_empty());
        assert_eq!(config.extractor.relative_pronoun, "which");
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::default()
            .apply_overrides(lookup_from(&[
                ("CHUNKREL_PASSES", "3"),
                ("CHUNKREL_ACTION_VERBS", "inhibit, activate,,bind"),
                ("CHUNKREL_LOG_JSON", "true"),
            ]))
            .unwrap();

        assert_eq!(config.grammar.passes, 3);
        assert_eq!(
            config.extractor.action_verbs,
            vec!["inhibit", "activate", "bind"]
        );
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_invalid_pass_count() {
        let err = AppConfig::default()
            .apply_overrides(lookup_from(&[("CHUNKREL_PASSES", "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "CHUNKREL_PASSES"));
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[grammar]
passes = 2
source = "NP: {{<DT>?<NN.*>+}}"

[tagging.overrides]
but = "BUT"

[extractor]
action_verbs = ["inhibit"]
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.grammar.passes, 2);
        assert_eq!(config.grammar.root_label, "S");
        assert_eq!(config.grammar.source, "NP: {<DT>?<NN.*>+}");
        assert_eq!(config.tagging.overrides.get("but").map(String::as_str), Some("BUT"));
        assert_eq!(config.extractor.noun_phrase_labels, vec!["NP", "MNP"]);
    }

    #[test]
    fn test_from_file_missing() {
        let err = AppConfig::from_file("/nonexistent/chunkrel.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError { .. }));
    }
}
