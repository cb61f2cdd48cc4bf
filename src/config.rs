use crate::conversation::HistoryWindow;
use crate::error::{Result, StatementAnalystError};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalystConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub history_window: HistoryWindow,
    /// Cap on generated tokens per request; the provider default applies when unset.
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            history_window: HistoryWindow::All,
            max_output_tokens: None,
        }
    }
}

impl AnalystConfig {
    /// Read `GEMINI_API_KEY`, `GEMINI_MODEL` and `STATEMENT_HISTORY_WINDOW`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file; environment variables still take precedence.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: AnalystConfig = serde_json::from_str(&raw)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = var("GEMINI_API_KEY") {
            self.api_key = key;
        }
        if let Some(model) = var("GEMINI_MODEL") {
            self.model = model;
        }
        if let Some(window) = var("STATEMENT_HISTORY_WINDOW") {
            self.history_window = window.parse()?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(StatementAnalystError::InvalidConfig(
                "GEMINI_API_KEY must be set".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(StatementAnalystError::InvalidConfig(
                "model name must not be empty".to_string(),
            ));
        }
        if self.history_window == HistoryWindow::Recent(0) {
            return Err(StatementAnalystError::InvalidConfig(
                "history window of 0 turns drops all context; use at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("GEMINI_API_KEY", "secret"),
            ("STATEMENT_HISTORY_WINDOW", "6"),
        ]
        .into_iter()
        .collect();

        let mut config = AnalystConfig::default();
        config
            .apply_env(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.history_window, HistoryWindow::Recent(6));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_defaults_and_validation() {
        let config: AnalystConfig =
            serde_json::from_str(r#"{ "history_window": { "recent": 0 } }"#).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(matches!(
            config.validate(),
            Err(StatementAnalystError::InvalidConfig(_))
        ));

        let config: AnalystConfig =
            serde_json::from_str(r#"{ "api_key": "k", "history_window": "all" }"#).unwrap();
        assert!(config.validate().is_ok());
    }
}
