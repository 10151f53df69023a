use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Try to load from .specscope.yml in current directory
        let config_path = PathBuf::from(".specscope.yml");
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        // Try alternative names
        let alt_config_path = PathBuf::from(".specscope.yaml");
        if alt_config_path.exists() {
            let content = std::fs::read_to_string(&alt_config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        // Try in home directory
        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".specscope.yml");
            if home_config.exists() {
                let content = std::fs::read_to_string(&home_config)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        // Return default config if no file found
        Ok(Config::default())
    }

    pub fn merge_with_cli(&mut self, cli_model: Option<String>) {
        if let Some(model) = cli_model {
            self.model = model;
        }
    }
}

fn default_model() -> String {
    "gemini-3-pro-preview".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> usize {
    8192
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = serde_yaml::from_str("api_key: abc").unwrap();
        assert_eq!(config.model, "gemini-3-pro-preview");
        assert_eq!(config.max_tokens, 8192);
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert!(config.base_url.is_none());
    }

    #[test]
    fn cli_model_overrides_config_model() {
        let mut config = Config::default();
        config.merge_with_cli(Some("gemini-3-flash".to_string()));
        assert_eq!(config.model, "gemini-3-flash");

        config.merge_with_cli(None);
        assert_eq!(config.model, "gemini-3-flash");
    }
}
