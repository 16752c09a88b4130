use super::types::{Config, LogLevel};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_PATHS: &[&str] = &[
    "./chefbot.toml",
    "~/.chefbot/config.toml",
    "~/.config/chefbot/config.toml",
];

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// First existing file among the default locations, or the defaults.
    pub fn load_default() -> Result<Self> {
        for path in DEFAULT_PATHS {
            let expanded = shellexpand::tilde(path);
            let path = Path::new(expanded.as_ref());
            if path.exists() {
                debug!(path = %path.display(), "Loading config");
                return Self::load_from_file(path);
            }
        }

        Ok(Config::default())
    }

    pub fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    fn merge_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(level) = var("CHEFBOT_LOG_LEVEL").as_deref().and_then(LogLevel::parse) {
            self.general.log_level = level;
        }

        if let Some(dir) = var("CHEFBOT_DATA_DIR") {
            self.general.data_dir = dir.into();
        }

        if let Some(url) = var("CHEFBOT_BASE_URL") {
            self.llm.base_url = url;
        }

        if let Some(model) = var("CHEFBOT_MODEL") {
            self.llm.default_model = model;
        }

        if let Some(group) = var("CHEFBOT_GROUP") {
            self.observability.group = group;
        }

        if let Some(key) = var(&self.llm.api_key_env).filter(|k| !k.trim().is_empty()) {
            self.llm.api_key = Some(key);
        }

        self
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    pub fn api_key(&self) -> Result<String> {
        self.llm
            .api_key
            .clone()
            .ok_or_else(|| Error::MissingConfig(self.llm.api_key_env.clone()))
    }

    pub fn data_dir(&self) -> PathBuf {
        expand(self.general.data_dir.as_str())
    }

    pub fn trace_dir(&self) -> PathBuf {
        expand(self.observability.trace_dir.as_str())
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.log_level, LogLevel::Info);
        assert_eq!(config.llm.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.llm.api_key_env, "GROQ_API_KEY");
        assert!(config.observability.file_sink);
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [general]
            log_level = "debug"

            [llm]
            default_model = "llama-3.1-8b-instant"

            [observability]
            group = "Groupe_Dupont"
            file_sink = false
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.general.log_level, LogLevel::Debug);
        assert_eq!(config.llm.default_model, "llama-3.1-8b-instant");
        assert_eq!(config.llm.judge_model, "openai/gpt-oss-120b");
        assert_eq!(config.observability.group, "Groupe_Dupont");
        assert!(!config.observability.file_sink);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[general\nlog_level=").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_merge_vars() {
        let vars: HashMap<&str, &str> = [
            ("CHEFBOT_LOG_LEVEL", "warning"),
            ("CHEFBOT_MODEL", "m"),
            ("CHEFBOT_GROUP", "G1"),
            ("GROQ_API_KEY", "gsk_test"),
        ]
        .into_iter()
        .collect();

        let config = Config::default().merge_vars(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.general.log_level, LogLevel::Warn);
        assert_eq!(config.llm.default_model, "m");
        assert_eq!(config.observability.group, "G1");
        assert_eq!(config.api_key().unwrap(), "gsk_test");
    }

    #[test]
    fn test_missing_api_key() {
        let config = Config::default().merge_vars(|_| None);
        let err = config.api_key().unwrap_err();
        assert_eq!(err.to_string(), "Missing required config: set GROQ_API_KEY");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chefbot.toml");
        let mut config = Config::default();
        config.observability.group = "Groupe_Test".into();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.observability.group, "Groupe_Test");
    }
}
