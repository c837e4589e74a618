use crate::error::{GenerationError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_COMMON_TAGS: &str = "masterpiece, best quality";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// How a generated image is written back into the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbedStyle {
    #[default]
    Markdown,
    Html,
}

/// How the manual "generate for this message" action derives its prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    #[default]
    Direct,
    Smart,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub common_tags: String,
    pub enabled: bool,
    pub timeout_ms: u64,
    pub embed_style: EmbedStyle,
    pub prompt_mode: PromptMode,
    /// Model used for smart-mode summaries; falls back to `model`.
    pub summary_model: Option<String>,
}

/// Settings as stored by the host. Every field is optional; missing keys keep
/// the defaults when merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsOverrides {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub common_tags: Option<String>,
    pub enabled: Option<bool>,
    pub timeout_ms: Option<u64>,
    pub embed_style: Option<EmbedStyle>,
    pub prompt_mode: Option<PromptMode>,
    pub summary_model: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            common_tags: DEFAULT_COMMON_TAGS.to_string(),
            enabled: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            embed_style: EmbedStyle::Markdown,
            prompt_mode: PromptMode::Direct,
            summary_model: None,
        }
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("common_tags", &self.common_tags)
            .field("enabled", &self.enabled)
            .field("timeout_ms", &self.timeout_ms)
            .field("embed_style", &self.embed_style)
            .field("prompt_mode", &self.prompt_mode)
            .field("summary_model", &self.summary_model)
            .finish()
    }
}

fn redact(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        format!("{}***", &secret.chars().take(3).collect::<String>())
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self::default().merged(SettingsOverrides::from_env())
    }

    /// Defaults (or the current values) overlaid with stored overrides.
    pub fn merged(mut self, overrides: SettingsOverrides) -> Self {
        if let Some(api_url) = overrides.api_url {
            self.api_url = api_url;
        }
        if let Some(api_key) = overrides.api_key {
            self.api_key = api_key;
        }
        if let Some(model) = overrides.model {
            self.model = model;
        }
        if let Some(common_tags) = overrides.common_tags {
            self.common_tags = common_tags;
        }
        if let Some(enabled) = overrides.enabled {
            self.enabled = enabled;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
        if let Some(embed_style) = overrides.embed_style {
            self.embed_style = embed_style;
        }
        if let Some(prompt_mode) = overrides.prompt_mode {
            self.prompt_mode = prompt_mode;
        }
        if overrides.summary_model.is_some() {
            self.summary_model = overrides.summary_model;
        }
        self
    }

    pub fn with_api(mut self, api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self.api_key = api_key.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_common_tags(mut self, tags: impl Into<String>) -> Self {
        self.common_tags = tags.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_embed_style(mut self, style: EmbedStyle) -> Self {
        self.embed_style = style;
        self
    }

    pub fn with_prompt_mode(mut self, mode: PromptMode) -> Self {
        self.prompt_mode = mode;
        self
    }

    pub fn with_summary_model(mut self, model: impl Into<String>) -> Self {
        self.summary_model = Some(model.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn summary_model(&self) -> &str {
        self.summary_model.as_deref().unwrap_or(&self.model)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn validate(&self) -> Result<()> {
        let base = self.base_url();
        if base.is_empty() {
            return Err(GenerationError::Config("API URL is required".into()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(GenerationError::Config(format!(
                "API URL must start with http:// or https://, got {}",
                base
            )));
        }
        if self.model.trim().is_empty() {
            return Err(GenerationError::Config("Model is required".into()));
        }
        if self.timeout_ms == 0 {
            return Err(GenerationError::Config(
                "Timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl SettingsOverrides {
    pub fn from_env() -> Self {
        SettingsOverrides {
            api_url: env::var("IMGSPLICE_API_URL").ok(),
            api_key: env::var("IMGSPLICE_API_KEY").ok(),
            model: env::var("IMGSPLICE_MODEL").ok(),
            common_tags: env::var("IMGSPLICE_COMMON_TAGS").ok(),
            enabled: env::var("IMGSPLICE_ENABLED").ok().map(|val| val == "true"),
            timeout_ms: env::var("IMGSPLICE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok()),
            embed_style: None,
            prompt_mode: None,
            summary_model: env::var("IMGSPLICE_SUMMARY_MODEL").ok(),
        }
    }

    /// Parse the host's stored settings blob. Unknown keys are ignored.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

impl From<&GeneratorConfig> for SettingsOverrides {
    fn from(config: &GeneratorConfig) -> Self {
        SettingsOverrides {
            api_url: Some(config.api_url.clone()),
            api_key: Some(config.api_key.clone()),
            model: Some(config.model.clone()),
            common_tags: Some(config.common_tags.clone()),
            enabled: Some(config.enabled),
            timeout_ms: Some(config.timeout_ms),
            embed_style: Some(config.embed_style),
            prompt_mode: Some(config.prompt_mode),
            summary_model: config.summary_model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert!(config.enabled);
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.common_tags, "masterpiece, best quality");
        assert_eq!(config.embed_style, EmbedStyle::Markdown);
        assert_eq!(config.summary_model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_merge_keeps_defaults_for_missing_keys() {
        let stored = json!({
            "apiUrl": "https://example.test/v1/",
            "apiKey": "sk-123",
            "enabled": false,
            "somethingElse": 42
        });
        let overrides = SettingsOverrides::from_json(&stored).unwrap();
        let config = GeneratorConfig::default().merged(overrides);

        assert_eq!(config.api_url, "https://example.test/v1/");
        assert_eq!(config.base_url(), "https://example.test/v1");
        assert_eq!(config.api_key, "sk-123");
        assert!(!config.enabled);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.common_tags, DEFAULT_COMMON_TAGS);
    }

    #[test]
    fn test_merge_empty_tags_override() {
        let overrides = SettingsOverrides {
            common_tags: Some(String::new()),
            embed_style: Some(EmbedStyle::Html),
            ..Default::default()
        };
        let config = GeneratorConfig::default().merged(overrides);
        assert_eq!(config.common_tags, "");
        assert_eq!(config.embed_style, EmbedStyle::Html);
    }

    #[test]
    fn test_roundtrip_through_overrides() {
        let config = GeneratorConfig::new()
            .with_api("http://localhost:9000", "key")
            .with_model("img-model")
            .with_summary_model("text-model")
            .with_prompt_mode(PromptMode::Smart);
        let restored = GeneratorConfig::default().merged(SettingsOverrides::from(&config));
        assert_eq!(restored, config);
        assert_eq!(restored.summary_model(), "text-model");
    }

    #[test]
    fn test_validate() {
        assert!(GeneratorConfig::default().validate().is_ok());
        assert!(GeneratorConfig::default()
            .with_api("ftp://nope", "")
            .validate()
            .is_err());
        assert!(GeneratorConfig::default().with_timeout_ms(0).validate().is_err());
        assert!(GeneratorConfig::default().with_model("  ").validate().is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = GeneratorConfig::default().with_api(DEFAULT_API_URL, "sk-supersecret");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("supersecret"));
        assert!(printed.contains("sk-***"));
    }
}
