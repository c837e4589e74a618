use crate::config::GeneratorConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body posted to `/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

/// Everything needed for one image generation call. Built fresh per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    pub common_tags: Option<String>,
    pub endpoint_base: String,
    pub api_key: String,
    pub timeout_ms: u64,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, config: &GeneratorConfig) -> Self {
        let tags = config.common_tags.trim();
        Self {
            prompt: prompt.into(),
            model: config.model.clone(),
            common_tags: (!tags.is_empty()).then(|| tags.to_string()),
            endpoint_base: config.base_url().to_string(),
            api_key: config.api_key.clone(),
            timeout_ms: config.timeout_ms,
        }
    }

    /// The prompt with the common tags appended.
    pub fn full_prompt(&self) -> String {
        match &self.common_tags {
            Some(tags) => format!("{}, {}", self.prompt, tags),
            None => self.prompt.clone(),
        }
    }

    pub fn endpoint(&self) -> String {
        chat_completions_url(&self.endpoint_base)
    }

    pub fn body(&self) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(self.full_prompt())],
            stream: false,
        }
    }
}

pub fn chat_completions_url(base: &str) -> String {
    format!("{}/chat/completions", base.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_prompt_appends_tags() {
        let config = GeneratorConfig::default().with_common_tags("masterpiece");
        let request = GenerationRequest::new("a cat", &config);
        assert_eq!(request.full_prompt(), "a cat, masterpiece");
    }

    #[test]
    fn test_full_prompt_without_tags() {
        let config = GeneratorConfig::default().with_common_tags("   ");
        let request = GenerationRequest::new("a cat", &config);
        assert_eq!(request.common_tags, None);
        assert_eq!(request.full_prompt(), "a cat");
    }

    #[test]
    fn test_endpoint_and_body() {
        let config = GeneratorConfig::default()
            .with_api("https://example.test/v1/", "sk")
            .with_model("m1")
            .with_common_tags("");
        let request = GenerationRequest::new("dog", &config);
        assert_eq!(request.endpoint(), "https://example.test/v1/chat/completions");

        let body = serde_json::to_value(request.body()).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "m1",
                "messages": [{"role": "user", "content": "dog"}],
                "stream": false
            })
        );
    }
}
