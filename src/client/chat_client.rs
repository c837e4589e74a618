use crate::{
    client::{decoder::decode_message_content, post_completion},
    config::GeneratorConfig,
    error::{GenerationError, Result},
    models::{chat_completions_url, ChatCompletionRequest, ChatMessage},
};
use reqwest::Client;

/// Plain text completions against the same endpoint used for images.
#[derive(Clone)]
pub struct ChatClient {
    http: Client,
    config: GeneratorConfig,
}

impl ChatClient {
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_http(Client::new(), config)
    }

    pub fn with_http(http: Client, config: GeneratorConfig) -> Self {
        Self { http, config }
    }

    /// Send `messages` to the summary model and return the assistant text.
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.config.summary_model().to_string(),
            messages,
            stream: false,
        };
        let endpoint = chat_completions_url(self.config.base_url());

        log::debug!("Chat completion with model {}", request.model);

        let body = post_completion(
            &self.http,
            &endpoint,
            &self.config.api_key,
            &request,
            self.config.timeout_ms,
        )
        .await?;

        decode_message_content(&body)
            .map(|content| content.trim().to_string())
            .ok_or(GenerationError::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat_for(server: &MockServer) -> ChatClient {
        ChatClient::new(GeneratorConfig::default().with_api(server.uri(), "sk"))
    }

    #[tokio::test]
    async fn test_returns_trimmed_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "  castle, dusk \n"}}]
            })))
            .mount(&server)
            .await;

        let text = chat_for(&server)
            .complete(vec![ChatMessage::user("hi")])
            .await
            .unwrap();
        assert_eq!(text, "castle, dusk");
    }

    #[tokio::test]
    async fn test_missing_content_is_empty_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = chat_for(&server)
            .complete(vec![ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyCompletion);
        assert_eq!(err.to_string(), "Completion response had no message content");
    }
}
