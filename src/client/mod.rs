pub mod chat_client;
pub mod decoder;
pub mod image_client;

use crate::{
    config::GeneratorConfig,
    error::{GenerationError, Result},
    models::{ChatCompletionRequest, GenerationResult},
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub use chat_client::ChatClient;
pub use decoder::{decode_image, decode_message_content};
pub use image_client::{generate_image, ImageClient};

/// Anything that can turn a prompt into an image reference.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> GenerationResult;
}

/// Image and chat access to one OpenAI-compatible endpoint, sharing a single
/// connection pool.
#[derive(Clone)]
pub struct CompletionsClient {
    image_client: ImageClient,
    chat_client: ChatClient,
}

impl CompletionsClient {
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_http(Client::new(), config)
    }

    pub fn with_http(http: Client, config: GeneratorConfig) -> Self {
        Self {
            image_client: ImageClient::with_http(http.clone(), config.clone()),
            chat_client: ChatClient::with_http(http, config),
        }
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn chat(&self) -> &ChatClient {
        &self.chat_client
    }

    pub fn config(&self) -> &GeneratorConfig {
        self.image_client.config()
    }
}

/// POST a completion request and return the parsed body.
///
/// The timeout covers sending and reading the whole body. The body is read as
/// text first so non-JSON error pages can be reported.
pub(crate) async fn post_completion(
    http: &Client,
    url: &str,
    api_key: &str,
    body: &ChatCompletionRequest,
    timeout_ms: u64,
) -> Result<Value> {
    let exchange = async {
        let response = http.post(url).bearer_auth(api_key).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok::<_, reqwest::Error>((status, text))
    };

    let (status, text) = match tokio::time::timeout(Duration::from_millis(timeout_ms), exchange).await {
        Ok(Ok(exchanged)) => exchanged,
        Ok(Err(e)) if e.is_timeout() => return Err(GenerationError::Timeout { timeout_ms }),
        Ok(Err(e)) => {
            log::error!("Request to {} failed: {}", url, e);
            return Err(e.into());
        }
        Err(_) => {
            log::error!("Request to {} timed out after {}ms", url, timeout_ms);
            return Err(GenerationError::Timeout { timeout_ms });
        }
    };

    if !status.is_success() {
        log::error!("API error body ({}): {}", status, text);
        return Err(GenerationError::api(status.as_u16(), &text));
    }

    serde_json::from_str(&text).map_err(|e| {
        log::error!("JSON parse error from {}: {}", url, e);
        log::debug!("Response body: {}", text);
        GenerationError::invalid_response(&text)
    })
}
