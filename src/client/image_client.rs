use crate::{
    client::{decoder::decode_image, post_completion, ImageGenerator},
    config::GeneratorConfig,
    error::GenerationError,
    logger,
    models::{GenerationRequest, GenerationResult},
};
use async_trait::async_trait;
use reqwest::Client;
use uuid::Uuid;

#[derive(Clone)]
pub struct ImageClient {
    http: Client,
    config: GeneratorConfig,
}

impl ImageClient {
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_http(Client::new(), config)
    }

    pub fn with_http(http: Client, config: GeneratorConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// One request, one outcome. Never retried.
    pub async fn generate_image(&self, prompt: &str) -> GenerationResult {
        let request = GenerationRequest::new(prompt, &self.config);
        self.send(&request).await
    }

    pub async fn send(&self, request: &GenerationRequest) -> GenerationResult {
        let request_id = Uuid::new_v4().to_string();
        let endpoint = request.endpoint();
        let _timer = logger::timer(&format!("image generation [req:{}]", request_id));

        log::info!("Generating image with model {} [req:{}]", request.model, request_id);
        log::debug!("Requesting {} with prompt: {}", endpoint, request.full_prompt());

        let body = post_completion(
            &self.http,
            &endpoint,
            &request.api_key,
            &request.body(),
            request.timeout_ms,
        )
        .await?;

        match decode_image(&body) {
            Some(image) => {
                log::info!("Image received [req:{}]", request_id);
                Ok(image)
            }
            None => {
                log::warn!("No image found in response [req:{}]: {}", request_id, body);
                Err(GenerationError::NoImageFound)
            }
        }
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn generate(&self, prompt: &str) -> GenerationResult {
        self.generate_image(prompt).await
    }
}

/// Generate a single image for `prompt` with a throwaway client.
pub async fn generate_image(prompt: &str, config: &GeneratorConfig) -> GenerationResult {
    ImageClient::new(config.clone()).generate_image(prompt).await
}
