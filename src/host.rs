//! Glue between the generation core and the chat application embedding it.
//!
//! The host owns settings persistence, the transcript and its UI. It hands
//! those capabilities to [`Atelier`] through a [`HostAdapter`]; the service
//! reads the configuration fresh on every call and keeps no state of its own.

use crate::{
    client::CompletionsClient,
    config::{GeneratorConfig, PromptMode, SettingsOverrides},
    error::{GenerationError, Result},
    models::{GenerationResult, ImageRef},
    prompt::{extract_direct_prompt, extract_directives, extract_smart_prompt},
    rewriter::{append_image, apply_generated_images, RewriteOutcome},
};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;

/// Prompt used by the connection test.
pub const TEST_PROMPT: &str = "cute anime girl chibi test";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub id: u64,
    pub text: String,
    pub is_user: bool,
}

impl IncomingMessage {
    pub fn assistant(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            is_user: false,
        }
    }

    pub fn user(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            is_user: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A user-visible notification (a toast, a status line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Capabilities the host application provides.
pub trait HostAdapter: Send + Sync {
    /// The stored settings; missing values fall back to defaults.
    fn get_config(&self) -> SettingsOverrides;

    fn save_config(&self, config: &GeneratorConfig) -> Result<()>;

    /// Persist the new text of a message and re-render it.
    fn emit_update(&self, message_id: u64, text: &str) -> Result<()>;

    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => log::error!("{}", notice.message),
            _ => log::info!("{}", notice.message),
        }
    }
}

pub struct Atelier<H> {
    host: H,
    http: Client,
}

impl<H: HostAdapter> Atelier<H> {
    pub fn new(host: H) -> Self {
        Self::with_http(host, Client::new())
    }

    pub fn with_http(host: H, http: Client) -> Self {
        Self { host, http }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> GeneratorConfig {
        GeneratorConfig::default().merged(self.host.get_config())
    }

    /// Apply `change` to the current settings, validate and persist them.
    pub fn update_config(&self, change: impl FnOnce(&mut GeneratorConfig)) -> Result<GeneratorConfig> {
        let mut config = self.config();
        change(&mut config);
        config.validate()?;
        self.host.save_config(&config)?;
        Ok(config)
    }

    fn client(&self, config: GeneratorConfig) -> CompletionsClient {
        CompletionsClient::with_http(self.http.clone(), config)
    }

    fn checked_config(&self) -> Result<GeneratorConfig> {
        self.validated(self.config())
    }

    fn validated(&self, config: GeneratorConfig) -> Result<GeneratorConfig> {
        if let Err(e) = config.validate() {
            self.host.notify(Notice::error(format!("Error: {}", e)));
            return Err(e);
        }
        Ok(config)
    }

    /// Replace the directives of a freshly received assistant message.
    ///
    /// Returns `None` when nothing was attempted: generation disabled, a user
    /// message, or no directives in the text.
    pub async fn on_message_received(&self, message: &IncomingMessage) -> Result<Option<RewriteOutcome>> {
        let config = self.config();
        if !config.enabled || message.is_user {
            return Ok(None);
        }

        log::debug!("Inspecting message {}", message.id);
        let matches: Vec<_> = extract_directives(&message.text).collect();
        if matches.is_empty() {
            log::debug!("No image tags found in message {}", message.id);
            return Ok(None);
        }

        let config = self.validated(config)?;
        let style = config.embed_style;
        log::info!("Found {} image prompt(s) in message {}", matches.len(), message.id);
        self.host.notify(Notice::info(format!(
            "Found {} image prompt(s). Generating...",
            matches.len()
        )));

        let client = self.client(config);
        let outcome = apply_generated_images(&message.text, matches, client.image(), style).await;

        for (_, e) in &outcome.failures {
            self.host.notify(Notice::error(format!("Error: {}", e)));
        }
        if outcome.modified {
            self.host.emit_update(message.id, &outcome.text)?;
        }
        Ok(Some(outcome))
    }

    /// Generate one image for the whole message and append it.
    ///
    /// `mode` overrides the configured prompt mode.
    pub async fn generate_for_message(
        &self,
        message: &IncomingMessage,
        mode: Option<PromptMode>,
    ) -> Result<String> {
        let config = self.checked_config()?;
        let mode = mode.unwrap_or(config.prompt_mode);
        let style = config.embed_style;
        let client = self.client(config);

        let prompt = match mode {
            PromptMode::Direct => extract_direct_prompt(&message.text),
            PromptMode::Smart => {
                self.host.notify(Notice::info("Summarising message..."));
                extract_smart_prompt(&message.text, client.chat()).await
            }
        };
        if prompt.is_empty() {
            let e = GenerationError::ExtractionFailed;
            self.host.notify(Notice::error(format!("Error: {}", e)));
            return Err(e);
        }

        self.host.notify(Notice::info("Generating image..."));
        let image = match client.image().generate_image(&prompt).await {
            Ok(image) => image,
            Err(e) => {
                self.host.notify(Notice::error(format!("Error: {}", e)));
                return Err(e);
            }
        };

        let text = append_image(&message.text, &prompt, &image, style);
        self.host.emit_update(message.id, &text)?;
        self.host.notify(Notice::success("Image added"));
        Ok(text)
    }

    /// Send a fixed prompt to check the endpoint and credentials.
    pub async fn test_connection(&self) -> GenerationResult {
        let config = self.checked_config()?;
        self.host.notify(Notice::info("Sending test request..."));

        match self.client(config).image().generate_image(TEST_PROMPT).await {
            Ok(image) => {
                self.host.notify(Notice::success("Test successful"));
                Ok(image)
            }
            Err(e) => {
                self.host.notify(Notice::error(format!("Error: {}", e)));
                Err(e)
            }
        }
    }
}

static EMBED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"!\[[^\]]*\]\(([^)\s]+)\)|<img src="([^"]+)""#).unwrap());

/// Image references embedded in `text`, in order of appearance.
pub fn embedded_images(text: &str) -> Vec<ImageRef> {
    EMBED_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| ImageRef::new(m.as_str()))
        .collect()
}
