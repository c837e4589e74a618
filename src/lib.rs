//! Image generation for chat messages.
//!
//! Assistant messages can carry directives such as
//! `<!-- img-prompt="a cat on a windowsill" -->`. This crate finds them, asks an
//! OpenAI-compatible `/chat/completions` endpoint for an image per prompt and
//! replaces each directive with an embedded image.
//!
//! ```no_run
//! use imgsplice::{rewrite_message, EmbedStyle, GeneratorConfig, ImageClient};
//!
//! # async fn run() {
//! let config = GeneratorConfig::from_env();
//! let client = ImageClient::new(config);
//! let outcome = rewrite_message(
//!     r#"Here it is <!--img-prompt="a cat"-->"#,
//!     &client,
//!     EmbedStyle::Markdown,
//! )
//! .await;
//! if outcome.modified {
//!     println!("{}", outcome.text);
//! }
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod host;
pub mod logger;
pub mod models;
pub mod prompt;
pub mod rewriter;

pub use client::{
    decode_image, generate_image, ChatClient, CompletionsClient, ImageClient, ImageGenerator,
};
pub use config::{EmbedStyle, GeneratorConfig, PromptMode, SettingsOverrides};
pub use error::{ErrorKind, GenerationError, Result};
pub use host::{embedded_images, Atelier, HostAdapter, IncomingMessage, Notice, NoticeLevel};
pub use models::{
    ChatCompletionRequest, ChatMessage, GenerationRequest, GenerationResult, ImageRef, PromptMatch,
};
pub use prompt::{extract_direct_prompt, extract_directives, extract_smart_prompt};
pub use rewriter::{append_image, apply_generated_images, render_embed, rewrite_message, RewriteOutcome};
