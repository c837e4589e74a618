//! Turning message text into image prompts.
//!
//! Directives are explicit `<!-- img-prompt="..." -->` markers left by the
//! assistant. When a message has none, the manual action derives a prompt from
//! the whole message, either by cleaning the text or by asking the model for a
//! summary.

pub mod direct;
pub mod directive;
pub mod smart;

pub use direct::{extract_direct_prompt, MAX_DIRECT_PROMPT_CHARS};
pub use directive::extract_directives;
pub use smart::{extract_smart_prompt, SMART_PROMPT_INSTRUCTION};
