use serde::{Deserialize, Serialize};

/// One directive found in a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMatch {
    /// Exact substring matched in the source text, used as the replacement anchor.
    pub full_tag: String,
    /// Quote character that delimited the prompt.
    pub quote: char,
    pub prompt: String,
}
