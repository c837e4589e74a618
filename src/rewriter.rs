//! Writing generated images back into message text.

use crate::{
    client::ImageGenerator,
    config::EmbedStyle,
    error::GenerationError,
    models::{ImageRef, PromptMatch},
    prompt::extract_directives,
};

#[derive(Debug)]
pub struct RewriteOutcome {
    pub text: String,
    pub modified: bool,
    /// Directives whose generation failed; their tags are left in place.
    pub failures: Vec<(PromptMatch, GenerationError)>,
}

impl RewriteOutcome {
    fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            modified: false,
            failures: Vec::new(),
        }
    }
}

/// Render the image block that replaces a directive.
pub fn render_embed(prompt: &str, image: &ImageRef, style: EmbedStyle) -> String {
    match style {
        EmbedStyle::Markdown => format!("\n\n![{}]({})\n", prompt, image),
        EmbedStyle::Html => {
            let alt = escape_attr(prompt);
            format!(
                "\n\n<div class=\"imgsplice-image\"><img src=\"{}\" alt=\"{}\" title=\"{}\"></div>\n",
                escape_attr(image.as_str()),
                alt,
                alt
            )
        }
    }
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Generate an image for each match and substitute it for its tag.
///
/// Matches are handled one at a time, in order. A match whose tag is no longer
/// in the working text is skipped. A failed generation leaves its tag alone and
/// does not stop the remaining matches.
///
/// Identical tags are anchored by text, not position: each success fills the
/// first occurrence still present, so if an earlier duplicate failed, a later
/// success lands in that earlier spot.
pub async fn apply_generated_images<G>(
    text: &str,
    matches: impl IntoIterator<Item = PromptMatch>,
    generator: &G,
    style: EmbedStyle,
) -> RewriteOutcome
where
    G: ImageGenerator + ?Sized,
{
    let mut outcome = RewriteOutcome::unchanged(text);

    for directive in matches {
        if !outcome.text.contains(&directive.full_tag) {
            log::debug!("Tag already consumed, skipping: {}", directive.full_tag);
            continue;
        }

        match generator.generate(&directive.prompt).await {
            Ok(image) => {
                let embed = render_embed(&directive.prompt, &image, style);
                outcome.text = outcome.text.replacen(&directive.full_tag, &embed, 1);
                outcome.modified = true;
            }
            Err(e) => {
                log::error!("Image generation failed for '{}': {}", directive.prompt, e);
                outcome.failures.push((directive, e));
            }
        }
    }

    outcome
}

/// Extract every directive in `text` and replace them with images.
pub async fn rewrite_message<G>(text: &str, generator: &G, style: EmbedStyle) -> RewriteOutcome
where
    G: ImageGenerator + ?Sized,
{
    let matches: Vec<PromptMatch> = extract_directives(text).collect();
    if matches.is_empty() {
        log::debug!("No image tags found in message");
        return RewriteOutcome::unchanged(text);
    }
    log::info!("Found {} image prompt(s)", matches.len());
    apply_generated_images(text, matches, generator, style).await
}

/// Append an image block to the end of the message.
pub fn append_image(text: &str, prompt: &str, image: &ImageRef, style: EmbedStyle) -> String {
    let mut updated = String::with_capacity(text.len() + image.as_str().len() + prompt.len() + 16);
    updated.push_str(text);
    updated.push_str(&render_embed(prompt, image, style));
    updated
}
