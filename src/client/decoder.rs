use crate::models::ImageRef;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static MARKDOWN_IMAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[.*?\]\((.*?)\)").unwrap());

/// Pull an image reference out of a completion response.
///
/// Dedicated image endpoints answer with `data[0].url` or `data[0].b64_json`;
/// chat endpoints put a markdown image or a bare URL in the assistant message.
/// The first shape found wins, in that order.
pub fn decode_image(body: &Value) -> Option<ImageRef> {
    if let Some(url) = non_empty_str(body.pointer("/data/0/url")) {
        return Some(ImageRef::new(url));
    }
    if let Some(b64) = non_empty_str(body.pointer("/data/0/b64_json")) {
        return Some(ImageRef::from_base64_png(b64));
    }

    let content = body.pointer("/choices/0/message/content")?.as_str()?;
    let embedded = MARKDOWN_IMAGE_RE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|url| !url.is_empty());
    if let Some(url) = embedded {
        return Some(ImageRef::new(url));
    }
    if content.starts_with("http") || content.starts_with("data:image") {
        return Some(ImageRef::new(content));
    }
    None
}

/// Text of the first assistant message, if any.
pub fn decode_message_content(body: &Value) -> Option<&str> {
    body.pointer("/choices/0/message/content")?.as_str()
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
