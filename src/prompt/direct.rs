use super::directive::DIRECTIVE_RE;
use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_DIRECT_PROMPT_CHARS: usize = 500;

static MARKDOWN_IMAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());
static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static REMNANT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"img-prompt\s*=\s*(?:"[^"]*"|'[^']*')?"#).unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// The message reduced to plain prose usable as a prompt.
pub fn extract_direct_prompt(text: &str) -> String {
    let text = DIRECTIVE_RE.replace_all(text, " ");
    let text = MARKDOWN_IMAGE_RE.replace_all(&text, " ");
    let text = HTML_TAG_RE.replace_all(&text, " ");
    let text = REMNANT_RE.replace_all(&text, " ");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    truncate(text.trim())
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_DIRECT_PROMPT_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_DIRECT_PROMPT_CHARS).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_markup_and_collapses_whitespace() {
        let text = "<p>A  <b>red</b>\n\n fox</p> ![old](http://x/y.png) <!--img-prompt=\"z\"--> jumps";
        assert_eq!(extract_direct_prompt(text), "A red fox jumps");
    }

    #[test]
    fn test_strips_unterminated_directive_remnant() {
        assert_eq!(
            extract_direct_prompt(r#"hello img-prompt="half done world"#),
            r#"hello "half done world"#
        );
        assert_eq!(extract_direct_prompt(r#"a img-prompt = 'b' c"#), "a c");
    }

    #[test]
    fn test_truncates_long_text() {
        let text = "word ".repeat(200);
        let prompt = extract_direct_prompt(&text);
        assert_eq!(prompt.chars().count(), MAX_DIRECT_PROMPT_CHARS + 3);
        assert!(prompt.ends_with("..."));
    }

    #[test]
    fn test_exact_limit_not_truncated() {
        let text = "a".repeat(MAX_DIRECT_PROMPT_CHARS);
        assert_eq!(extract_direct_prompt(&text), text);
    }

    #[test]
    fn test_empty_after_cleaning() {
        assert_eq!(extract_direct_prompt("  <br/> ![x](y)  "), "");
    }
}
