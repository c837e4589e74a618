use crate::models::PromptMatch;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// The regex crate has no backreferences, so each quote style is its own branch.
pub(crate) static DIRECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<!--\s*img-prompt\s*=\s*(?:"(.*?)"|'(.*?)')\s*-->"#).unwrap()
});

/// Every directive in `text`, left to right. Each call scans from the start.
pub fn extract_directives(text: &str) -> impl Iterator<Item = PromptMatch> + '_ {
    DIRECTIVE_RE.captures_iter(text).filter_map(to_match)
}

fn to_match(caps: Captures<'_>) -> Option<PromptMatch> {
    let full_tag = caps.get(0)?.as_str().to_string();
    let (quote, prompt) = match (caps.get(1), caps.get(2)) {
        (Some(double), _) => ('"', double.as_str()),
        (None, Some(single)) => ('\'', single.as_str()),
        (None, None) => return None,
    };
    Some(PromptMatch {
        full_tag,
        quote,
        prompt: prompt.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompts(text: &str) -> Vec<String> {
        extract_directives(text).map(|m| m.prompt).collect()
    }

    #[test]
    fn test_both_quote_styles_match() {
        let double: Vec<_> = extract_directives(r#"<!--img-prompt="a"-->"#).collect();
        let single: Vec<_> = extract_directives("<!--img-prompt='a'-->").collect();

        assert_eq!(double.len(), 1);
        assert_eq!(double[0].prompt, "a");
        assert_eq!(double[0].quote, '"');
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].prompt, "a");
        assert_eq!(single[0].quote, '\'');
    }

    #[test]
    fn test_mismatched_quotes_do_not_match() {
        assert!(prompts(r#"<!--img-prompt="a'-->"#).is_empty());
        assert!(prompts(r#"<!--img-prompt='a"-->"#).is_empty());
    }

    #[test]
    fn test_whitespace_tolerance() {
        let tight: Vec<_> = extract_directives(r#"<!--img-prompt="x"-->"#).collect();
        let loose: Vec<_> = extract_directives(r#"<!-- img-prompt = "x" -->"#).collect();

        assert_eq!(tight[0].prompt, "x");
        assert_eq!(loose[0].prompt, "x");
        assert_eq!(loose[0].full_tag, r#"<!-- img-prompt = "x" -->"#);
    }

    #[test]
    fn test_opposite_quote_kept_literally() {
        assert_eq!(prompts(r#"<!--img-prompt='say "hi"'-->"#), vec![r#"say "hi""#]);
        assert_eq!(prompts(r#"<!--img-prompt="it's a cat"-->"#), vec!["it's a cat"]);
    }

    #[test]
    fn test_left_to_right_order_and_count() {
        let text = r#"one <!--img-prompt="first"--> two <!-- img-prompt='second' --> three <!--img-prompt="first"-->"#;
        assert_eq!(prompts(text), vec!["first", "second", "first"]);
    }

    #[test]
    fn test_no_directives() {
        assert_eq!(extract_directives("plain text <!-- comment -->").count(), 0);
    }

    #[test]
    fn test_rescan_is_independent() {
        let text = r#"<!--img-prompt="a"--> <!--img-prompt="b"-->"#;
        let mut first = extract_directives(text);
        assert_eq!(first.next().map(|m| m.prompt), Some("a".to_string()));
        assert_eq!(prompts(text), vec!["a", "b"]);
    }

    #[test]
    fn test_directive_does_not_span_lines() {
        assert!(prompts("<!--img-prompt=\"a\nb\"-->").is_empty());
    }
}
