use anyhow::Result;
use regex_automata::meta::Regex;
use tracing::debug;

/// A reported trailing-comma occurrence in sanitized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailingCommaMatch {
    /// Byte offset of the match start in the sanitized text
    pub start: usize,
    /// Byte offset of the match end in the sanitized text
    pub end: usize,
    /// The matched span, ending in the comma/bracket pair
    pub text: String,
}

/// Finds commas immediately preceding a closing `}` or `]`.
///
/// Expects sanitized text (see [`crate::sanitizer::sanitize`]) so that commas
/// inside comments, strings, or regex literals never trigger a report.
pub struct TrailingCommaDetector {
    pattern: Regex,
}

impl TrailingCommaDetector {
    pub fn new() -> Result<Self> {
        // Content, a comma, optional whitespace (which may cross newlines),
        // then a closing brace or bracket.
        let pattern = Regex::new(r"(.*,\s*[}\]])")?;
        Ok(Self { pattern })
    }

    /// Leftmost match in the sanitized text, if any.
    ///
    /// Only the first occurrence per input is reported; one diagnostic per
    /// file is enough to flag it for cleanup.
    pub fn first_match(&self, sanitized: &str) -> Option<TrailingCommaMatch> {
        self.pattern.find(sanitized).map(|m| {
            debug!("Trailing comma match at bytes {}..{}", m.start(), m.end());
            TrailingCommaMatch {
                start: m.start(),
                end: m.end(),
                text: sanitized[m.range()].to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> TrailingCommaDetector {
        TrailingCommaDetector::new().expect("Detector creation should succeed")
    }

    #[test]
    fn test_trailing_comma_before_brace_across_lines() {
        let m = detector()
            .first_match("var x = {a: 1,\n};")
            .expect("Should report the dangling comma");
        assert_eq!(m.text, "var x = {a: 1,\n}");
    }

    #[test]
    fn test_no_trailing_comma_no_match() {
        assert!(detector().first_match("var x = {a: 1};").is_none());
    }

    #[test]
    fn test_comma_not_before_bracket_no_match() {
        assert!(detector().first_match("f(a, b);\ng(c, d);\n").is_none());
    }

    #[test]
    fn test_trailing_comma_before_square_bracket_same_line() {
        let m = detector()
            .first_match("var a = [1, 2,];")
            .expect("Should report the dangling comma");
        assert_eq!(m.text, "var a = [1, 2,]");
    }

    #[test]
    fn test_whitespace_between_comma_and_bracket() {
        let m = detector()
            .first_match("var a = [1,   \n   ];")
            .expect("Should report the dangling comma");
        assert!(m.text.ends_with(']'));
        assert!(m.text.starts_with("var a = [1,"));
    }

    #[test]
    fn test_only_first_occurrence_reported() {
        let text = "a = [1,];\nb = {x: 2,\n};\n";
        let m = detector().first_match(text).expect("Should match");
        assert_eq!(m.text, "a = [1,]");
        assert_eq!(m.start, 0);
    }

    #[test]
    fn test_empty_input() {
        assert!(detector().first_match("").is_none());
    }
}
