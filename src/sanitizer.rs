// WHY: explicit scanner states instead of chained regex substitutions;
// the substitution ordering of the original lint was the source of its
// string-vs-regex-literal mis-strips

use tracing::debug;

/// Lexical region the scanner is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    LineComment,
    BlockComment,
    RegexLiteral,
    StringSingle,
    StringDouble,
}

/// Produces a copy of `text` with comments removed and string/regex literals
/// replaced by neutral placeholders (`''`, `""`, `//`).
///
/// The output has the same line count as the input, so a pattern match
/// against the sanitized text still points at the right source line. This is
/// a best-effort heuristic lexer: delimiters are only checked against a
/// single preceding backslash, and a literal left open at end of line is
/// flushed back verbatim rather than guessed at.
pub fn sanitize(text: &str) -> String {
    debug!("Sanitizing {} bytes of source text", text.len());

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut state = ScanState::Code;
    // Raw span of the literal or comment currently open. Kept so an
    // unterminated span can be restored verbatim.
    let mut pending = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match state {
            ScanState::Code => match c {
                '/' if chars.get(i + 1) == Some(&'/') => {
                    state = ScanState::LineComment;
                    i += 2;
                    continue;
                }
                '/' if chars.get(i + 1) == Some(&'*') => {
                    state = ScanState::BlockComment;
                    pending.clear();
                    pending.push_str("/*");
                    i += 2;
                    continue;
                }
                // A backslash-escaped delimiter in code position opens nothing.
                '/' | '\'' | '"' if out.ends_with('\\') => out.push(c),
                '/' => {
                    state = ScanState::RegexLiteral;
                    pending.clear();
                    pending.push('/');
                }
                '\'' => {
                    state = ScanState::StringSingle;
                    pending.clear();
                    pending.push('\'');
                }
                '"' => {
                    state = ScanState::StringDouble;
                    pending.clear();
                    pending.push('"');
                }
                _ => out.push(c),
            },
            ScanState::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    state = ScanState::Code;
                }
            }
            ScanState::BlockComment => {
                pending.push(c);
                // pending holds at least "/**/" once a real closer exists;
                // the length guard keeps "/*/" from closing on its opener.
                if pending.len() >= 4 && pending.ends_with("*/") {
                    // Keep the newlines so line numbering survives.
                    out.extend(pending.chars().filter(|&ch| ch == '\n'));
                    pending.clear();
                    state = ScanState::Code;
                }
            }
            ScanState::RegexLiteral => {
                if c == '\n' {
                    // No closing delimiter on this line: not a regex literal
                    // after all, restore the span untouched.
                    out.push_str(&pending);
                    out.push('\n');
                    state = ScanState::Code;
                } else if c == '/' && !pending.ends_with('\\') {
                    out.push_str("//");
                    state = ScanState::Code;
                } else {
                    pending.push(c);
                }
            }
            ScanState::StringSingle => {
                if c == '\n' {
                    out.push_str(&pending);
                    out.push('\n');
                    state = ScanState::Code;
                } else if c == '\'' && !pending.ends_with('\\') {
                    out.push_str("''");
                    state = ScanState::Code;
                } else {
                    pending.push(c);
                }
            }
            ScanState::StringDouble => {
                if c == '\n' {
                    out.push_str(&pending);
                    out.push('\n');
                    state = ScanState::Code;
                } else if c == '"' && !pending.ends_with('\\') {
                    out.push_str("\"\"");
                    state = ScanState::Code;
                } else {
                    pending.push(c);
                }
            }
        }
        i += 1;
    }

    // Spans still open at EOF never had a terminator; restore them.
    match state {
        ScanState::Code | ScanState::LineComment => {}
        ScanState::BlockComment
        | ScanState::RegexLiteral
        | ScanState::StringSingle
        | ScanState::StringDouble => out.push_str(&pending),
    }

    debug!("Sanitized text: {} bytes in, {} bytes out", text.len(), out.len());
    out
}
