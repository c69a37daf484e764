//! Bracketed reference scanning.
//!
//! Calculations reference fields as `[name]` or `[source].[name]`. A `]`
//! inside a name is written `]]`, and names may contain `[`, so a reference
//! runs from `[` to the first `]` that is not part of a `]]` pair.

/// A bracketed reference found in calculation text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketToken<'a> {
    /// Byte offset of the opening `[`
    pub start: usize,
    /// Byte offset one past the closing `]`
    pub end: usize,
    /// The token text, brackets included
    pub text: &'a str,
}

/// Find every bracketed reference in `text`, left to right.
///
/// When no unpaired `]` closes a reference, it ends at the first `]` after the
/// opening bracket instead; an opening bracket with no `]` at all is skipped.
#[must_use]
pub fn bracket_tokens(text: &str) -> Vec<BracketToken<'_>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'[' {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        let mut first_close = None;
        let mut close = None;
        while j < bytes.len() {
            if bytes[j] == b']' {
                first_close.get_or_insert(j);
                if bytes.get(j + 1) == Some(&b']') {
                    j += 2;
                    continue;
                }
                close = Some(j);
                break;
            }
            j += 1;
        }

        match close.or(first_close) {
            Some(end) => {
                tokens.push(BracketToken {
                    start: i,
                    end: end + 1,
                    text: &text[i..=end],
                });
                i = end + 1;
            }
            None => i += 1,
        }
    }

    tokens
}

/// Whether the token is the source half of a qualified `[source].[field]`.
#[must_use]
pub fn is_qualifier(text: &str, token: &BracketToken<'_>) -> bool {
    text[token.end..].starts_with(".[")
}

/// Whether the token is the field half of a qualified `[source].[field]`.
#[must_use]
pub fn is_qualified(text: &str, token: &BracketToken<'_>) -> bool {
    text[..token.start].ends_with("].")
}
