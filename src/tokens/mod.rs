//! Splitting of the input line into tokens
//!
//! The matcher sees the input as a sequence of tokens. A token is any sequence of characters
//! separated by whitespace. If a token should include whitespace, the user may enclose it in a
//! pair of quotes (either double or single); quotes inside a quoted token can be escaped with a
//! backslash (`\`). Quotes are only special at the start of a token: `it's` and `abc"def"` are
//! single tokens. A quoted token ends at its closing quote, so `'abc'def` is two tokens. The token text handed to node patterns is the raw text, quotes included;
//! [`unquote`] strips them.
//!
//! Every token remembers its byte offset in the original input so that the parsing
//! [`Context`](crate::Context) can report exactly how much of the input was consumed.

mod lexing;
mod stream;

pub use stream::TokenStream;

use std::borrow::Cow;

/// A single token of the input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    text: &'a str,
    start: usize,
}

impl<'a> Token<'a> {
    pub(crate) fn new(text: &'a str, start: usize) -> Self {
        Token { text, start }
    }

    /// Raw text of the token as it appears in the input.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Byte offset of the token's first character.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset directly after the token's last character.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    /// The token's text with quotes and escape characters removed.
    pub fn unquote(&self) -> Cow<'a, str> {
        unquote(self.text)
    }
}

/// Removes surrounding quotes from the text and resolves escaped characters inside of them
///
/// Text that does not start with a quote is returned as is. An unterminated quoted string is
/// unquoted up to the end of the text.
pub fn unquote(text: &str) -> Cow<'_, str> {
    let first_char = text.chars().next();
    if let Some(quote @ ('\'' | '"')) = first_char {
        let inner = &text[1..];
        let inner = match inner.strip_suffix(quote) {
            Some(stripped) if !is_escaped_end(stripped) => stripped,
            _ => inner,
        };

        let mut string = String::with_capacity(inner.len());
        let mut escaped = false;
        for ch in inner.chars() {
            match ch {
                ch if escaped => {
                    string.push(ch);
                    escaped = false;
                }
                '\\' => escaped = true,
                ch => string.push(ch),
            }
        }
        Cow::Owned(string)
    } else {
        Cow::Borrowed(text)
    }
}

fn is_escaped_end(text: &str) -> bool {
    let backslashes = text.chars().rev().take_while(|ch| *ch == '\\').count();
    backslashes % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::unquote;
    use std::borrow::Cow;

    macro_rules! test_unquote {
        ($name:ident, $text:literal => $variant:ident($result:literal)) => {
            #[test]
            fn $name() {
                let result = unquote($text);
                assert_eq!(result, Cow::Borrowed($result));
                assert!(matches!(result, Cow::$variant(_)));
            }
        };
    }

    test_unquote!(empty, "" => Borrowed(""));
    test_unquote!(non_empty, "abc" => Borrowed("abc"));
    test_unquote!(quoted_empty_single, "''" => Owned(""));
    test_unquote!(quoted_empty_double, "\"\"" => Owned(""));
    test_unquote!(quoted_non_empty_single, "'abc \\\' def \\\" fgh'" => Owned("abc \' def \" fgh"));
    test_unquote!(quoted_non_empty_double, "\"abc \\\' def \\\" fgh\"" => Owned("abc \' def \" fgh"));
    test_unquote!(quoted_not_terminated_single, "'abc" => Owned("abc"));
    test_unquote!(quoted_not_terminated_double, "\"abc" => Owned("abc"));
    test_unquote!(escaped_closing_quote, "'abc\\'" => Owned("abc'"));
}
