use super::lexing::{lexeme_len, skip_ws};
use super::Token;

/// Representation of the input line as a sequence of tokens
///
/// The `TokenStream` holds the reference to the input and the tokens it was split into. It is
/// immutable: the matcher refers to tokens by index and never consumes the stream itself, which
/// lets any number of backtracking branches share one stream.
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    input: &'a str,
    tokens: Vec<Token<'a>>,
}

impl<'a> TokenStream<'a> {
    /// Splits the input into tokens.
    pub fn new(input: &'a str) -> Self {
        let mut tokens = Vec::new();
        let mut remaining = skip_ws(input);
        while !remaining.is_empty() {
            let start = input.len() - remaining.len();
            let len = lexeme_len(remaining);
            tokens.push(Token::new(&remaining[..len], start));
            remaining = skip_ws(&remaining[len..]);
        }
        TokenStream { input, tokens }
    }

    /// The input this stream was created from.
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Number of tokens in the stream.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the input contains nothing but whitespace.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns the token at the given index, if any.
    pub fn get(&self, index: usize) -> Option<Token<'a>> {
        self.tokens.get(index).copied()
    }

    /// Iterates over all tokens of the stream.
    pub fn iter(&self) -> impl Iterator<Item = Token<'a>> + '_ {
        self.tokens.iter().copied()
    }

    /// Byte offset in the input directly after `consumed` tokens have been matched
    ///
    /// This is the start of the first unmatched token, or the length of the input if all tokens
    /// have been matched. Whitespace separating a matched token from the next one is therefore
    /// counted as parsed.
    pub fn cursor(&self, consumed: usize) -> usize {
        match self.tokens.get(consumed) {
            Some(token) => token.start(),
            None => self.input.len(),
        }
    }

    /// Separates the trailing, possibly incomplete, token from the complete ones
    ///
    /// Returns a stream containing only the tokens that are followed by whitespace, and the text
    /// of the token being typed. The latter is empty if the input ends with whitespace.
    pub fn split_trailing(&self) -> (TokenStream<'a>, &'a str) {
        match self.tokens.last() {
            Some(last) if last.end() == self.input.len() => {
                let tokens = self.tokens[..self.tokens.len() - 1].to_vec();
                (
                    TokenStream {
                        input: self.input,
                        tokens,
                    },
                    last.text(),
                )
            }
            _ => (self.clone(), ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TokenStream;

    fn texts<'a>(stream: &TokenStream<'a>) -> Vec<&'a str> {
        stream.iter().map(|token| token.text()).collect()
    }

    #[test]
    fn empty_input() {
        let stream = TokenStream::new("   ");
        assert!(stream.is_empty());
        assert_eq!(stream.cursor(0), 3);
    }

    #[test]
    fn splits_tokens_with_offsets() {
        let stream = TokenStream::new("  cat 'a file.txt'  b ");
        assert_eq!(texts(&stream), vec!["cat", "'a file.txt'", "b"]);
        let starts: Vec<usize> = stream.iter().map(|token| token.start()).collect();
        assert_eq!(starts, vec![2, 6, 20]);
    }

    #[test]
    fn quotes_inside_words() {
        let stream = TokenStream::new("echo it's abc\"def\"");
        assert_eq!(texts(&stream), vec!["echo", "it's", "abc\"def\""]);
    }

    #[test]
    fn cursor_positions() {
        let stream = TokenStream::new("one two");
        assert_eq!(stream.cursor(0), 0);
        assert_eq!(stream.cursor(1), 4);
        assert_eq!(stream.cursor(2), 7);
        assert_eq!(stream.cursor(5), 7);
    }

    mod split_trailing {
        use super::*;

        #[test]
        fn trailing_fragment() {
            let stream = TokenStream::new("one tw");
            let (complete, fragment) = stream.split_trailing();
            assert_eq!(texts(&complete), vec!["one"]);
            assert_eq!(fragment, "tw");
        }

        #[test]
        fn trailing_whitespace() {
            let stream = TokenStream::new("one two ");
            let (complete, fragment) = stream.split_trailing();
            assert_eq!(texts(&complete), vec!["one", "two"]);
            assert_eq!(fragment, "");
        }

        #[test]
        fn unterminated_quote_is_fragment() {
            let stream = TokenStream::new("cat 'my fi");
            let (complete, fragment) = stream.split_trailing();
            assert_eq!(texts(&complete), vec!["cat"]);
            assert_eq!(fragment, "'my fi");
        }

        #[test]
        fn empty() {
            let stream = TokenStream::new("");
            let (complete, fragment) = stream.split_trailing();
            assert!(complete.is_empty());
            assert_eq!(fragment, "");
        }
    }
}
