pub(crate) fn skip_ws(input: &str) -> &str {
    input.trim_start()
}

/// Returns the byte length of the lexeme at the start of `input`
///
/// `input` must not start with a whitespace. A quoted lexeme ends at the matching unescaped quote
/// (or at the end of the input if the quote is never closed); an unquoted lexeme ends at the
/// first whitespace, quote characters inside it are ordinary characters.
pub(crate) fn lexeme_len(input: &str) -> usize {
    let mut chars = input.char_indices();
    match chars.next() {
        Some((_, quote @ ('"' | '\''))) => {
            let mut escaped = false;
            for (index, ch) in chars {
                if escaped {
                    escaped = false;
                } else {
                    match ch {
                        ch if ch == quote => return index + ch.len_utf8(),
                        '\\' => escaped = true,
                        _ => (),
                    }
                }
            }
            input.len()
        }
        Some(_) => {
            for (index, ch) in chars {
                if ch.is_whitespace() {
                    return index;
                }
            }
            input.len()
        }
        None => 0,
    }
}
