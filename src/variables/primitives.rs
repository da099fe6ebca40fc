use super::{invalid, VariableKind};
use crate::error::ValueError;
use crate::tokens::unquote;
use crate::value::Value;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::borrow::Cow;
use std::num::IntErrorKind;

/// Any single unquoted token
#[derive(Debug, Clone, Copy, Default)]
pub struct Text;

impl VariableKind for Text {
    fn name(&self) -> &'static str {
        "text"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        Some(r"\S+".into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        Ok(Value::from(text))
    }
}

/// An identifier: a letter or an underscore followed by word characters
#[derive(Debug, Clone, Copy, Default)]
pub struct Word;

impl VariableKind for Word {
    fn name(&self) -> &'static str {
        "word"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        Some(r"(?i)[A-Z_]\w*".into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        Ok(Value::from(text))
    }
}

/// Either a bare word or a quoted string with escapes
///
/// The stored value has its quotes removed and escape sequences resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuotedString;

impl VariableKind for QuotedString {
    fn name(&self) -> &'static str {
        "string"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        Some(r#"\w+|"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#.into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        Ok(Value::Str(unquote(text).into_owned()))
    }
}

/// A signed 64-bit integer
#[derive(Debug, Clone, Copy, Default)]
pub struct Integer;

impl VariableKind for Integer {
    fn name(&self) -> &'static str {
        "integer"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        Some(r"[-+]?\d+".into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        text.parse().map(Value::Int).map_err(|error| {
            let message: Option<Cow<'static, str>> = match error.kind() {
                IntErrorKind::PosOverflow => Some("too large".into()),
                IntErrorKind::NegOverflow => Some("too small".into()),
                _ => None,
            };
            ValueError::invalid(text, message).expected(self.name())
        })
    }
}

/// A floating point number
#[derive(Debug, Clone, Copy, Default)]
pub struct Float;

pub(super) const FLOAT_PATTERN: &str = r"[-+]?[0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?";

impl VariableKind for Float {
    fn name(&self) -> &'static str {
        "real number"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        Some(FLOAT_PATTERN.into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        text.parse()
            .map(Value::Float)
            .map_err(|_| invalid(text, self))
    }
}

const TRUE_WORDS: [&str; 7] = ["true", "yes", "aye", "enable", "enabled", "on", "1"];
const FALSE_WORDS: [&str; 6] = ["false", "no", "disable", "disabled", "off", "0"];

/// A boolean spelled as one of the common words, case-insensitively
#[derive(Debug, Clone, Copy, Default)]
pub struct Boolean;

impl VariableKind for Boolean {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        let words: Vec<&str> = TRUE_WORDS.iter().chain(FALSE_WORDS.iter()).copied().collect();
        Some(format!("(?i){}", words.join("|")).into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        let lower = text.to_lowercase();
        if TRUE_WORDS.contains(&lower.as_str()) {
            Ok(Value::Bool(true))
        } else if FALSE_WORDS.contains(&lower.as_str()) {
            Ok(Value::Bool(false))
        } else {
            Err(invalid(text, self))
        }
    }

    fn candidates(&self, text: &str) -> Vec<String> {
        ["true", "false"]
            .iter()
            .filter(|word| word.starts_with(text))
            .map(|word| format!("{} ", word))
            .collect()
    }
}

/// A literal keyword that also records itself in the collected variables
///
/// The keyword matches the node's name, which is also the stored value. This is useful for a set
/// of alternative flags collected under one variable name.
#[derive(Debug, Clone, Copy, Default)]
pub struct Keyword;

impl VariableKind for Keyword {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        None
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        Ok(Value::from(text))
    }
}

/// A `key=value` pair
///
/// The key is a sequence of word characters, the value is any non-empty text. The separator is
/// `=` unless configured otherwise.
#[derive(Debug, Clone)]
pub struct KeyValue {
    separator: String,
}

impl KeyValue {
    pub fn new() -> Self {
        KeyValue::with_separator("=")
    }

    pub fn with_separator(separator: impl Into<String>) -> Self {
        KeyValue {
            separator: separator.into(),
        }
    }
}

impl Default for KeyValue {
    fn default() -> Self {
        KeyValue::new()
    }
}

impl VariableKind for KeyValue {
    fn name(&self) -> &'static str {
        "key-value pair"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        Some(format!(r"\w+{}\S+", regex::escape(&self.separator)).into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        match text.split_once(self.separator.as_str()) {
            Some((key, value)) if !key.is_empty() && !value.is_empty() => {
                Ok(Value::Pair(key.to_string(), value.to_string()))
            }
            _ => Err(invalid(text, self)),
        }
    }
}

/// Base64 encoded binary data
///
/// The encoding must be padded to a multiple of four characters with `=`. The stored value is
/// the decoded data.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64;

impl VariableKind for Base64 {
    fn name(&self) -> &'static str {
        "base64 data"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        let pattern = concat!(
            "[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=|",
            "(?:[A-Za-z0-9+/]{4})+(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?",
        );
        Some(pattern.into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        STANDARD.decode(text).map(Value::Bytes).map_err(|error| {
            ValueError::invalid(text, Some(error.to_string().into())).expected(self.name())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::convert;
    use rstest::rstest;

    #[rstest]
    #[case("report.txt", Some(Value::from("report.txt")))]
    #[case("'a b'", None)]
    fn text(#[case] input: &str, #[case] expected: Option<Value>) {
        assert_eq!(convert(&Text, "file", input), expected);
    }

    #[rstest]
    #[case("a123", Some(Value::from("a123")))]
    #[case("_private", Some(Value::from("_private")))]
    #[case("123", None)]
    #[case("a-b", None)]
    fn word(#[case] input: &str, #[case] expected: Option<Value>) {
        assert_eq!(convert(&Word, "name", input), expected);
    }

    #[rstest]
    #[case("foo_bar", Some(Value::from("foo_bar")))]
    #[case("\"foo bar\"", Some(Value::from("foo bar")))]
    #[case(r#"'it\'s'"#, Some(Value::from("it's")))]
    #[case("\"unterminated", None)]
    #[case("a.b", None)]
    fn quoted_string(#[case] input: &str, #[case] expected: Option<Value>) {
        assert_eq!(convert(&QuotedString, "value", input), expected);
    }

    #[rstest]
    #[case("12345", Some(Value::Int(12345)))]
    #[case("-7", Some(Value::Int(-7)))]
    #[case("+7", Some(Value::Int(7)))]
    #[case("123.45", None)]
    #[case("99999999999999999999", None)]
    fn integer(#[case] input: &str, #[case] expected: Option<Value>) {
        assert_eq!(convert(&Integer, "count", input), expected);
    }

    #[test]
    fn integer_overflow_message() {
        let error = Integer.parse("99999999999999999999").unwrap_err();
        assert_eq!(
            error.to_string(),
            "cannot parse \"99999999999999999999\" (too large), expected integer"
        );
    }

    #[rstest]
    #[case("12345.34", Some(Value::Float(12345.34)))]
    #[case("123.45e10", Some(Value::Float(1234500000000.0)))]
    #[case(".5", Some(Value::Float(0.5)))]
    #[case("1.", None)]
    #[case("abc", None)]
    fn float(#[case] input: &str, #[case] expected: Option<Value>) {
        assert_eq!(convert(&Float, "ratio", input), expected);
    }

    #[rstest]
    #[case("true", Some(Value::Bool(true)))]
    #[case("Enabled", Some(Value::Bool(true)))]
    #[case("1", Some(Value::Bool(true)))]
    #[case("NO", Some(Value::Bool(false)))]
    #[case("off", Some(Value::Bool(false)))]
    #[case("maybe", None)]
    fn boolean(#[case] input: &str, #[case] expected: Option<Value>) {
        assert_eq!(convert(&Boolean, "flag", input), expected);
    }

    #[test]
    fn boolean_candidates() {
        assert_eq!(Boolean.candidates(""), vec!["true ", "false "]);
        assert_eq!(Boolean.candidates("f"), vec!["false "]);
    }

    #[rstest]
    #[case("verbose", Some(Value::from("verbose")))]
    #[case("quiet", None)]
    fn keyword(#[case] input: &str, #[case] expected: Option<Value>) {
        assert_eq!(convert(&Keyword, "verbose", input), expected);
    }

    #[rstest]
    #[case("key=value", Some(Value::Pair("key".into(), "value".into())))]
    #[case("key=a=b", Some(Value::Pair("key".into(), "a=b".into())))]
    #[case("key=", None)]
    #[case("=value", None)]
    fn key_value(#[case] input: &str, #[case] expected: Option<Value>) {
        assert_eq!(convert(&KeyValue::new(), "pair", input), expected);
    }

    #[test]
    fn key_value_custom_separator() {
        let kind = KeyValue::with_separator(":");
        assert_eq!(
            convert(&kind, "pair", "host:example.com"),
            Some(Value::Pair("host".into(), "example.com".into()))
        );
        assert_eq!(convert(&kind, "pair", "host=example.com"), None);
    }

    fn bytes(data: &[u8]) -> Option<Value> {
        Some(Value::Bytes(data.to_vec()))
    }

    #[rstest]
    #[case("Y2x5", bytes(b"cly"))]
    #[case("aXM=", bytes(b"is"))]
    #[case("Y29vbA==", bytes(b"cool"))]
    #[case("AAECAw==", bytes(&[0, 1, 2, 3]))]
    #[case("Y2x", None)]
    #[case("Y2x5=", None)]
    #[case("Y2x5==", None)]
    #[case("Y2x5===", None)]
    #[case("Y29vbA==abc", None)]
    #[case("aR==", None)]
    fn base64(#[case] input: &str, #[case] expected: Option<Value>) {
        assert_eq!(convert(&Base64, "data", input), expected);
    }
}
