use crate::grammar::compile_pattern;
use crate::value::Value;
use crate::variables::VariableKind;

/// Matches `text` the way a variable node named `name` would and returns the converted value.
pub(crate) fn convert(kind: &dyn VariableKind, name: &str, text: &str) -> Option<Value> {
    let source = match kind.pattern() {
        Some(pattern) => pattern.into_owned(),
        None => regex::escape(name),
    };
    let pattern = compile_pattern(&source).unwrap();
    if !pattern.is_match(text) {
        return None;
    }
    kind.parse(text).ok()
}

macro_rules! test_parse {
    ($name:ident, $grammar:expr, $input:literal => Complete { parsed: $parsed:literal $(, $var:literal: $value:expr)* $(,)? }) => {
        #[test]
        fn $name() {
            let grammar = $grammar;
            let context = $crate::check(&grammar, $input, None);
            assert!(context.is_complete(), "{:?} did not reach an action: {:?}", $input, context);
            assert_eq!(context.parsed(), $parsed);
            assert_eq!(context.parsed().len() + context.remaining().len(), $input.len());
            $(assert_eq!(context.vars().value($var), Some(&$crate::Value::from($value)), "variable {}", $var);)*
        }
    };
    ($name:ident, $grammar:expr, $input:literal => Incomplete { parsed: $parsed:literal, remaining: $remaining:literal $(,)? }) => {
        #[test]
        fn $name() {
            let grammar = $grammar;
            let context = $crate::check(&grammar, $input, None);
            assert!(!context.is_complete(), "{:?} unexpectedly reached an action", $input);
            assert_eq!(context.parsed(), $parsed);
            assert_eq!(context.remaining(), $remaining);
        }
    };
}
pub(crate) use test_parse;

macro_rules! test_complete {
    ($name:ident, $grammar:expr, $input:literal => [$($candidate:literal),* $(,)?]) => {
        #[test]
        fn $name() {
            let grammar = $grammar;
            let candidates = $crate::complete(&grammar, $input, None);
            let expected: std::collections::BTreeSet<String> =
                [$($candidate.to_string()),*].into_iter().collect();
            assert_eq!(candidates, expected, "candidates for {:?}", $input);
        }
    };
}
pub(crate) use test_complete;
