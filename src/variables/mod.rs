//! Built-in variable kinds
//!
//! A variable is a node that, in addition to matching a token, converts it into a typed
//! [`Value`](crate::Value) stored in the parse context. How the token is matched and converted is
//! defined by the variable's kind: a type implementing [`VariableKind`].
//!
//! The token is first matched against the kind's pattern (or the pattern set explicitly on the
//! node). The pattern must match the entire raw token text, quotes included. The matched text is
//! then passed to [`VariableKind::parse`]. If this fails, the edge is treated as non-matching and
//! the matcher tries the remaining alternatives, so a failed conversion is never an error by
//! itself.
//!
//! | Kind             | Default pattern                      | Value                 |
//! |------------------|--------------------------------------|-----------------------|
//! | [`Text`]         | `\S+`                                | `Value::Str`          |
//! | [`Word`]         | identifier                           | `Value::Str`          |
//! | [`QuotedString`] | word or quoted string                | `Value::Str`          |
//! | [`Integer`]      | `[-+]?\d+`                           | `Value::Int`          |
//! | [`Float`]        | decimal or exponential notation      | `Value::Float`        |
//! | [`Boolean`]      | `true`, `no`, `on`, ...              | `Value::Bool`         |
//! | [`Keyword`]      | the node's name                      | `Value::Str`          |
//! | [`KeyValue`]     | `key=value`                          | `Value::Pair`         |
//! | [`IpAddress`]    | IPv4 or IPv6 address                 | `Value::Ip`           |
//! | [`Cidr`]         | address with optional prefix length  | `Value::Network`      |
//! | [`Hostname`]     | host name, never an address          | `Value::Str`          |
//! | [`Host`]         | address or host name                 | `Value::Ip` / `Str`   |
//! | [`Email`]        | e-mail address                       | `Value::Str`          |
//! | [`Uri`]          | absolute URI                         | `Value::Uri`          |
//! | [`File`]         | any token                            | `Value::Path`         |
//! | [`Base64`]       | padded base64                        | `Value::Bytes`        |
//! | [`LdapDn`]       | `attr=value[,attr=value...]`         | `Value::Str`          |
//! | [`Time`]         | `HH:MM[:SS]`                         | `Value::Time`         |
//! | [`RelativeTime`] | `[-]N.N` followed by `w/d/h/m/s`     | `Value::Duration`     |
//! | [`Timezone`]     | `UTC`, `GMT` or `GMT±H:00`           | `Value::Offset`       |

mod network;
mod paths;
mod primitives;
mod time;

pub use network::{Cidr, Email, Host, Hostname, IpAddress, LdapDn, Uri};
pub use paths::File;
pub use primitives::{
    Base64, Boolean, Float, Integer, KeyValue, Keyword, QuotedString, Text, Word,
};
pub use time::{RelativeTime, Time, Timezone};

use crate::error::ValueError;
use crate::value::Value;
use std::borrow::Cow;

/// Matching and conversion rules of a variable
///
/// Kinds are shared by the grammar and used from any number of parses at once, so they must not
/// rely on interior mutability for their results.
pub trait VariableKind: Send + Sync {
    /// Human-readable name of the kind, used in error messages.
    fn name(&self) -> &'static str;

    /// Regular expression the token must fully match
    ///
    /// `None` means that the token must be equal to the node's name.
    fn pattern(&self) -> Option<Cow<'static, str>>;

    /// Converts the matched token into a value.
    fn parse(&self, text: &str) -> Result<Value, ValueError>;

    /// Completion candidates for the partially typed token
    ///
    /// Returned strings replace the token entirely. A candidate that completes the token should
    /// end with a space.
    fn candidates(&self, _text: &str) -> Vec<String> {
        Vec::new()
    }

    /// Traversal limit used unless the node or an enclosing group sets one.
    fn traversals(&self) -> Option<u32> {
        None
    }

    /// Whether the token must be one of the candidates, unless the node says otherwise.
    fn match_candidates(&self) -> bool {
        false
    }
}

impl<K: VariableKind + ?Sized> VariableKind for Box<K> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        (**self).pattern()
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        (**self).parse(text)
    }

    fn candidates(&self, text: &str) -> Vec<String> {
        (**self).candidates(text)
    }

    fn traversals(&self) -> Option<u32> {
        (**self).traversals()
    }

    fn match_candidates(&self) -> bool {
        (**self).match_candidates()
    }
}

fn invalid(text: &str, kind: &dyn VariableKind) -> ValueError {
    ValueError::invalid(text, None).expected(kind.name())
}
