//! Typed values collected by variables and their conversion into Rust types.

use chrono::{FixedOffset, NaiveTime, TimeDelta};
use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use url::Url;

/// An IP network in CIDR notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Network {
    pub address: IpAddr,
    pub prefix: u8,
}

impl Network {
    /// Maximum prefix length for the address family.
    pub fn max_prefix(address: &IpAddr) -> u8 {
        match address {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix)
    }
}

/// A value produced by a variable
///
/// A variable with a traversal limit other than 1 collects its values into a [`Value::List`] in
/// traversal order; otherwise the value is stored as is.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Path(PathBuf),
    Ip(IpAddr),
    Network(Network),
    Pair(String, String),
    Time(NaiveTime),
    Duration(TimeDelta),
    /// Offset of a time zone from UTC
    Offset(FixedOffset),
    Uri(Url),
    /// Decoded binary data
    Bytes(Vec<u8>),
    List(Vec<Value>),
}

impl Value {
    /// Human-readable name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Int(_) => "integer",
            Value::Float(_) => "real number",
            Value::Bool(_) => "boolean",
            Value::Path(_) => "path",
            Value::Ip(_) => "IP address",
            Value::Network(_) => "network",
            Value::Pair(_, _) => "key-value pair",
            Value::Time(_) => "time",
            Value::Duration(_) => "duration",
            Value::Offset(_) => "time zone",
            Value::Uri(_) => "URI",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
        }
    }

    /// Returns the string if this is a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(string) => Some(string),
            _ => None,
        }
    }

    /// Returns the data if this is a [`Value::Bytes`].
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the items if this is a [`Value::List`].
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(string) => f.write_str(string),
            Value::Int(int) => write!(f, "{}", int),
            Value::Float(float) => write!(f, "{}", float),
            Value::Bool(boolean) => write!(f, "{}", boolean),
            Value::Path(path) => write!(f, "{}", path.display()),
            Value::Ip(address) => write!(f, "{}", address),
            Value::Network(network) => write!(f, "{}", network),
            Value::Pair(key, value) => write!(f, "{}={}", key, value),
            Value::Time(time) => write!(f, "{}", time),
            Value::Duration(delta) => write!(f, "{}", delta),
            Value::Offset(offset) => write!(f, "{}", offset),
            Value::Uri(uri) => write!(f, "{}", uri),
            Value::Bytes(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
            Value::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! impl_from {
    ($($type:ty => $variant:ident),* $(,)?) => {
        $(impl From<$type> for Value {
            fn from(value: $type) -> Self {
                Value::$variant(value)
            }
        })*
    };
}

impl_from! {
    String => Str,
    i64 => Int,
    f64 => Float,
    bool => Bool,
    PathBuf => Path,
    IpAddr => Ip,
    Network => Network,
    NaiveTime => Time,
    TimeDelta => Duration,
    FixedOffset => Offset,
    Url => Uri,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Conversion of a collected [`Value`] into a Rust type
///
/// This trait is used by [`Vars::get`](crate::Vars::get) and by the code generated with
/// `#[derive(FromVars)]`.
pub trait FromValue: Sized {
    /// Human-readable name of the expected value, used in error messages.
    fn expected() -> &'static str;

    /// Converts the value, returns `None` if it has an incompatible type.
    fn from_value(value: &Value) -> Option<Self>;

    /// The value to use when nothing was collected. `None` means that the value is required.
    fn from_missing() -> Option<Self> {
        None
    }
}

macro_rules! impl_from_value {
    ($type:ty, $expected:literal, $pattern:pat => $result:expr) => {
        impl FromValue for $type {
            fn expected() -> &'static str {
                $expected
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    $pattern => $result,
                    _ => None,
                }
            }
        }
    };
}

impl_from_value!(String, "string", Value::Str(string) => Some(string.clone()));
impl_from_value!(i64, "integer", Value::Int(int) => Some(*int));
impl_from_value!(f64, "real number", Value::Float(float) => Some(*float));
impl_from_value!(bool, "boolean", Value::Bool(boolean) => Some(*boolean));
impl_from_value!(PathBuf, "path", Value::Path(path) => Some(path.clone()));
impl_from_value!(IpAddr, "IP address", Value::Ip(address) => Some(*address));
impl_from_value!(Network, "network", Value::Network(network) => Some(*network));
impl_from_value!(NaiveTime, "time", Value::Time(time) => Some(*time));
impl_from_value!(TimeDelta, "duration", Value::Duration(delta) => Some(*delta));
impl_from_value!(FixedOffset, "time zone", Value::Offset(offset) => Some(*offset));
impl_from_value!(Url, "URI", Value::Uri(uri) => Some(uri.clone()));
impl_from_value!(
    (String, String), "key-value pair",
    Value::Pair(key, value) => Some((key.clone(), value.clone()))
);

macro_rules! impl_from_value_int {
    ($($type:ty),*) => {
        $(impl FromValue for $type {
            fn expected() -> &'static str {
                "integer"
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::Int(int) => <$type>::try_from(*int).ok(),
                    _ => None,
                }
            }
        })*
    };
}

impl_from_value_int!(i8, i16, i32, u8, u16, u32, u64, usize);

impl FromValue for Value {
    fn expected() -> &'static str {
        "value"
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn expected() -> &'static str {
        "list"
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            Value::Bytes(bytes) => bytes
                .iter()
                .map(|&byte| T::from_value(&Value::Int(byte.into())))
                .collect(),
            scalar => T::from_value(scalar).map(|item| vec![item]),
        }
    }

    fn from_missing() -> Option<Self> {
        Some(Vec::new())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn expected() -> &'static str {
        T::expected()
    }

    fn from_value(value: &Value) -> Option<Self> {
        T::from_value(value).map(Some)
    }

    fn from_missing() -> Option<Self> {
        Some(None)
    }
}
