use super::{invalid, VariableKind};
use crate::error::ValueError;
use crate::value::{Network, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::net::IpAddr;
use url::Url;

const ADDRESS_PATTERN: &str = r"[0-9A-Fa-f:.]+";
const HOSTNAME_PATTERN: &str =
    r"(?i)[A-Z0-9][A-Z0-9_-]*(?:(?:\.[A-Z0-9][A-Z0-9_-]*)*\.[A-Z0-9][A-Z0-9_-]*[A-Z])?\.?";

static HOSTNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^(?:{})$", HOSTNAME_PATTERN)).expect("host name pattern is valid")
});

/// An IPv4 or IPv6 address
#[derive(Debug, Clone, Copy, Default)]
pub struct IpAddress;

impl VariableKind for IpAddress {
    fn name(&self) -> &'static str {
        "IP address"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        Some(ADDRESS_PATTERN.into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        text.parse::<IpAddr>()
            .map(Value::Ip)
            .map_err(|_| invalid(text, self))
    }
}

/// A network in CIDR notation; the prefix length defaults to the full address length
#[derive(Debug, Clone, Copy, Default)]
pub struct Cidr;

impl VariableKind for Cidr {
    fn name(&self) -> &'static str {
        "network"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        Some(format!(r"{}(?:/\d{{1,3}})?", ADDRESS_PATTERN).into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        let (address, prefix) = match text.split_once('/') {
            Some((address, prefix)) => (address, Some(prefix)),
            None => (text, None),
        };
        let address: IpAddr = address.parse().map_err(|_| invalid(text, self))?;
        let max_prefix = Network::max_prefix(&address);
        let prefix = match prefix {
            Some(prefix) => match prefix.parse::<u8>() {
                Ok(prefix) if prefix <= max_prefix => prefix,
                _ => {
                    return Err(ValueError::invalid(text, Some("invalid prefix length".into()))
                        .expected(self.name()))
                }
            },
            None => max_prefix,
        };
        Ok(Value::Network(Network { address, prefix }))
    }
}

/// A host name (never an IP address)
///
/// The name can be required to consist of at least some number of dot-separated parts and to
/// end with a given suffix.
#[derive(Debug, Clone, Default)]
pub struct Hostname {
    parts: usize,
    suffix: Option<String>,
}

impl Hostname {
    pub fn new() -> Self {
        Hostname::default()
    }

    /// Requires at least `parts` dot-separated parts.
    pub fn parts(mut self, parts: usize) -> Self {
        self.parts = parts;
        self
    }

    /// Requires the name to end with `suffix`.
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }
}

impl VariableKind for Hostname {
    fn name(&self) -> &'static str {
        "host name"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        Some(HOSTNAME_PATTERN.into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        if text.parse::<IpAddr>().is_ok() {
            return Err(invalid(text, self));
        }
        if self.parts > 0 && text.trim_end_matches('.').split('.').count() < self.parts {
            return Err(ValueError::invalid(text, Some("not enough parts".into())).expected(self.name()));
        }
        match &self.suffix {
            Some(suffix) if !text.ends_with(suffix.as_str()) => Err(ValueError::invalid(
                text,
                Some(format!("must end with {}", suffix).into()),
            )
            .expected(self.name())),
            _ => Ok(Value::from(text)),
        }
    }
}

/// Either an IP address or a host name
#[derive(Debug, Clone, Copy, Default)]
pub struct Host;

impl VariableKind for Host {
    fn name(&self) -> &'static str {
        "host"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        Some(format!("{}|{}", ADDRESS_PATTERN, HOSTNAME_PATTERN).into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        match text.parse::<IpAddr>() {
            Ok(address) => Ok(Value::Ip(address)),
            Err(_) if HOSTNAME_REGEX.is_match(text) => Hostname::new().parse(text),
            Err(_) => Err(invalid(text, self)),
        }
    }
}

/// An e-mail address
#[derive(Debug, Clone, Copy, Default)]
pub struct Email;

impl VariableKind for Email {
    fn name(&self) -> &'static str {
        "e-mail address"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        Some(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}".into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        Ok(Value::from(text))
    }
}

/// An absolute URI
#[derive(Debug, Clone, Copy, Default)]
pub struct Uri;

impl VariableKind for Uri {
    fn name(&self) -> &'static str {
        "URI"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        Some(r"[a-zA-Z][0-9a-zA-Z+.-]*:\S+".into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        Url::parse(text).map(Value::Uri).map_err(|error| {
            ValueError::invalid(text, Some(error.to_string().into())).expected(self.name())
        })
    }
}

/// A distinguished name of an LDAP entry, e.g. `cn=Manager,dc=example,dc=com`
#[derive(Debug, Clone, Copy, Default)]
pub struct LdapDn;

impl VariableKind for LdapDn {
    fn name(&self) -> &'static str {
        "LDAP DN"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        Some(r"\w+=\w+(?:,\w+=\w+)*".into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        Ok(Value::from(text))
    }
}
