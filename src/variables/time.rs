use super::primitives::FLOAT_PATTERN;
use super::{invalid, VariableKind};
use crate::error::ValueError;
use crate::grammar::cull_candidates;
use crate::value::Value;
use chrono::{FixedOffset, NaiveTime, TimeDelta};
use std::borrow::Cow;

/// Time of day in the `HH:MM[:SS]` format
#[derive(Debug, Clone, Copy, Default)]
pub struct Time;

impl VariableKind for Time {
    fn name(&self) -> &'static str {
        "time"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        Some(r"\d\d:\d\d(?::\d\d)?".into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        let mut parts = text.split(':').map(str::parse::<u32>);
        let mut next = || parts.next().transpose().map_err(|_| invalid(text, self));
        let hour = next()?.unwrap_or(0);
        let minute = next()?.unwrap_or(0);
        let second = next()?.unwrap_or(0);
        NaiveTime::from_hms_opt(hour, minute, second)
            .map(Value::Time)
            .ok_or_else(|| invalid(text, self))
    }
}

/// A signed duration: a real number followed by a unit (`w`, `d`, `h`, `m` or `s`)
///
/// For example `15m`, `3.5d` or `-2h`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelativeTime;

fn unit_seconds(unit: char) -> Option<f64> {
    match unit.to_ascii_lowercase() {
        'w' => Some(7.0 * 24.0 * 3600.0),
        'd' => Some(24.0 * 3600.0),
        'h' => Some(3600.0),
        'm' => Some(60.0),
        's' => Some(1.0),
        _ => None,
    }
}

impl VariableKind for RelativeTime {
    fn name(&self) -> &'static str {
        "relative time"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        Some(format!("{}(?i:[wdhms])", FLOAT_PATTERN).into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        let mut chars = text.chars();
        let unit = chars.next_back().and_then(unit_seconds);
        let amount = chars.as_str().parse::<f64>().ok();
        let milliseconds = match (amount, unit) {
            (Some(amount), Some(unit)) => (amount * unit * 1000.0).round(),
            _ => return Err(invalid(text, self)),
        };
        if !milliseconds.is_finite() || milliseconds.abs() > i64::MAX as f64 {
            return Err(ValueError::invalid(text, Some("out of range".into())).expected(self.name()));
        }
        TimeDelta::try_milliseconds(milliseconds as i64)
            .map(Value::Duration)
            .ok_or_else(|| ValueError::invalid(text, Some("out of range".into())).expected(self.name()))
    }
}

/// Names of the fixed time zones with their offsets from UTC in hours
const TIMEZONES: [(&str, i32); 27] = [
    ("UTC", 0),
    ("GMT-12:00", -12),
    ("GMT-11:00", -11),
    ("GMT-10:00", -10),
    ("GMT-9:00", -9),
    ("GMT-8:00", -8),
    ("GMT-7:00", -7),
    ("GMT-6:00", -6),
    ("GMT-5:00", -5),
    ("GMT-4:00", -4),
    ("GMT-3:00", -3),
    ("GMT-2:00", -2),
    ("GMT-1:00", -1),
    ("GMT", 0),
    ("GMT+1:00", 1),
    ("GMT+2:00", 2),
    ("GMT+3:00", 3),
    ("GMT+4:00", 4),
    ("GMT+5:00", 5),
    ("GMT+6:00", 6),
    ("GMT+7:00", 7),
    ("GMT+8:00", 8),
    ("GMT+9:00", 9),
    ("GMT+10:00", 10),
    ("GMT+11:00", 11),
    ("GMT+12:00", 12),
    ("GMT+13:00", 13),
];

/// One of the fixed time zones: `UTC`, `GMT` or `GMT-12:00` to `GMT+13:00`
///
/// The token must be one of the zone names, which are also offered for completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timezone;

impl VariableKind for Timezone {
    fn name(&self) -> &'static str {
        "time zone"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        Some(r"[-+:/\w]+".into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        TIMEZONES
            .iter()
            .find(|(name, _)| *name == text)
            .and_then(|(_, hours)| FixedOffset::east_opt(hours * 3600))
            .map(Value::Offset)
            .ok_or_else(|| invalid(text, self))
    }

    fn candidates(&self, text: &str) -> Vec<String> {
        let names: Vec<String> = TIMEZONES.iter().map(|(name, _)| name.to_string()).collect();
        cull_candidates(&names, text)
    }

    fn match_candidates(&self) -> bool {
        true
    }
}
