//! Variables collected while matching the input.

use crate::error::ArgumentError;
use crate::value::{FromValue, Value};
use linked_hash_map::LinkedHashMap;

/// Values collected by variables, keyed by the variable's name
///
/// The collection keeps the order in which the variables were first matched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vars {
    values: LinkedHashMap<String, Value>,
}

impl Vars {
    pub fn new() -> Self {
        Vars::default()
    }

    /// Stores the value, either replacing the previous one or appending it to a list.
    pub(crate) fn store(&mut self, name: &str, value: Value, accumulate: bool) {
        if !accumulate {
            self.values.insert(name.to_string(), value);
            return;
        }
        match self.values.get_mut(name) {
            Some(Value::List(items)) => items.push(value),
            Some(previous) => {
                let first = std::mem::replace(previous, Value::List(Vec::new()));
                *previous = Value::List(vec![first, value]);
            }
            None => {
                self.values.insert(name.to_string(), Value::List(vec![value]));
            }
        }
    }

    /// Returns the raw value collected under the name.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns `true` if a value was collected under the name.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Converts the value collected under the name into `T`
    ///
    /// Fails if the value is absent (unless `T` has a fallback for missing values, such as
    /// `Option<T>` or `Vec<T>`) or if it has an incompatible type.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, ArgumentError> {
        match self.values.get(name) {
            Some(value) => T::from_value(value).ok_or_else(|| ArgumentError::Mismatch {
                name: name.to_string(),
                expected: T::expected(),
                found: value.type_name(),
            }),
            None => T::from_missing().ok_or_else(|| ArgumentError::Missing(name.to_string())),
        }
    }

    /// Same as [`get`](Vars::get), but uses the fallback when nothing was collected.
    pub fn get_or_else<T: FromValue>(
        &self,
        name: &str,
        fallback: impl FnOnce() -> T,
    ) -> Result<T, ArgumentError> {
        if self.values.contains_key(name) {
            self.get(name)
        } else {
            Ok(fallback())
        }
    }

    /// Iterates over the collected values in the order they were first matched.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Vars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Vars {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Construction of a typed argument set from the collected variables
///
/// This trait can be derived with `#[derive(FromVars)]` for structs with named fields; every
/// field is looked up by its name (or the name given with `#[cly(rename = "...")]`).
pub trait FromVars: Sized {
    fn from_vars(vars: &Vars) -> Result<Self, ArgumentError>;
}

impl FromVars for Vars {
    fn from_vars(vars: &Vars) -> Result<Self, ArgumentError> {
        Ok(vars.clone())
    }
}

impl FromVars for () {
    fn from_vars(_vars: &Vars) -> Result<Self, ArgumentError> {
        Ok(())
    }
}
