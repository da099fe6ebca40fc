//! Types related to the failure conditions of grammar construction, value conversion and action
//! execution.
//!
//! Failures are split by the moment they can happen:
//!  * [`GrammarError`] is returned by [`GrammarBuilder::build`](crate::GrammarBuilder::build)
//!    before any input is ever parsed;
//!  * [`ValueError`] is produced by a [`VariableKind`](crate::VariableKind) when the token cannot
//!    be converted into a value. It never reaches the caller of `parse`: the matcher treats the
//!    edge as non-viable and backtracks;
//!  * [`ArgumentError`] is returned when the collected variables cannot be converted into the
//!    arguments an action expects;
//!  * [`ActionError`] is what [`Parser::parse`](crate::Parser::parse) returns when the matched
//!    action fails.
//!
//! A parse that does not reach an action is not an error at all: the returned
//! [`Context`](crate::Context) is simply incomplete.

use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Boxed error returned by user callbacks
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error raised while building a [`Grammar`](crate::Grammar)
#[derive(Debug, Error)]
pub enum GrammarError {
    /// An alias target does not point at any existing node
    #[error("alias {alias} refers to a non-existent node {target}")]
    UnresolvedAlias { alias: String, target: String },

    /// A node's pattern is not a valid regular expression
    #[error("invalid pattern for {path}: {source}")]
    InvalidPattern {
        path: String,
        #[source]
        source: regex::Error,
    },

    /// Two children of the same parent share a name
    #[error("{parent} already has a child named {name}")]
    DuplicateChild { parent: String, name: String },

    /// The same label was assigned to two different nodes
    #[error("label {label} is already assigned to {path}")]
    DuplicateLabel { label: String, path: String },

    /// A node name is empty or contains a path separator
    #[error("invalid node name {name:?} under {parent}")]
    InvalidName { parent: String, name: String },

    /// The node a grammar should be merged into does not exist or is an action
    #[error("cannot merge a grammar into {target}: no such node")]
    MergeTarget { target: String },

    /// A glob pattern (either an alias target or a file filter) cannot be compiled
    #[error("invalid glob {pattern}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Failure to convert a token into a typed value
///
/// This error may contain a description of the expected value and a message explaining why the
/// conversion has failed, both are shown when the error is formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueError {
    text: String,
    message: Option<Cow<'static, str>>,
    expected: Option<Cow<'static, str>>,
}

impl ValueError {
    /// Creates a new error for the `text` that could not be converted, with an optional message
    /// describing the reason.
    pub fn invalid(text: impl Into<String>, message: Option<Cow<'static, str>>) -> Self {
        ValueError {
            text: text.into(),
            message,
            expected: None,
        }
    }

    /// Assigns a human-readable name of the value kind that was expected.
    pub fn expected(mut self, expected: impl Into<Cow<'static, str>>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// The text that could not be converted.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl std::error::Error for ValueError {}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot parse {:?}", self.text)?;
        if let Some(message) = &self.message {
            write!(f, " ({})", message)?;
        }
        if let Some(expected) = &self.expected {
            write!(f, ", expected {}", expected)?;
        }
        Ok(())
    }
}

/// Failure to convert collected variables into typed action arguments
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// No value was collected under the name
    #[error("missing argument {0}")]
    Missing(String),

    /// A value was collected but it has a different type
    #[error("argument {name} is {found}, expected {expected}")]
    Mismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Failure of an action invoked after a successful parse
#[derive(Debug, Error)]
pub enum ActionError {
    /// The callback returned an error; it is passed through unchanged
    #[error("{0}")]
    Callback(BoxedError),

    /// The callback's arguments could not be built from the collected variables
    #[error(transparent)]
    Arguments(#[from] ArgumentError),

    /// The context did not reach an action, so there is nothing to execute
    #[error("unexpected input: {remaining:?}")]
    Incomplete { remaining: String },
}
