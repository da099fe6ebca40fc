use crate::context::Context;
use crate::error::{ActionError, ArgumentError, BoxedError};
use crate::variables::VariableKind;
use crate::vars::Vars;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Handle of a node in a [`Grammar`](crate::Grammar)
///
/// Handles are only meaningful for the grammar that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);
}

/// Value returned by action callbacks
pub type CallbackResult = Result<(), BoxedError>;

pub(crate) type PlainCallback = dyn Fn(&Vars) -> CallbackResult + Send + Sync;
pub(crate) type ContextCallback<U> = dyn Fn(&Context<'_, U>) -> CallbackResult + Send + Sync;
pub(crate) type UserCallback<U> = dyn Fn(Option<&U>, &Vars) -> CallbackResult + Send + Sync;

/// Predicate deciding whether a node is available in the current context
pub type Condition<U> = Arc<dyn Fn(&Context<'_, U>) -> bool + Send + Sync>;

/// Callback of an action, together with what it expects as its first argument
pub(crate) enum Callback<U> {
    Plain(Arc<PlainCallback>),
    WithContext(Arc<ContextCallback<U>>),
    WithUser(Arc<UserCallback<U>>),
}

impl<U> Callback<U> {
    pub(crate) fn invoke(&self, context: &Context<'_, U>) -> Result<(), ActionError> {
        let result = match self {
            Callback::Plain(callback) => callback(context.vars()),
            Callback::WithContext(callback) => callback(context),
            Callback::WithUser(callback) => callback(context.user(), context.vars()),
        };
        result.map_err(|error| match error.downcast::<ArgumentError>() {
            Ok(error) => ActionError::Arguments(*error),
            Err(error) => ActionError::Callback(error),
        })
    }
}

impl<U> Clone for Callback<U> {
    fn clone(&self) -> Self {
        match self {
            Callback::Plain(callback) => Callback::Plain(Arc::clone(callback)),
            Callback::WithContext(callback) => Callback::WithContext(Arc::clone(callback)),
            Callback::WithUser(callback) => Callback::WithUser(Arc::clone(callback)),
        }
    }
}

/// Help attached to a node
pub enum Help<U> {
    /// A fixed description, shown next to the node's key
    Text(String),
    /// A callback producing `(key, text)` pairs; replaces the node's own key
    Dynamic(Arc<dyn Fn(&Context<'_, U>) -> Vec<(String, String)> + Send + Sync>),
}

impl<U> Clone for Help<U> {
    fn clone(&self) -> Self {
        match self {
            Help::Text(text) => Help::Text(text.clone()),
            Help::Dynamic(callback) => Help::Dynamic(Arc::clone(callback)),
        }
    }
}

/// Source of completion candidates attached to a node
pub(crate) enum Candidates<U> {
    /// Fixed words, culled by the typed prefix
    Fixed(Vec<String>),
    /// A callback taking the context and the typed prefix, returning final candidates
    Dynamic(Arc<dyn Fn(&Context<'_, U>, &str) -> Vec<String> + Send + Sync>),
}

impl<U> Candidates<U> {
    pub(crate) fn get(&self, context: &Context<'_, U>, text: &str) -> Vec<String> {
        match self {
            Candidates::Fixed(words) => cull_candidates(words, text),
            Candidates::Dynamic(callback) => callback(context, text),
        }
    }
}

impl<U> Clone for Candidates<U> {
    fn clone(&self) -> Self {
        match self {
            Candidates::Fixed(words) => Candidates::Fixed(words.clone()),
            Candidates::Dynamic(callback) => Candidates::Dynamic(Arc::clone(callback)),
        }
    }
}

/// Keeps the words starting with `text`, each followed by a single space.
pub fn cull_candidates(words: &[String], text: &str) -> Vec<String> {
    words
        .iter()
        .filter(|word| !word.is_empty() && word.starts_with(text))
        .map(|word| format!("{} ", word.trim_end_matches(' ')))
        .collect()
}

pub(crate) enum NodeKind<U> {
    Root,
    Literal,
    Variable(Arc<dyn VariableKind>),
    Action(Callback<U>),
}

/// A node of a built grammar
///
/// Nodes are created with the [`Node`](crate::Node) builder and are immutable once the grammar
/// is built.
pub struct NodeInfo<U> {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind<U>,
    pub(crate) pattern: Option<Regex>,
    pub(crate) literal: bool,
    pub(crate) help: Option<Help<U>>,
    pub(crate) traversals: u32,
    pub(crate) group: u32,
    pub(crate) label: Option<String>,
    pub(crate) var_name: String,
    pub(crate) candidates: Option<Candidates<U>>,
    pub(crate) match_candidates: bool,
    pub(crate) conditions: Vec<Condition<U>>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) edges: Vec<NodeId>,
}

impl<U> NodeInfo<U> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Name of the node; anonymous nodes are named `@<n>`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute path of the node, e.g. `/interface/address`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Maximum number of times the node can be traversed in one parse, 0 meaning unlimited.
    pub fn traversals(&self) -> u32 {
        self.traversals
    }

    /// Help group the node belongs to.
    pub fn group(&self) -> u32 {
        self.group
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Name under which a variable stores its value.
    pub fn var_name(&self) -> &str {
        &self.var_name
    }

    /// Static help text, if any.
    pub fn help_text(&self) -> Option<&str> {
        match &self.help {
            Some(Help::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// The compiled, anchored pattern the token must match.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(Regex::as_str)
    }

    /// Returns `true` if the node matches nothing but its own name.
    pub fn is_literal(&self) -> bool {
        self.literal
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind, NodeKind::Variable(_))
    }

    pub fn is_action(&self) -> bool {
        matches!(self.kind, NodeKind::Action(_))
    }

    /// Nodes declared directly under this node, in declaration order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Nodes reachable in one step: children and alias targets, in the order they are tried.
    pub fn edges(&self) -> &[NodeId] {
        &self.edges
    }

    pub(crate) fn matches(&self, text: &str) -> bool {
        self.pattern.as_ref().map_or(false, |pattern| pattern.is_match(text))
    }

    /// Candidates from the attached source, or else from the variable kind.
    pub(crate) fn candidates_for(&self, context: &Context<'_, U>, text: &str) -> Vec<String> {
        match (&self.candidates, &self.kind) {
            (Some(source), _) => source.get(context, text),
            (None, NodeKind::Variable(kind)) => kind.candidates(text),
            (None, _) => Vec::new(),
        }
    }

    /// Whether the token matches the pattern and, for a variable, converts into a value.
    pub(crate) fn accepts(&self, text: &str) -> bool {
        self.matches(text)
            && match &self.kind {
                NodeKind::Variable(kind) => kind.parse(text).is_ok(),
                _ => true,
            }
    }

    /// Returns `true` if nothing the node does depends on the parse context.
    pub(crate) fn is_stateless(&self) -> bool {
        self.conditions.is_empty()
            && !matches!(self.candidates, Some(Candidates::Dynamic(_)))
            && !matches!(self.help, Some(Help::Dynamic(_)))
    }

    pub(crate) fn conditions_hold(&self, context: &Context<'_, U>) -> bool {
        self.conditions.iter().all(|condition| condition(context))
    }

    /// Key shown in help: the name of a literal node, `<name>` otherwise.
    pub(crate) fn help_key(&self) -> String {
        match self.kind {
            NodeKind::Action(_) => "<eol>".to_string(),
            _ if self.literal => self.name.clone(),
            _ => format!("<{}>", self.name),
        }
    }
}

impl<U> fmt::Debug for NodeInfo<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            NodeKind::Root => "Grammar",
            NodeKind::Literal => "Node",
            NodeKind::Variable(_) => "Variable",
            NodeKind::Action(_) => "Action",
        };
        write!(f, "<{}:{}>", kind, self.path)
    }
}

/// Compiles a pattern so that it must match the entire token.
pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}
