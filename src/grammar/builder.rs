use super::node::{Callback, CallbackResult, Candidates, Condition, Help};
use super::Grammar;
use crate::context::Context;
use crate::error::GrammarError;
use crate::variables::VariableKind;
use crate::vars::{FromVars, Vars};
use std::sync::Arc;

pub(crate) enum NodeSpec<U> {
    Literal,
    Variable(Arc<dyn VariableKind>),
    Action(Callback<U>),
}

pub(crate) enum Element<U> {
    Node(Node<U>),
    Alias(Alias),
    Group(Group<U>),
}

/// A grammar waiting to be grafted under the node at `target`
pub(crate) struct Merge<U> {
    pub(crate) target: String,
    pub(crate) children: Vec<Element<U>>,
    pub(crate) merges: Vec<Merge<U>>,
}

/// Declaration of a grammar node
///
/// A node matches one token of the input. By default the token must be equal to the node's name;
/// a different [`pattern`](Node::pattern) or a [variable kind](Node::variable) changes that. An
/// action node matches the end of the input instead and invokes its callback.
///
/// ```
/// use cly::{Grammar, Node, variables::Integer};
///
/// let grammar = Grammar::builder()
///     .child(
///         Node::new("sleep")
///             .help("Pause for a while")
///             .child(
///                 Node::variable("seconds", Integer)
///                     .help("Number of seconds")
///                     .child(Node::action(|_vars| Ok(()))),
///             ),
///     )
///     .build()
///     .unwrap();
/// assert!(grammar.find("/sleep/seconds").is_some());
/// ```
pub struct Node<U = ()> {
    pub(crate) name: Option<String>,
    pub(crate) spec: NodeSpec<U>,
    pub(crate) pattern: Option<String>,
    pub(crate) help: Option<Help<U>>,
    pub(crate) traversals: Option<u32>,
    pub(crate) candidates: Option<Candidates<U>>,
    pub(crate) match_candidates: Option<bool>,
    pub(crate) condition: Option<Condition<U>>,
    pub(crate) label: Option<String>,
    pub(crate) var_name: Option<String>,
    pub(crate) group: Option<u32>,
    pub(crate) children: Vec<Element<U>>,
}

impl<U> Node<U> {
    fn with_spec(name: Option<String>, spec: NodeSpec<U>) -> Self {
        Node {
            name,
            spec,
            pattern: None,
            help: None,
            traversals: None,
            candidates: None,
            match_candidates: None,
            condition: None,
            label: None,
            var_name: None,
            group: None,
            children: Vec::new(),
        }
    }

    /// A node matching its own name.
    pub fn new(name: impl Into<String>) -> Self {
        Node::with_spec(Some(name.into()), NodeSpec::Literal)
    }

    /// A node converting the matched token into a value of the given kind.
    pub fn variable(name: impl Into<String>, kind: impl VariableKind + 'static) -> Self {
        Node::with_spec(Some(name.into()), NodeSpec::Variable(Arc::new(kind)))
    }

    /// An action receiving the collected variables.
    pub fn action<F>(callback: F) -> Self
    where
        F: Fn(&Vars) -> CallbackResult + Send + Sync + 'static,
    {
        Node::with_spec(None, NodeSpec::Action(Callback::Plain(Arc::new(callback))))
    }

    /// An action receiving the whole parse context.
    pub fn action_with_context<F>(callback: F) -> Self
    where
        F: Fn(&Context<'_, U>) -> CallbackResult + Send + Sync + 'static,
    {
        Node::with_spec(None, NodeSpec::Action(Callback::WithContext(Arc::new(callback))))
    }

    /// An action receiving the user object supplied to the parse, if any, and the variables.
    pub fn action_with_user<F>(callback: F) -> Self
    where
        F: Fn(Option<&U>, &Vars) -> CallbackResult + Send + Sync + 'static,
    {
        Node::with_spec(None, NodeSpec::Action(Callback::WithUser(Arc::new(callback))))
    }

    /// An action receiving its arguments as a typed struct built from the variables.
    pub fn typed_action<A, F>(callback: F) -> Self
    where
        A: FromVars + 'static,
        F: Fn(A) -> CallbackResult + Send + Sync + 'static,
    {
        let callback = move |vars: &Vars| -> CallbackResult {
            let arguments = A::from_vars(vars)?;
            callback(arguments)
        };
        Node::with_spec(None, NodeSpec::Action(Callback::Plain(Arc::new(callback))))
    }

    /// Sets the node's name. Actions are anonymous unless named.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Regular expression the token must fully match, replacing the default one.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(Help::Text(text.into()));
        self
    }

    /// Help produced at run time as `(key, text)` pairs.
    pub fn help_with<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Context<'_, U>) -> Vec<(String, String)> + Send + Sync + 'static,
    {
        self.help = Some(Help::Dynamic(Arc::new(callback)));
        self
    }

    /// Maximum number of traversals in one parse, 0 meaning unlimited.
    pub fn traversals(mut self, traversals: u32) -> Self {
        self.traversals = Some(traversals);
        self
    }

    /// Completion candidates produced at run time
    ///
    /// The callback receives the partially typed token and returns the final candidates. Unless
    /// disabled with [`match_candidates`](Node::match_candidates), the token is then also
    /// required to be one of the candidates.
    pub fn candidates<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Context<'_, U>, &str) -> Vec<String> + Send + Sync + 'static,
    {
        self.candidates = Some(Candidates::Dynamic(Arc::new(callback)));
        self
    }

    /// Fixed completion candidates, filtered by the typed prefix.
    pub fn fixed_candidates<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words = words.into_iter().map(Into::into).collect();
        self.candidates = Some(Candidates::Fixed(words));
        self
    }

    /// Whether the token must be one of the completion candidates.
    pub fn match_candidates(mut self, enabled: bool) -> Self {
        self.match_candidates = Some(enabled);
        self
    }

    /// Makes the node available only when the predicate holds.
    pub fn condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&Context<'_, U>) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(condition));
        self
    }

    /// Global label that alias targets can start with.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Name under which a variable stores its value, the node's name by default.
    pub fn var_name(mut self, var_name: impl Into<String>) -> Self {
        self.var_name = Some(var_name.into());
        self
    }

    /// Help group; groups are separated by a blank line in formatted help
    ///
    /// Nodes default to group 0 and actions to [`ACTION_GROUP`](crate::ACTION_GROUP).
    pub fn group(mut self, group: u32) -> Self {
        self.group = Some(group);
        self
    }

    pub fn child(mut self, child: Node<U>) -> Self {
        self.children.push(Element::Node(child));
        self
    }

    pub fn alias(mut self, alias: Alias) -> Self {
        self.children.push(Element::Alias(alias));
        self
    }

    /// Adds the group's children as this node's children.
    pub fn with_group(mut self, group: Group<U>) -> Self {
        self.children.push(Element::Group(group));
        self
    }
}

/// Declaration of additional edges to existing nodes
///
/// At the position where it is declared, an alias lets the matcher continue with the node (or
/// nodes) its target refers to. The target is a path:
///  * `/a/b` is absolute;
///  * `a/b`, `./a`, `../a` are relative to the alias itself, so `..` is the node the alias is
///    declared in and `../..` that node's parent;
///  * `label/a` starts at the node with the given label;
///  * a glob in the last segment (`/a/*`) refers to every matching child.
///
/// Targets are resolved once, when the grammar is built.
#[derive(Debug, Clone)]
pub struct Alias {
    pub(crate) target: String,
    pub(crate) name: Option<String>,
}

impl Alias {
    pub fn new(target: impl Into<String>) -> Self {
        Alias {
            target: target.into(),
            name: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Transparent container applying attributes to all nodes inside it
///
/// The group's children belong to the group's parent. Traversal limit and help group set on the
/// group apply to every node of its subtree that does not set its own value (the innermost group
/// wins). Conditions accumulate: a node is available only if the conditions of all enclosing
/// groups hold.
pub struct Group<U = ()> {
    pub(crate) id: Option<u32>,
    pub(crate) traversals: Option<u32>,
    pub(crate) condition: Option<Condition<U>>,
    pub(crate) children: Vec<Element<U>>,
}

impl<U> Group<U> {
    pub fn new() -> Self {
        Group {
            id: None,
            traversals: None,
            condition: None,
            children: Vec::new(),
        }
    }

    /// Help group id for the nodes inside.
    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn traversals(mut self, traversals: u32) -> Self {
        self.traversals = Some(traversals);
        self
    }

    pub fn condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&Context<'_, U>) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(condition));
        self
    }

    pub fn child(mut self, child: Node<U>) -> Self {
        self.children.push(Element::Node(child));
        self
    }

    pub fn alias(mut self, alias: Alias) -> Self {
        self.children.push(Element::Alias(alias));
        self
    }

    pub fn with_group(mut self, group: Group<U>) -> Self {
        self.children.push(Element::Group(group));
        self
    }
}

impl<U> Default for Group<U> {
    fn default() -> Self {
        Group::new()
    }
}

/// Builder of a [`Grammar`]
///
/// Created with [`Grammar::builder`] for grammars without a user object, or with
/// [`GrammarBuilder::new`] otherwise.
pub struct GrammarBuilder<U = ()> {
    pub(crate) children: Vec<Element<U>>,
    pub(crate) merges: Vec<Merge<U>>,
}

impl<U> GrammarBuilder<U> {
    pub fn new() -> Self {
        GrammarBuilder {
            children: Vec::new(),
            merges: Vec::new(),
        }
    }

    pub fn child(mut self, child: Node<U>) -> Self {
        self.children.push(Element::Node(child));
        self
    }

    pub fn alias(mut self, alias: Alias) -> Self {
        self.children.push(Element::Alias(alias));
        self
    }

    pub fn with_group(mut self, group: Group<U>) -> Self {
        self.children.push(Element::Group(group));
        self
    }

    /// Adds the top-level nodes of another grammar as children of an existing node
    ///
    /// `target` is the absolute path or the label of a node of this grammar. Merges are applied
    /// by [`build`](GrammarBuilder::build) in the order they were added, after this grammar's own
    /// nodes, so the target may also be a node added by an earlier merge. Merges of `other` are
    /// carried over, their paths are relative to `target`.
    ///
    /// Aliases of the merged grammar are resolved together with the rest: relative targets
    /// from their new place, absolute targets from this grammar's root.
    ///
    /// ```
    /// use cly::{Grammar, Node};
    ///
    /// let interfaces = Grammar::builder()
    ///     .child(Node::new("interfaces").child(Node::action(|_| Ok(()))));
    /// let grammar = Grammar::builder()
    ///     .child(Node::new("show"))
    ///     .merge("/show", interfaces)
    ///     .build()
    ///     .unwrap();
    /// assert!(grammar.find("/show/interfaces").is_some());
    /// ```
    pub fn merge(mut self, target: impl Into<String>, other: GrammarBuilder<U>) -> Self {
        self.merges.push(Merge {
            target: target.into(),
            children: other.children,
            merges: other.merges,
        });
        self
    }

    /// Builds the node arena and resolves all aliases.
    pub fn build(self) -> Result<Grammar<U>, GrammarError> {
        Grammar::from_elements(self.children, self.merges)
    }
}

impl<U> Default for GrammarBuilder<U> {
    fn default() -> Self {
        GrammarBuilder::new()
    }
}
