use crate::completion::{self, HelpEntries};
use crate::error::ActionError;
use crate::grammar::{Grammar, NodeId, NodeInfo, NodeKind};
use crate::tokens::{Token, TokenStream};
use crate::value::Value;
use crate::vars::Vars;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// What decides how the rest of the input can be matched, in a grammar without callbacks
///
/// Counters of nodes that can be traversed any number of times never restrict the matcher and
/// are left out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct State {
    position: NodeId,
    consumed: usize,
    limited: Vec<(NodeId, u32)>,
}

/// State of a single parse
///
/// A context is created for every call to parse, complete or help and records how far the
/// input was matched: the nodes visited, the variables collected and the traversal counters.
/// The matcher clones it at every choice point, so abandoning a branch never needs to undo
/// anything.
pub struct Context<'a, U = ()> {
    grammar: &'a Grammar<U>,
    tokens: Arc<TokenStream<'a>>,
    consumed: usize,
    position: NodeId,
    vars: Vars,
    traversed: HashMap<NodeId, u32>,
    history: Vec<NodeId>,
    action: Option<NodeId>,
    user: Option<&'a U>,
}

impl<'a, U> Clone for Context<'a, U> {
    fn clone(&self) -> Self {
        Context {
            grammar: self.grammar,
            tokens: Arc::clone(&self.tokens),
            consumed: self.consumed,
            position: self.position,
            vars: self.vars.clone(),
            traversed: self.traversed.clone(),
            history: self.history.clone(),
            action: self.action,
            user: self.user,
        }
    }
}

impl<'a, U> Context<'a, U> {
    pub(crate) fn new(grammar: &'a Grammar<U>, tokens: TokenStream<'a>, user: Option<&'a U>) -> Self {
        Context {
            grammar,
            tokens: Arc::new(tokens),
            consumed: 0,
            position: grammar.root(),
            vars: Vars::new(),
            traversed: HashMap::new(),
            history: Vec::new(),
            action: None,
            user,
        }
    }

    pub fn grammar(&self) -> &'a Grammar<U> {
        self.grammar
    }

    /// The whole input line.
    pub fn input(&self) -> &'a str {
        self.tokens.input()
    }

    /// Byte offset of the end of the matched part of the input.
    pub fn cursor(&self) -> usize {
        self.tokens.cursor(self.consumed)
    }

    /// The matched part of the input, including whitespace following the last matched token.
    pub fn parsed(&self) -> &'a str {
        &self.input()[..self.cursor()]
    }

    /// The part of the input that was not matched.
    pub fn remaining(&self) -> &'a str {
        &self.input()[self.cursor()..]
    }

    /// Number of tokens matched.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// The node the context is positioned at.
    pub fn position(&self) -> NodeId {
        self.position
    }

    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    /// Nodes matched so far, in order. Actions are not recorded.
    pub fn history(&self) -> &[NodeId] {
        &self.history
    }

    /// How many times the node was traversed.
    pub fn traversed(&self, node: NodeId) -> u32 {
        self.traversed.get(&node).copied().unwrap_or(0)
    }

    /// Returns `true` if the whole input was matched and ended at an action.
    pub fn is_complete(&self) -> bool {
        self.action.is_some()
    }

    /// The action the input matched, if any.
    pub fn action(&self) -> Option<NodeId> {
        self.action
    }

    /// The user object supplied to the parse.
    pub fn user(&self) -> Option<&'a U> {
        self.user
    }

    /// The last node matched, or the root if nothing was matched.
    pub fn last_node(&self) -> &'a NodeInfo<U> {
        self.grammar.node(self.position)
    }

    /// Help for what can follow the matched part of the input.
    pub fn help(&self) -> HelpEntries {
        let mut entries = HelpEntries::default();
        completion::collect_help(self, "", &mut entries);
        entries
    }

    /// Completion candidates for `text` typed after the matched part of the input.
    pub fn candidates(&self, text: &str) -> BTreeSet<String> {
        let mut candidates = BTreeSet::new();
        completion::collect_candidates(self, text, &mut candidates);
        candidates
    }

    /// Invokes the matched action's callback
    ///
    /// Errors returned by the callback are passed through unchanged. Executing a context that
    /// did not reach an action fails with [`ActionError::Incomplete`].
    pub fn execute(&self) -> Result<(), ActionError> {
        let action = self.action.ok_or_else(|| ActionError::Incomplete {
            remaining: self.remaining().to_string(),
        })?;
        match &self.grammar.node(action).kind {
            NodeKind::Action(callback) => {
                tracing::debug!(action = %self.grammar.node(action).path(), "executing action");
                callback.invoke(self)
            }
            _ => Err(ActionError::Incomplete {
                remaining: self.remaining().to_string(),
            }),
        }
    }

    /// Key identifying contexts that the matcher treats the same way
    ///
    /// `None` if the grammar has callbacks looking at the context, which may then distinguish any
    /// two contexts.
    pub(crate) fn state(&self) -> Option<State> {
        if !self.grammar.is_stateless() {
            return None;
        }
        let mut limited: Vec<(NodeId, u32)> = self
            .traversed
            .iter()
            .filter(|(node, _)| self.grammar.node(**node).traversals() != 0)
            .map(|(&node, &count)| (node, count))
            .collect();
        limited.sort_unstable();
        Some(State {
            position: self.position,
            consumed: self.consumed,
            limited,
        })
    }

    /// Whether the matcher may enter the node from the current position.
    pub(crate) fn can_enter(&self, node: &NodeInfo<U>) -> bool {
        if !node.is_action() {
            let limit = node.traversals();
            if limit != 0 && self.traversed(node.id()) >= limit {
                return false;
            }
        }
        node.conditions_hold(self)
    }

    /// The first unmatched token.
    pub(crate) fn next_token(&self) -> Option<Token<'a>> {
        self.tokens.get(self.consumed)
    }

    /// Returns `true` if every token has been matched.
    pub(crate) fn at_end(&self) -> bool {
        self.consumed >= self.tokens.len()
    }

    /// Records that `node` matched the next token, storing its value if it has one.
    pub(crate) fn advance(&mut self, node: &NodeInfo<U>, value: Option<Value>) {
        self.consumed += 1;
        *self.traversed.entry(node.id()).or_insert(0) += 1;
        self.history.push(node.id());
        self.position = node.id();
        if let Some(value) = value {
            self.vars.store(node.var_name(), value, node.traversals() != 1);
        }
    }

    pub(crate) fn finish(&mut self, action: NodeId) {
        self.action = Some(action);
    }
}

impl<U> fmt::Debug for Context<'_, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("parsed", &self.parsed())
            .field("remaining", &self.remaining())
            .field("position", &self.last_node())
            .field("vars", &self.vars)
            .field("action", &self.action.map(|action| self.grammar.node(action)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::Integer;
    use crate::{Alias, Node};

    fn grammar() -> Grammar {
        Grammar::builder()
            .child(
                Node::new("set")
                    .child(Node::variable("level", Integer).child(Node::action(|_| Ok(())))),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn fresh_context() {
        let grammar = grammar();
        let context = Context::new(&grammar, TokenStream::new("  set 5"), None);
        assert_eq!(context.cursor(), 2);
        assert_eq!(context.parsed(), "  ");
        assert_eq!(context.remaining(), "set 5");
        assert_eq!(context.position(), grammar.root());
        assert!(context.history().is_empty());
        assert!(!context.is_complete());
        assert!(context.user().is_none());
    }

    #[test]
    fn advance_records_state() {
        let grammar = grammar();
        let set = grammar.node(grammar.find("/set").unwrap());
        let level = grammar.node(grammar.find("/set/level").unwrap());

        let mut context = Context::new(&grammar, TokenStream::new("set 5 x"), None);
        context.advance(set, None);
        context.advance(level, Some(Value::Int(5)));
        assert_eq!(context.parsed(), "set 5 ");
        assert_eq!(context.remaining(), "x");
        assert_eq!(context.history(), &[set.id(), level.id()]);
        assert_eq!(context.traversed(level.id()), 1);
        assert_eq!(context.vars().get::<i64>("level"), Ok(5));
        assert_eq!(context.last_node().path(), "/set/level");
        assert!(!context.can_enter(level));
    }

    #[test]
    fn clones_are_independent() {
        let grammar = grammar();
        let set = grammar.node(grammar.find("/set").unwrap());
        let context = Context::new(&grammar, TokenStream::new("set"), None);
        let mut branch = context.clone();
        branch.advance(set, None);
        assert_eq!(context.traversed(set.id()), 0);
        assert_eq!(branch.traversed(set.id()), 1);
        assert!(branch.at_end());
        assert!(!context.at_end());
    }

    #[test]
    fn state_ignores_unlimited_counters() {
        let grammar = Grammar::builder()
            .child(
                Node::new("add")
                    .child(Node::variable("item", Integer).traversals(0).alias(Alias::new(".."))),
            )
            .build()
            .unwrap();
        let add = grammar.node(grammar.find("/add").unwrap());
        let item = grammar.node(grammar.find("/add/item").unwrap());

        let mut first = Context::new(&grammar, TokenStream::new("add 1 2"), None);
        first.advance(add, None);
        let mut second = first.clone();
        first.advance(item, Some(Value::Int(1)));
        second.advance(item, Some(Value::Int(2)));
        assert_eq!(first.state(), second.state());
        assert!(first.state().is_some());

        let conditional = Grammar::builder()
            .child(Node::new("add").condition(|_| true))
            .build()
            .unwrap();
        let context = Context::new(&conditional, TokenStream::new("add"), None);
        assert_eq!(context.state(), None);
    }

    #[test]
    fn execute_incomplete() {
        let grammar = grammar();
        let context = Context::new(&grammar, TokenStream::new("set"), None);
        match context.execute() {
            Err(ActionError::Incomplete { remaining }) => assert_eq!(remaining, "set"),
            other => panic!("expected an incomplete context, found {:?}", other),
        }
    }
}
