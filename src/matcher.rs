//! Depth-first matching of tokens against the grammar
//!
//! From the current position every edge is tried in order. A non-action edge must match the next
//! token, so every step consumes input and the search terminates even if aliases form cycles.
//! An action edge matches only when no tokens remain; the first such match ends the search.
//!
//! Ambiguous grammars can reach the same state along many paths. In a grammar without context
//! callbacks the states that failed to reach an action are remembered and not explored again,
//! which keeps the search linear in the number of states instead of the number of paths.

use crate::context::{Context, State};
use crate::grammar::{NodeInfo, NodeKind};
use std::collections::HashSet;

/// Matches the remaining tokens of the context
///
/// Returns the context that reached an action, or, if there is none, the one that matched the
/// longest prefix of the input.
pub(crate) fn match_tokens<'a, U>(context: Context<'a, U>) -> Context<'a, U> {
    let mut best = context.clone();
    let mut failed = HashSet::new();
    let result = descend(context, &mut best, &mut failed);
    tracing::trace!(failed = failed.len(), "search finished");
    match result {
        Some(complete) => complete,
        None => best,
    }
}

fn descend<'a, U>(
    context: Context<'a, U>,
    best: &mut Context<'a, U>,
    failed: &mut HashSet<State>,
) -> Option<Context<'a, U>> {
    let state = context.state();
    if let Some(state) = &state {
        if failed.contains(state) {
            return None;
        }
    }

    let grammar = context.grammar();
    for &edge in grammar.node(context.position()).edges() {
        let node = grammar.node(edge);
        if !context.can_enter(node) {
            tracing::trace!(node = %node.path(), "edge not available");
            continue;
        }

        if node.is_action() {
            if context.at_end() {
                tracing::trace!(action = %node.path(), "matched action");
                let mut complete = context.clone();
                complete.finish(edge);
                return Some(complete);
            }
            continue;
        }

        let next = match step(&context, node) {
            Some(next) => next,
            None => continue,
        };
        if next.consumed() > best.consumed() {
            *best = next.clone();
        }
        if let Some(complete) = descend(next, best, failed) {
            return Some(complete);
        }
        tracing::trace!(node = %node.path(), "backtracking");
    }

    if let Some(state) = state {
        failed.insert(state);
    }
    None
}

/// Tries to match the next token with a non-action node, returning the advanced context.
pub(crate) fn step<'a, U>(context: &Context<'a, U>, node: &NodeInfo<U>) -> Option<Context<'a, U>> {
    let token = context.next_token()?;
    let text = token.text();
    if !node.matches(text) {
        return None;
    }

    if node.match_candidates {
        let is_candidate = node
            .candidates_for(context, text)
            .iter()
            .any(|candidate| candidate.trim_end() == text);
        if !is_candidate {
            tracing::trace!(node = %node.path(), token = text, "not one of the candidates");
            return None;
        }
    }

    let value = match &node.kind {
        NodeKind::Variable(kind) => match kind.parse(text) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::trace!(node = %node.path(), %error, "variable rejected token");
                return None;
            }
        },
        _ => None,
    };

    tracing::trace!(node = %node.path(), token = text, "matched token");
    let mut next = context.clone();
    next.advance(node, value);
    Some(next)
}
