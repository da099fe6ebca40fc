//! Completion candidates and contextual help
//!
//! Both work on partial input: the complete tokens are matched the same way as when parsing,
//! except that every position that consumes all of them is collected instead of stopping at the
//! first. The edges available at those positions are then asked for candidates or help for the
//! token being typed.

use crate::context::{Context, State};
use crate::grammar::Help;
use crate::matcher::step;
use linked_hash_map::LinkedHashMap;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Collects every context that has matched all tokens of the stream
///
/// In a stateless grammar contexts in the same state offer the same candidates and help, so
/// only the first context reaching each state is kept.
pub(crate) fn positions<U>(context: Context<'_, U>) -> Vec<Context<'_, U>> {
    let mut found = Vec::new();
    let mut seen = HashSet::new();
    collect_positions(context, &mut found, &mut seen);
    found
}

fn collect_positions<'a, U>(
    context: Context<'a, U>,
    found: &mut Vec<Context<'a, U>>,
    seen: &mut HashSet<State>,
) {
    if let Some(state) = context.state() {
        if !seen.insert(state) {
            return;
        }
    }
    if context.at_end() {
        found.push(context);
        return;
    }
    let grammar = context.grammar();
    for &edge in grammar.node(context.position()).edges() {
        let node = grammar.node(edge);
        if node.is_action() || !context.can_enter(node) {
            continue;
        }
        if let Some(next) = step(&context, node) {
            collect_positions(next, found, seen);
        }
    }
}

/// Adds the candidates offered for `text` by the edges available at the context's position
///
/// A candidate ending with a space completes the token, it is only offered if the node would
/// accept it. Other candidates (a directory name, say) are prefixes and are offered as is.
pub(crate) fn collect_candidates<U>(
    context: &Context<'_, U>,
    text: &str,
    candidates: &mut BTreeSet<String>,
) {
    let grammar = context.grammar();
    for &edge in grammar.node(context.position()).edges() {
        let node = grammar.node(edge);
        if node.is_action() || !context.can_enter(node) {
            continue;
        }
        if node.is_literal() && node.candidates.is_none() {
            if node.name().starts_with(text) {
                candidates.insert(format!("{} ", node.name()));
            }
            continue;
        }
        for candidate in node.candidates_for(context, text) {
            let complete = candidate.ends_with(' ');
            if !complete || node.accepts(candidate.trim_end()) {
                candidates.insert(candidate);
            } else {
                tracing::trace!(node = %node.path(), %candidate, "candidate rejected by node");
            }
        }
    }
}

/// Adds help for the edges available at the context's position, filtered by `text`.
pub(crate) fn collect_help<U>(context: &Context<'_, U>, text: &str, entries: &mut HelpEntries) {
    let grammar = context.grammar();
    for &edge in grammar.node(context.position()).edges() {
        let node = grammar.node(edge);
        if !context.can_enter(node) || (node.is_action() && !text.is_empty()) {
            continue;
        }
        match &node.help {
            Some(Help::Dynamic(callback)) => {
                for (key, help) in callback(context) {
                    if key.starts_with('<') || key.starts_with(text) {
                        entries.insert(key, help, node.group());
                    }
                }
            }
            static_help => {
                if node.is_literal() && !node.name().starts_with(text) {
                    continue;
                }
                let help = match static_help {
                    Some(Help::Text(help)) => help.clone(),
                    _ => String::new(),
                };
                entries.insert(node.help_key(), help, node.group());
            }
        }
    }
}

/// One line of help: what can be typed and what it means
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    pub key: String,
    pub text: String,
    pub group: u32,
}

/// Help entries in the order the grammar declares them, without duplicate keys
#[derive(Debug, Clone, Default)]
pub struct HelpEntries {
    entries: LinkedHashMap<String, HelpEntry>,
}

impl HelpEntries {
    /// Adds an entry unless one with the same key is already present.
    fn insert(&mut self, key: String, text: String, group: u32) {
        if !self.entries.contains_key(&key) {
            let entry = HelpEntry {
                key: key.clone(),
                text,
                group,
            };
            self.entries.insert(key, entry);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &HelpEntry> {
        self.entries.values()
    }

    pub fn get(&self, key: &str) -> Option<&HelpEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(key, text)` pairs in order.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.iter()
            .map(|entry| (entry.key.as_str(), entry.text.as_str()))
            .collect()
    }

    /// Renders the entries as aligned lines
    ///
    /// Entries are ordered by group, keeping the declaration order within a group, and groups
    /// are separated by a blank line.
    pub fn format(&self) -> String {
        let mut entries: Vec<&HelpEntry> = self.iter().collect();
        entries.sort_by_key(|entry| entry.group);
        let width = entries.iter().map(|entry| entry.key.len()).max().unwrap_or(0);

        let mut output = String::new();
        let mut group = None;
        for entry in entries {
            if group.map_or(false, |group| group != entry.group) {
                output.push('\n');
            }
            group = Some(entry.group);
            let line = format!("  {:<width$} {}", entry.key, entry.text, width = width);
            output.push_str(line.trim_end());
            output.push('\n');
        }
        output
    }
}

impl fmt::Display for HelpEntries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}
