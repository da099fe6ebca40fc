//! The grammar: an arena of nodes connected by child and alias edges
//!
//! A grammar is declared with the builder types ([`Node`], [`Alias`], [`Group`]) and turned into
//! a [`Grammar`] by [`GrammarBuilder::build`]. Building assigns every node a [`NodeId`],
//! compiles patterns, applies group attributes and resolves aliases. After that the grammar is
//! immutable and can be shared between any number of concurrent parses.
//!
//! Attribute precedence, from highest to lowest: the value set on the node, the value set on the
//! innermost enclosing [`Group`], the default of the node's [variable kind](crate::VariableKind),
//! the global default (one traversal, help group 0). Actions default to help group
//! [`ACTION_GROUP`] so that `<eol>` is listed after everything else.

mod alias;
mod builder;
mod node;

pub use builder::{Alias, GrammarBuilder, Group, Node};
pub use node::{cull_candidates, CallbackResult, Condition, Help, NodeId, NodeInfo};

pub(crate) use node::{compile_pattern, NodeKind};

use crate::error::GrammarError;
use alias::PendingAlias;
use builder::{Element, Merge, NodeSpec};
use std::collections::{HashMap, HashSet};

/// Help group of actions that set no group themselves and are not inside a group that does.
pub const ACTION_GROUP: u32 = 9999;

/// Attributes inherited from enclosing groups
struct Inherited<U> {
    traversals: Option<u32>,
    group: Option<u32>,
    conditions: Vec<node::Condition<U>>,
}

impl<U> Default for Inherited<U> {
    fn default() -> Self {
        Inherited {
            traversals: None,
            group: None,
            conditions: Vec::new(),
        }
    }
}

impl<U> Clone for Inherited<U> {
    fn clone(&self) -> Self {
        Inherited {
            traversals: self.traversals,
            group: self.group,
            conditions: self.conditions.clone(),
        }
    }
}

/// One position in a parent's list of edges, before aliases are resolved
enum Slot {
    Node(NodeId),
    Alias(usize),
}

/// A built grammar
pub struct Grammar<U = ()> {
    nodes: Vec<NodeInfo<U>>,
    labels: HashMap<String, NodeId>,
    stateless: bool,
}

impl Grammar<()> {
    /// Starts building a grammar whose callbacks take no user object.
    pub fn builder() -> GrammarBuilder<()> {
        GrammarBuilder::new()
    }
}

impl<U> Grammar<U> {
    /// The root node. It has no pattern and matches the start of the input.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Returns the node with the given handle
    ///
    /// # Panics
    ///
    /// Panics if the handle was produced by a different grammar.
    pub fn node(&self, id: NodeId) -> &NodeInfo<U> {
        &self.nodes[id.0]
    }

    /// Iterates over all nodes, the root first, in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeInfo<U>> {
        self.nodes.iter()
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Returns `true` if no node has a condition, a candidate callback or a help callback
    ///
    /// Whether a node can be entered then depends only on the current position, the number of
    /// matched tokens and the traversal counters, which lets the matcher skip states it has
    /// already explored.
    pub fn is_stateless(&self) -> bool {
        self.stateless
    }

    /// Finds a node by its absolute path (`/a/b`) or by its label.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        if let Some(&labelled) = self.labels.get(path) {
            return Some(labelled);
        }
        let path = path.strip_prefix('/')?;
        let segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();
        self.find_segments(&segments)
    }

    pub(crate) fn from_elements(
        elements: Vec<Element<U>>,
        merges: Vec<Merge<U>>,
    ) -> Result<Self, GrammarError> {
        let mut grammar = Grammar {
            nodes: vec![NodeInfo {
                id: NodeId::ROOT,
                name: String::new(),
                path: "/".to_string(),
                parent: None,
                kind: NodeKind::Root,
                pattern: None,
                literal: false,
                help: None,
                traversals: 1,
                group: 0,
                label: None,
                var_name: String::new(),
                candidates: None,
                match_candidates: false,
                conditions: Vec::new(),
                children: Vec::new(),
                edges: Vec::new(),
            }],
            labels: HashMap::new(),
            stateless: false,
        };

        let mut slots = vec![Vec::new()];
        let mut aliases = Vec::new();
        let mut names = vec![HashSet::new()];
        let mut anonymous = vec![0];
        let mut scratch = Scratch {
            slots: &mut slots,
            aliases: &mut aliases,
            names: &mut names,
            anonymous: &mut anonymous,
        };
        grammar.add_elements(NodeId::ROOT, elements, &Inherited::default(), &mut scratch)?;
        grammar.add_merges(NodeId::ROOT, merges, &mut scratch)?;

        let resolved = aliases
            .iter()
            .map(|alias| grammar.resolve_alias(alias))
            .collect::<Result<Vec<_>, _>>()?;

        let mut alias_edges = 0;
        for (node, node_slots) in grammar.nodes.iter_mut().zip(slots) {
            for slot in node_slots {
                match slot {
                    Slot::Node(child) => node.edges.push(child),
                    Slot::Alias(index) => {
                        alias_edges += resolved[index].len();
                        node.edges.extend_from_slice(&resolved[index]);
                    }
                }
            }
        }

        grammar.stateless = grammar.nodes.iter().all(NodeInfo::is_stateless);
        tracing::debug!(
            nodes = grammar.nodes.len(),
            aliases = aliases.len(),
            alias_edges,
            stateless = grammar.stateless,
            "grammar built"
        );
        Ok(grammar)
    }

    fn add_elements(
        &mut self,
        parent: NodeId,
        elements: Vec<Element<U>>,
        inherited: &Inherited<U>,
        scratch: &mut Scratch<'_>,
    ) -> Result<(), GrammarError> {
        for element in elements {
            match element {
                Element::Node(node) => {
                    self.add_node(parent, node, inherited, scratch)?;
                }
                Element::Alias(alias) => {
                    let name = self.register_name(parent, alias.name, scratch)?;
                    let path = child_path(self.node(parent).path(), &name);
                    scratch.slots[parent.0].push(Slot::Alias(scratch.aliases.len()));
                    scratch.aliases.push(PendingAlias {
                        path,
                        target: alias.target,
                    });
                }
                Element::Group(group) => {
                    let mut nested = inherited.clone();
                    nested.traversals = group.traversals.or(inherited.traversals);
                    nested.group = group.id.or(inherited.group);
                    nested.conditions.extend(group.condition);
                    self.add_elements(parent, group.children, &nested, scratch)?;
                }
            }
        }
        Ok(())
    }

    fn add_merges(
        &mut self,
        base: NodeId,
        merges: Vec<Merge<U>>,
        scratch: &mut Scratch<'_>,
    ) -> Result<(), GrammarError> {
        for merge in merges {
            let target = self
                .locate(base, &merge.target)
                .filter(|&target| !self.node(target).is_action())
                .ok_or_else(|| GrammarError::MergeTarget {
                    target: merge.target.clone(),
                })?;
            tracing::debug!(target = %self.node(target).path(), "merging grammar");
            self.add_elements(target, merge.children, &Inherited::default(), scratch)?;
            self.add_merges(target, merge.merges, scratch)?;
        }
        Ok(())
    }

    /// Finds a node by label, or by a path taken from `base`.
    fn locate(&self, base: NodeId, target: &str) -> Option<NodeId> {
        if let Some(&labelled) = self.labels.get(target) {
            return Some(labelled);
        }
        let segments: Vec<&str> = target.split('/').filter(|segment| !segment.is_empty()).collect();
        self.find_segments_from(base, &segments)
    }

    fn register_name(
        &self,
        parent: NodeId,
        name: Option<String>,
        scratch: &mut Scratch<'_>,
    ) -> Result<String, GrammarError> {
        let parent_path = self.node(parent).path();
        let name = match name {
            Some(name) => {
                if name.is_empty() || name.contains('/') || name == "." || name == ".." {
                    return Err(GrammarError::InvalidName {
                        parent: parent_path.to_string(),
                        name,
                    });
                }
                name
            }
            None => {
                let counter = &mut scratch.anonymous[parent.0];
                let name = format!("@{}", counter);
                *counter += 1;
                name
            }
        };
        if !scratch.names[parent.0].insert(name.clone()) {
            return Err(GrammarError::DuplicateChild {
                parent: parent_path.to_string(),
                name,
            });
        }
        Ok(name)
    }

    fn add_node(
        &mut self,
        parent: NodeId,
        node: Node<U>,
        inherited: &Inherited<U>,
        scratch: &mut Scratch<'_>,
    ) -> Result<NodeId, GrammarError> {
        let id = NodeId(self.nodes.len());
        let name = self.register_name(parent, node.name, scratch)?;
        let path = child_path(self.node(parent).path(), &name);

        let (kind, kind_pattern, kind_traversals, kind_match_candidates) = match node.spec {
            NodeSpec::Literal => (NodeKind::Literal, None, None, false),
            NodeSpec::Variable(kind) => {
                let pattern = kind.pattern();
                let traversals = kind.traversals();
                let match_candidates = kind.match_candidates();
                (NodeKind::Variable(kind), pattern, traversals, match_candidates)
            }
            NodeSpec::Action(callback) => (NodeKind::Action(callback), None, None, false),
        };

        let is_action = matches!(kind, NodeKind::Action(_));
        let literal = !is_action && node.pattern.is_none() && kind_pattern.is_none();
        let pattern = if is_action {
            None
        } else {
            let source = match (&node.pattern, &kind_pattern) {
                (Some(pattern), _) => pattern.clone(),
                (None, Some(pattern)) => pattern.to_string(),
                (None, None) => regex::escape(&name),
            };
            let regex = compile_pattern(&source).map_err(|source| GrammarError::InvalidPattern {
                path: path.clone(),
                source,
            })?;
            Some(regex)
        };

        if let Some(label) = &node.label {
            if let Some(&existing) = self.labels.get(label) {
                return Err(GrammarError::DuplicateLabel {
                    label: label.clone(),
                    path: self.node(existing).path().to_string(),
                });
            }
            self.labels.insert(label.clone(), id);
        }

        let mut conditions = inherited.conditions.clone();
        conditions.extend(node.condition);
        let match_candidates = node
            .match_candidates
            .unwrap_or(node.candidates.is_some() || kind_match_candidates);

        tracing::trace!(path = %path, "adding node");
        self.nodes.push(NodeInfo {
            id,
            var_name: node.var_name.unwrap_or_else(|| name.clone()),
            name,
            path,
            parent: Some(parent),
            kind,
            pattern,
            literal,
            help: node.help,
            traversals: node
                .traversals
                .or(inherited.traversals)
                .or(kind_traversals)
                .unwrap_or(1),
            group: node
                .group
                .or(inherited.group)
                .unwrap_or(if is_action { ACTION_GROUP } else { 0 }),
            label: node.label,
            candidates: node.candidates,
            match_candidates,
            conditions,
            children: Vec::new(),
            edges: Vec::new(),
        });
        scratch.slots.push(Vec::new());
        scratch.names.push(HashSet::new());
        scratch.anonymous.push(0);
        self.nodes[parent.0].children.push(id);
        scratch.slots[parent.0].push(Slot::Node(id));

        self.add_elements(id, node.children, inherited, scratch)?;
        Ok(id)
    }
}

/// Per-node bookkeeping used only while building
struct Scratch<'a> {
    slots: &'a mut Vec<Vec<Slot>>,
    aliases: &'a mut Vec<PendingAlias>,
    names: &'a mut Vec<HashSet<String>>,
    anonymous: &'a mut Vec<usize>,
}

fn child_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}

impl<U> std::fmt::Debug for Grammar<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.nodes.iter()).finish()
    }
}
