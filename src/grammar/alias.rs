//! Resolution of alias targets into edges.

use super::node::NodeId;
use super::Grammar;
use crate::error::GrammarError;
use glob::Pattern;

/// An alias waiting for resolution: where it is declared and what it refers to
pub(crate) struct PendingAlias {
    pub(crate) path: String,
    pub(crate) target: String,
}

fn is_glob(segment: &str) -> bool {
    segment.contains(['*', '?', '['])
}

/// Normalizes a path lexically: `.` segments are dropped, `..` removes the preceding segment.
fn normalize(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => (),
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    segments
}

impl<U> Grammar<U> {
    /// Computes the absolute target path of an alias, substituting a leading label.
    fn absolute_target(&self, alias: &PendingAlias) -> String {
        let target = alias.target.as_str();
        if !target.starts_with('/') {
            let (first, rest) = target.split_once('/').unwrap_or((target, ""));
            if let Some(&labelled) = self.labels.get(first) {
                return format!("{}/{}", self.node(labelled).path(), rest);
            }
            return format!("{}/{}", alias.path, target);
        }
        target.to_string()
    }

    /// Returns the nodes an alias refers to, in declaration order.
    pub(crate) fn resolve_alias(&self, alias: &PendingAlias) -> Result<Vec<NodeId>, GrammarError> {
        let absolute = self.absolute_target(alias);
        let segments = normalize(&absolute);
        let unresolved = || GrammarError::UnresolvedAlias {
            alias: alias.path.clone(),
            target: format!("/{}", segments.join("/")),
        };

        match segments.split_last() {
            Some((last, parents)) if is_glob(last) => {
                let pattern = Pattern::new(last).map_err(|source| GrammarError::InvalidGlob {
                    pattern: alias.target.clone(),
                    source,
                })?;
                let parent = self.find_segments(parents).ok_or_else(unresolved)?;
                let targets: Vec<NodeId> = self
                    .node(parent)
                    .children()
                    .iter()
                    .copied()
                    .filter(|&child| {
                        let node = self.node(child);
                        !node.is_action() && pattern.matches(node.name())
                    })
                    .collect();
                tracing::trace!(
                    alias = %alias.path,
                    target = %alias.target,
                    matched = targets.len(),
                    "resolved alias glob"
                );
                Ok(targets)
            }
            _ => {
                let target = self.find_segments(&segments).ok_or_else(unresolved)?;
                tracing::trace!(
                    alias = %alias.path,
                    target = %self.node(target).path(),
                    "resolved alias"
                );
                Ok(vec![target])
            }
        }
    }

    pub(crate) fn find_segments(&self, segments: &[&str]) -> Option<NodeId> {
        self.find_segments_from(NodeId::ROOT, segments)
    }

    pub(crate) fn find_segments_from(&self, start: NodeId, segments: &[&str]) -> Option<NodeId> {
        let mut current = start;
        for segment in segments {
            current = self
                .node(current)
                .children()
                .iter()
                .copied()
                .find(|&child| self.node(child).name() == *segment)?;
        }
        Some(current)
    }
}
