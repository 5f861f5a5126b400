//! Applies a finished work-in-progress tree to the host in one step.

use std::fmt;

use crate::error::FiberError;
use crate::fiber::{EffectTag, FiberId, FiberTree, WorkState};
use crate::host::Host;
use crate::mutation::update_host_properties;

/// Host effects applied by one commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub placements: usize,
    pub updates: usize,
    pub deletions: usize,
}

impl fmt::Display for CommitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} placed, {} updated, {} deleted",
            self.placements, self.updates, self.deletions
        )
    }
}

/// Removes deleted subtrees, then walks the new tree in preorder applying
/// placements and property updates, then promotes it to current.
///
/// Deletion targets are resolved before the host is touched, so a
/// malformed deletion leaves the host unchanged and the committed tree
/// current. Once the host has been mutated, a failing operation no longer
/// stops the commit: the remaining effects are still applied, the new tree
/// is promoted and the first error is returned. The pass is consumed
/// either way.
pub(crate) fn commit_root<H: Host>(
    state: &mut WorkState<H::Node>,
    host: &mut H,
) -> Result<CommitSummary, FiberError> {
    let Some(mut wip) = state.wip.take() else {
        return Ok(CommitSummary::default());
    };
    state.next_unit = None;
    let deletions = std::mem::take(&mut state.deletions);

    let targets = match resolve_deletions(state.current.as_ref(), &deletions) {
        Ok(targets) => targets,
        Err(err) => {
            state.unmark_deletions(&deletions);
            return Err(err);
        }
    };

    let mut summary = CommitSummary::default();
    let mut failure = None;
    for (parent, node) in &targets {
        match host.remove_child(parent, node) {
            Ok(()) => summary.deletions += 1,
            Err(err) => {
                log::warn!("removing host node {node:?} failed: {err}");
                failure.get_or_insert(err);
            }
        }
    }
    commit_effects(&wip, state.current.as_ref(), host, &mut summary, &mut failure);

    wip.release_alternates();
    state.current = Some(wip);
    match failure {
        Some(err) => Err(err),
        None => Ok(summary),
    }
}

fn resolve_deletions<N: Clone>(
    current: Option<&FiberTree<N>>,
    deletions: &[FiberId],
) -> Result<Vec<(N, N)>, FiberError> {
    let Some(tree) = current else {
        return Ok(Vec::new());
    };
    deletions
        .iter()
        .map(|&fiber| {
            let node = deletion_target(tree, fiber)?;
            let parent = tree
                .host_parent(fiber)
                .cloned()
                .ok_or(FiberError::MalformedSubtree { fiber })?;
            Ok((parent, node))
        })
        .collect()
}

/// First host node on the `child` chain below `fiber`, `fiber` included.
///
/// A component's other descendants are not visited.
fn deletion_target<N: Clone>(tree: &FiberTree<N>, fiber: FiberId) -> Result<N, FiberError> {
    let mut cursor = fiber;
    loop {
        if let Some(node) = tree[cursor].host_node.as_ref() {
            return Ok(node.clone());
        }
        match tree[cursor].child {
            Some(child) => cursor = child,
            None => return Err(FiberError::MalformedSubtree { fiber: cursor }),
        }
    }
}

fn commit_effects<H: Host>(
    wip: &FiberTree<H::Node>,
    current: Option<&FiberTree<H::Node>>,
    host: &mut H,
    summary: &mut CommitSummary,
    failure: &mut Option<FiberError>,
) {
    let mut stack: Vec<FiberId> = wip.root().child.into_iter().collect();
    while let Some(id) = stack.pop() {
        let fiber = &wip[id];
        let applied = match (fiber.effect_tag, fiber.host_node.as_ref()) {
            (EffectTag::Placement, Some(node)) => wip
                .host_parent(id)
                .ok_or(FiberError::MalformedSubtree { fiber: id })
                .and_then(|parent| host.append_child(parent, node))
                .map(|()| summary.placements += 1),
            (EffectTag::Update, Some(node)) => match (current, fiber.alternate) {
                (Some(tree), Some(alternate)) => update_host_properties(
                    host,
                    node,
                    &tree[alternate].props.attributes,
                    &fiber.props.attributes,
                )
                .map(|()| summary.updates += 1),
                _ => Err(FiberError::MalformedSubtree { fiber: id }),
            },
            _ => Ok(()),
        };
        if let Err(err) = applied {
            log::warn!("commit effect on fiber {id} failed: {err}");
            failure.get_or_insert(err);
        }
        if let Some(sibling) = fiber.sibling {
            stack.push(sibling);
        }
        if let Some(child) = fiber.child {
            stack.push(child);
        }
    }
}

#[cfg(test)]
#[path = "tests/commit_tests.rs"]
mod tests;
