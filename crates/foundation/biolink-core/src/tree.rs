//! Sequence operations over content nodes.
//!
//! None of these care whether the sequence is a page's top level or a
//! folder's children. Edits act on the top level of the sequence they are
//! handed; reaching into a folder means handing over that folder's children
//! (see [`crate::editor::EditorCursor`]).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::node::{ContentNode, NodePatch};
use crate::{Error, Result};

/// Direction for [`move_node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Append a node at the end. Callers supply a fresh id; duplicates are not checked.
pub fn insert(mut seq: Vec<ContentNode>, node: ContentNode) -> Vec<ContentNode> {
    seq.push(node);
    seq
}

/// Merge `patch` into the top-level node with `id`. No-op if absent.
pub fn update_by_id(mut seq: Vec<ContentNode>, id: &str, patch: &NodePatch) -> Vec<ContentNode> {
    if let Some(node) = seq.iter_mut().find(|n| n.id == id) {
        node.apply(patch);
    }
    seq
}

/// Remove the top-level node with `id` (and its subtree).
pub fn delete_by_id(mut seq: Vec<ContentNode>, id: &str) -> Vec<ContentNode> {
    seq.retain(|n| n.id != id);
    seq
}

/// Swap the node at `index` with its neighbour. Identity at the boundary
/// or when `index` is out of range.
pub fn move_node(mut seq: Vec<ContentNode>, index: usize, direction: Direction) -> Vec<ContentNode> {
    match direction {
        Direction::Up if index > 0 && index < seq.len() => seq.swap(index, index - 1),
        Direction::Down if index + 1 < seq.len() => seq.swap(index, index + 1),
        _ => {}
    }
    seq
}

/// Lazily walk the visible part of a sequence.
///
/// A node is visible when it is active and not expired at `now`. Hidden
/// folders prune their whole subtree; a visible folder whose children are
/// all hidden still shows up (empty).
pub fn visible(seq: &[ContentNode], now: DateTime<Utc>) -> impl Iterator<Item = VisibleNode<'_>> + '_ {
    seq.iter()
        .filter(move |node| node.is_visible(now))
        .map(move |node| VisibleNode { node, now })
}

/// Owned copy of the visible tree
pub fn visible_projection(seq: &[ContentNode], now: DateTime<Utc>) -> Vec<ContentNode> {
    visible(seq, now).map(|v| v.to_owned_node()).collect()
}

/// A node that passed the visibility filter, borrowed from its tree
#[derive(Debug, Clone, Copy)]
pub struct VisibleNode<'a> {
    node: &'a ContentNode,
    now: DateTime<Utc>,
}

impl<'a> VisibleNode<'a> {
    pub fn node(&self) -> &'a ContentNode {
        self.node
    }

    /// Visible children, in order
    pub fn children(&self) -> impl Iterator<Item = VisibleNode<'a>> + 'a {
        visible(self.node.children(), self.now)
    }

    pub fn to_owned_node(&self) -> ContentNode {
        let mut node = self.node.clone();
        node.children = node
            .is_folder()
            .then(|| self.children().map(|c| c.to_owned_node()).collect());
        node
    }
}

impl std::ops::Deref for VisibleNode<'_> {
    type Target = ContentNode;

    fn deref(&self) -> &ContentNode {
        self.node
    }
}

/// Find a node by id at any depth
pub fn find<'a>(seq: &'a [ContentNode], id: &str) -> Option<&'a ContentNode> {
    for node in seq {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find(node.children(), id) {
            return Some(found);
        }
    }
    None
}

/// Total number of nodes at all depths
pub fn count(seq: &[ContentNode]) -> usize {
    seq.iter().map(|n| 1 + count(n.children())).sum()
}

/// Enforce the folder shape at every depth: folders always carry a child
/// list (a missing one becomes empty), nothing else may carry one.
pub fn check_shape(seq: &mut [ContentNode]) -> Result<()> {
    for node in seq {
        if node.is_folder() {
            check_shape(node.children.get_or_insert_with(Vec::new))?;
        } else if node.children.is_some() {
            return Err(Error::Validation(format!(
                "item {} is not a folder and cannot hold children",
                node.id
            )));
        }
    }
    Ok(())
}

/// Ids that occur more than once anywhere in the tree
pub fn duplicate_ids(seq: &[ContentNode]) -> Vec<String> {
    fn tally<'a>(seq: &'a [ContentNode], seen: &mut HashMap<&'a str, usize>) {
        for node in seq {
            *seen.entry(node.id.as_str()).or_default() += 1;
            tally(node.children(), seen);
        }
    }

    let mut seen = HashMap::new();
    tally(seq, &mut seen);
    let mut dups: Vec<String> = seen
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(id, _)| id.to_string())
        .collect();
    dups.sort();
    dups
}
