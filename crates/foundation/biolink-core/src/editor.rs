//! Drill-down editing.
//!
//! [`NodeIndex`] maps every id in a tree to its location so any node can be
//! reached without a search. [`EditorCursor`] is the folder breadcrumb the
//! editor is currently inside; [`EditorCursor::apply`] runs a sequence
//! operation on the folder in scope and writes the new children back into
//! each ancestor with [`update_by_id`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::node::{ContentNode, NodePatch};
use crate::tree::update_by_id;
use crate::{Error, Result};

/// Where a node lives in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLocation {
    /// Enclosing folder, `None` at the top level
    pub parent: Option<String>,
    /// Index at each depth, from the top level down
    pub path: Vec<usize>,
}

/// Flat id -> location map over one tree snapshot
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    locations: HashMap<String, NodeLocation>,
}

impl NodeIndex {
    pub fn build(seq: &[ContentNode]) -> Self {
        let mut index = Self::default();
        index.walk(seq, None, &mut Vec::new());
        index
    }

    fn walk(&mut self, seq: &[ContentNode], parent: Option<&str>, path: &mut Vec<usize>) {
        for (i, node) in seq.iter().enumerate() {
            path.push(i);
            self.locations.insert(
                node.id.clone(),
                NodeLocation {
                    parent: parent.map(str::to_string),
                    path: path.clone(),
                },
            );
            self.walk(node.children(), Some(node.id.as_str()), path);
            path.pop();
        }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn location(&self, id: &str) -> Option<&NodeLocation> {
        self.locations.get(id)
    }

    /// Resolve a node in the tree this index was built from
    pub fn get<'a>(&self, seq: &'a [ContentNode], id: &str) -> Option<&'a ContentNode> {
        let location = self.locations.get(id)?;
        let (last, ancestors) = location.path.split_last()?;
        let mut current = seq;
        for &i in ancestors {
            current = current.get(i)?.children();
        }
        current.get(*last).filter(|node| node.id == id)
    }

    /// Folder ids from the top level down to `id`, inclusive
    pub fn trail_to(&self, id: &str) -> Option<Vec<String>> {
        let mut trail = vec![id.to_string()];
        let mut current = self.locations.get(id)?;
        while let Some(parent) = &current.parent {
            trail.push(parent.clone());
            current = self.locations.get(parent)?;
        }
        trail.reverse();
        Some(trail)
    }
}

/// One breadcrumb entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crumb {
    pub id: String,
    pub title: String,
}

/// The folder the editor is working inside, as a stack of folder ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorCursor {
    trail: Vec<String>,
}

impl EditorCursor {
    /// Cursor at the page's top level
    pub fn root() -> Self {
        Self::default()
    }

    /// Cursor pointing at `folder_id` anywhere in `links`
    pub fn locate(links: &[ContentNode], folder_id: &str) -> Result<Self> {
        let index = NodeIndex::build(links);
        let node = index
            .get(links, folder_id)
            .ok_or_else(|| Error::NotFound(format!("item {}", folder_id)))?;
        if !node.is_folder() {
            return Err(Error::Validation(format!("'{}' is not a folder", node.title)));
        }
        let trail = index
            .trail_to(folder_id)
            .ok_or_else(|| Error::NotFound(format!("item {}", folder_id)))?;
        Ok(Self { trail })
    }

    /// Drill into a folder of the sequence currently in scope
    pub fn enter(&mut self, links: &[ContentNode], folder_id: &str) -> Result<()> {
        let scope = self.scope(links)?;
        let node = scope
            .iter()
            .find(|n| n.id == folder_id)
            .ok_or_else(|| Error::NotFound(format!("item {}", folder_id)))?;
        if !node.is_folder() {
            return Err(Error::Validation(format!("'{}' is not a folder", node.title)));
        }
        self.trail.push(folder_id.to_string());
        Ok(())
    }

    /// Go up one level. Returns the folder that was left.
    pub fn back(&mut self) -> Option<String> {
        self.trail.pop()
    }

    pub fn is_root(&self) -> bool {
        self.trail.is_empty()
    }

    pub fn current_folder(&self) -> Option<&str> {
        self.trail.last().map(String::as_str)
    }

    pub fn breadcrumb(&self) -> &[String] {
        &self.trail
    }

    /// Breadcrumb with folder titles
    pub fn crumbs(&self, links: &[ContentNode]) -> Result<Vec<Crumb>> {
        let mut crumbs = Vec::with_capacity(self.trail.len());
        let mut current = links;
        for id in &self.trail {
            let folder = folder_in(current, id)?;
            crumbs.push(Crumb {
                id: folder.id.clone(),
                title: folder.title.clone(),
            });
            current = folder.children();
        }
        Ok(crumbs)
    }

    /// The sequence being edited
    pub fn scope<'a>(&self, links: &'a [ContentNode]) -> Result<&'a [ContentNode]> {
        let mut current = links;
        for id in &self.trail {
            current = folder_in(current, id)?.children();
        }
        Ok(current)
    }

    /// Run `edit` on the scoped sequence and rebuild the top level around it
    pub fn apply<F>(&self, links: Vec<ContentNode>, edit: F) -> Result<Vec<ContentNode>>
    where
        F: FnOnce(Vec<ContentNode>) -> Vec<ContentNode>,
    {
        apply_at(links, &self.trail, edit)
    }
}

fn folder_in<'a>(seq: &'a [ContentNode], id: &str) -> Result<&'a ContentNode> {
    seq.iter()
        .find(|n| n.id == id && n.is_folder())
        .ok_or_else(|| Error::NotFound(format!("folder {}", id)))
}

fn apply_at<F>(seq: Vec<ContentNode>, trail: &[String], edit: F) -> Result<Vec<ContentNode>>
where
    F: FnOnce(Vec<ContentNode>) -> Vec<ContentNode>,
{
    match trail.split_first() {
        None => Ok(edit(seq)),
        Some((head, rest)) => {
            let children = folder_in(&seq, head)?.children().to_vec();
            let children = apply_at(children, rest, edit)?;
            Ok(update_by_id(seq, head, &NodePatch::children(children)))
        }
    }
}
