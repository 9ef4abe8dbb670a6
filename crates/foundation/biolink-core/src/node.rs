//! Content node definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Kind of content node. Closed set: behaviour and meaningful fields depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Outbound link button
    Link,
    /// Section heading
    Header,
    /// Collapsible container of further nodes
    Folder,
    /// Title plus free-text description
    TextBlock,
}

impl NodeKind {
    /// Whether `expiresAt` means anything for this kind
    pub fn supports_expiry(&self) -> bool {
        matches!(self, NodeKind::Link | NodeKind::Folder)
    }
}

/// One entry in a page's content tree.
///
/// `children` is `Some` exactly when `kind` is [`NodeKind::Folder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    pub id: String,

    pub title: String,

    /// Target URL, only meaningful for links
    #[serde(default)]
    pub url: String,

    /// Body text, only meaningful for text blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ContentNode>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl ContentNode {
    /// Create a node. Folders start with an empty child list; nothing else is validated.
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: String::new(),
            description: None,
            is_active: true,
            kind,
            children: (kind == NodeKind::Folder).then(Vec::new),
            expires_at: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Replace the children of a folder. No-op for any other kind.
    pub fn with_children(mut self, children: Vec<ContentNode>) -> Self {
        if self.is_folder() {
            self.children = Some(children);
        }
        self
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// Children of a folder, empty for everything else
    pub fn children(&self) -> &[ContentNode] {
        if !self.is_folder() {
            return &[];
        }
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Active and not expired. Says nothing about the node's ancestors.
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now)
    }

    /// Merge a partial update into this node. Id and kind never change.
    pub fn apply(&mut self, patch: &NodePatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(url) = &patch.url {
            self.url = url.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(active) = patch.is_active {
            self.is_active = active;
        }
        if let Some(expires_at) = patch.expires_at {
            self.expires_at = expires_at;
        }
        if let Some(children) = &patch.children {
            if self.is_folder() {
                self.children = Some(children.clone());
            }
        }
    }
}

/// Partial field update for [`crate::tree::update_by_id`].
///
/// `expires_at` is tri-state: `None` leaves it alone, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_expiry_patch",
        serialize_with = "serialize_expiry_patch"
    )]
    pub expires_at: Option<Option<DateTime<Utc>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ContentNode>>,
}

impl NodePatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Default::default()
        }
    }

    pub fn children(children: Vec<ContentNode>) -> Self {
        Self {
            children: Some(children),
            ..Default::default()
        }
    }

    /// Normalize a patched link URL the same way creation does
    pub fn normalized(mut self) -> Self {
        if let Some(url) = self.url.take() {
            self.url = Some(normalize_url(&url));
        }
        self
    }
}

// A present `null` clears the expiry, a missing field leaves it untouched.
fn deserialize_expiry_patch<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let millis: Option<i64> = Option::deserialize(deserializer)?;
    match millis {
        None => Ok(Some(None)),
        Some(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
            .map(|at| Some(Some(at)))
            .ok_or_else(|| serde::de::Error::custom("expiresAt out of range")),
    }
}

fn serialize_expiry_patch<S>(
    value: &Option<Option<DateTime<Utc>>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(Some(at)) => serializer.serialize_i64(at.timestamp_millis()),
        _ => serializer.serialize_none(),
    }
}

/// Node creation input from the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,

    pub title: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub description: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewNode {
    pub fn new(kind: NodeKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            url: String::new(),
            description: String::new(),
            expires_at: None,
        }
    }

    pub fn link(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::new(NodeKind::Link, title)
        }
    }

    /// Validate and turn into a node with the given id.
    ///
    /// Only fields meaningful for the kind are kept.
    pub fn build(self, id: impl Into<String>) -> Result<ContentNode> {
        if self.title.is_empty() {
            return Err(Error::Validation("title is required".to_string()));
        }

        let mut node = ContentNode::new(id, self.title, self.kind);
        match self.kind {
            NodeKind::Link => node.url = normalize_url(&self.url),
            NodeKind::TextBlock => node.description = Some(self.description),
            NodeKind::Header | NodeKind::Folder => {}
        }
        if self.kind.supports_expiry() {
            node.expires_at = self.expires_at;
        }
        Ok(node)
    }
}

/// Prefix bare domains with `https://`. Anything already starting with
/// `http` is kept verbatim, and an empty value stays empty.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() || url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}
