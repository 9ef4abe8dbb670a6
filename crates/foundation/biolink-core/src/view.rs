//! Read paths over a page: what visitors see and what the editor works on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::editor::{Crumb, EditorCursor};
use crate::node::ContentNode;
use crate::page::Page;
use crate::tree::visible_projection;
use crate::Result;

/// Public page as served to visitors: hidden and expired items removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorView {
    pub page_id: String,
    pub slug: String,
    pub display_name: String,
    pub headline: String,
    pub bio: String,
    pub avatar_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_url: Option<String>,
    pub consultation_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_link: Option<String>,
    pub items: Vec<ContentNode>,
}

impl VisitorView {
    pub fn of(page: &Page, now: DateTime<Utc>) -> Self {
        Self {
            page_id: page.id.clone(),
            slug: page.slug.clone(),
            display_name: page.display_name.clone(),
            headline: page.headline().to_string(),
            bio: page.bio.clone(),
            avatar_url: page.avatar_url.clone(),
            hero_image: page.hero_image.clone().filter(|s| !s.is_empty()),
            hero_text: page.hero_text.clone().filter(|s| !s.is_empty()),
            background_url: page.background_url.clone(),
            consultation_text: page.consultation_text_or_default().to_string(),
            whatsapp_link: page.whatsapp_link(),
            items: visible_projection(&page.links, now),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Full page plus the folder the editor is inside
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    pub page: Page,
    pub breadcrumb: Vec<Crumb>,
    /// Unfiltered contents of the folder in scope
    pub items: Vec<ContentNode>,
}

impl EditorView {
    pub fn of(page: Page, cursor: &EditorCursor) -> Result<Self> {
        let breadcrumb = cursor.crumbs(&page.links)?;
        let items = cursor.scope(&page.links)?.to_vec();
        Ok(Self {
            page,
            breadcrumb,
            items,
        })
    }
}
