//! Page records

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::node::ContentNode;
use crate::tree;

/// Footer call-to-action shown when a page has no text of its own
pub const DEFAULT_CONSULTATION_TEXT: &str =
    "Free consultation with our team to find the answers you need!";

/// A publishable link-in-bio page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,

    /// Public address, lowercase letters, digits and hyphens
    pub slug: String,

    pub display_name: String,

    #[serde(default)]
    pub bio: String,

    #[serde(default)]
    pub avatar_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consultation_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_url: Option<String>,

    /// Top level of the content tree
    #[serde(default)]
    pub links: Vec<ContentNode>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Page {
    /// New page with an empty tree. `slug` is normalized here and
    /// `created_at` is cut to the millisecond precision it is stored with.
    pub fn new(
        id: impl Into<String>,
        slug: &str,
        display_name: impl Into<String>,
        defaults: &PageDefaults,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            slug: normalize_slug(slug),
            display_name: display_name.into(),
            bio: defaults.bio.clone(),
            avatar_url: String::new(),
            hero_image: defaults.hero_image.clone(),
            hero_text: defaults.hero_text.clone(),
            consultation_text: defaults.consultation_text.clone(),
            whatsapp_number: defaults.whatsapp_number.clone(),
            background_url: None,
            links: Vec::new(),
            created_at: created_at.trunc_subsecs(3),
        }
    }

    /// `https://wa.me/<digits>` for the footer button
    pub fn whatsapp_link(&self) -> Option<String> {
        let digits: String = self
            .whatsapp_number
            .as_deref()?
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        (!digits.is_empty()).then(|| format!("https://wa.me/{}", digits))
    }

    /// Footer text, falling back to the stock call-to-action
    pub fn consultation_text_or_default(&self) -> &str {
        self.consultation_text
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_CONSULTATION_TEXT)
    }

    /// First line of the bio, used as the visitor headline
    pub fn headline(&self) -> &str {
        self.bio.lines().next().unwrap_or("")
    }

    pub fn summary(&self) -> PageSummary {
        PageSummary {
            id: self.id.clone(),
            slug: self.slug.clone(),
            display_name: self.display_name.clone(),
            item_count: self.links.len(),
            total_items: tree::count(&self.links),
            created_at: self.created_at,
        }
    }
}

/// Profile and footer text given to new pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageDefaults {
    pub bio: String,
    pub hero_image: Option<String>,
    pub hero_text: Option<String>,
    pub consultation_text: Option<String>,
    pub whatsapp_number: Option<String>,
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self {
            bio: "Welcome to my page".to_string(),
            hero_image: None,
            hero_text: None,
            consultation_text: Some(DEFAULT_CONSULTATION_TEXT.to_string()),
            whatsapp_number: None,
        }
    }
}

/// Dashboard listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub id: String,
    pub slug: String,
    pub display_name: String,
    /// Top-level items
    pub item_count: usize,
    /// Items at every depth
    pub total_items: usize,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// Lowercase, replace anything outside `[a-z0-9-]` with `-`, then drop
/// leading and trailing hyphens.
pub fn normalize_slug(raw: &str) -> String {
    let replaced: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' { c } else { '-' })
        .collect();
    replaced.trim_matches('-').to_string()
}
