//! Visitor testimonials

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note left by a visitor before following a link. Never edited once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: String,

    /// Page the note was left on. May outlive the page.
    pub page_id: String,

    pub visitor_name: String,

    pub content: String,

    /// Title of the link the visitor was about to open
    pub target_link_title: String,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// Keep the testimonials of one page, newest first
pub fn for_page(all: Vec<Testimonial>, page_id: &str) -> Vec<Testimonial> {
    let mut mine: Vec<Testimonial> = all.into_iter().filter(|t| t.page_id == page_id).collect();
    mine.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    mine
}
