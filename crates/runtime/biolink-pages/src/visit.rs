//! Visitor clicks on a link

use biolink_core::{tree, NodeKind};
use biolink_store::Storage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::PageDirectory;
use crate::testimonials::{Capture, TestimonialBook};
use crate::{Error, Result};

/// Optional note typed into the testimonial prompt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Submission {
    pub visitor_name: String,
    pub content: String,
}

impl Submission {
    pub fn new(visitor_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            visitor_name: visitor_name.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowOutcome {
    /// Where the visitor goes next
    pub url: String,
    pub testimonial: Capture,
}

/// Resolve a visible link on the page at `slug` and try to record the
/// visitor's note.
///
/// Only links the visitor can see resolve. Once a link resolves the URL is
/// always returned: a note that cannot be stored is logged and skipped.
pub fn follow_link<P, T>(
    directory: &PageDirectory<P>,
    book: &TestimonialBook<T>,
    slug: &str,
    link_id: &str,
    submission: &Submission,
    now: DateTime<Utc>,
) -> Result<FollowOutcome>
where
    P: Storage,
    T: Storage,
{
    let view = directory.visitor_view(slug, now)?;
    let link = tree::find(&view.items, link_id)
        .filter(|node| node.kind == NodeKind::Link)
        .ok_or_else(|| Error::NotFound(format!("link {}", link_id)))?;

    let testimonial = match book.capture(
        &view.page_id,
        &submission.visitor_name,
        &submission.content,
        &link.title,
        now,
    ) {
        Ok(capture) => capture,
        Err(e) => {
            tracing::warn!("testimonial for {} not stored: {}", link.title, e);
            Capture::Skipped
        }
    };

    Ok(FollowOutcome {
        url: link.url.clone(),
        testimonial,
    })
}
