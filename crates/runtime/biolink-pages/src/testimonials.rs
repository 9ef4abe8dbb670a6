//! Testimonial capture

use std::sync::Mutex;

use biolink_core::{new_id, testimonial, Testimonial};
use biolink_store::{load_collection, save_collection, Storage, TESTIMONIALS_KEY};
use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;

use crate::Result;

/// What happened to a testimonial submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "testimonial", rename_all = "lowercase")]
pub enum Capture {
    Recorded(Testimonial),
    /// Name or message was blank, or the note could not be stored
    Skipped,
}

impl Capture {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Capture::Recorded(_))
    }
}

pub struct TestimonialBook<S> {
    storage: S,
    lock: Mutex<()>,
}

impl<S: Storage> TestimonialBook<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            lock: Mutex::new(()),
        }
    }

    /// Record a note left on `page_id` before opening `target_link_title`.
    ///
    /// Blank names or messages are skipped, not rejected. The page is not
    /// checked for existence.
    pub fn capture(
        &self,
        page_id: &str,
        visitor_name: &str,
        content: &str,
        target_link_title: &str,
        now: DateTime<Utc>,
    ) -> Result<Capture> {
        let visitor_name = visitor_name.trim();
        let content = content.trim();
        if visitor_name.is_empty() || content.is_empty() {
            return Ok(Capture::Skipped);
        }

        let testimonial = Testimonial {
            id: new_id(),
            page_id: page_id.to_string(),
            visitor_name: visitor_name.to_string(),
            content: content.to_string(),
            target_link_title: target_link_title.to_string(),
            // stored as epoch millis
            timestamp: now.trunc_subsecs(3),
        };

        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut all = self.all();
        all.push(testimonial.clone());
        save_collection(&self.storage, TESTIMONIALS_KEY, &all)?;

        tracing::info!(
            "testimonial from {} on page {} ({})",
            testimonial.visitor_name,
            page_id,
            target_link_title
        );
        Ok(Capture::Recorded(testimonial))
    }

    /// Notes for one page, newest first
    pub fn for_page(&self, page_id: &str) -> Vec<Testimonial> {
        testimonial::for_page(self.all(), page_id)
    }

    /// Every stored note in insertion order, including orphans of deleted pages
    pub fn all(&self) -> Vec<Testimonial> {
        load_collection(&self.storage, TESTIMONIALS_KEY)
    }
}
