//! # biolink core
//!
//! Document model for link-in-bio pages.
//!
//! ```text
//! Page ─┬─ displayName / bio / hero / footer CTA
//!       └─ links: [ContentNode]
//!                  ├─ link        (url, expiresAt?)
//!                  ├─ header
//!                  ├─ text_block  (description)
//!                  └─ folder      (expiresAt?, children: [ContentNode] ...)
//! ```
//!
//! Sequence operations in [`tree`] work on any `[ContentNode]`, so the same
//! code edits a page's top level and a folder nested at any depth. The
//! [`editor`] module tracks which folder is being edited and writes changes
//! back up through its ancestors.

pub mod editor;
pub mod id;
pub mod node;
pub mod page;
pub mod testimonial;
pub mod tree;
pub mod view;

pub use editor::{Crumb, EditorCursor, NodeIndex, NodeLocation};
pub use id::new_id;
pub use node::{normalize_url, ContentNode, NewNode, NodeKind, NodePatch};
pub use page::{normalize_slug, Page, PageDefaults, PageSummary, DEFAULT_CONSULTATION_TEXT};
pub use testimonial::Testimonial;
pub use tree::{Direction, VisibleNode};
pub use view::{EditorView, VisitorView};

/// Result type for biolink-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the document model
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),
}
