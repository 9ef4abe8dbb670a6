//! # biolink gemini
//!
//! Short marketing copy from the Gemini `generateContent` API: profile bios
//! and link button titles.
//!
//! Nothing here is allowed to break a page edit. A missing API key answers
//! with a fixed message without touching the network, and failed calls come
//! back as a generic error (bios) or an empty suggestion (titles).
//!
//! [`ViewGuard`] ties a pending suggestion to the view that asked for it, so
//! a result arriving after the view is gone is dropped instead of applied.

pub mod client;
pub mod view;

pub use client::{CopyClient, CopyKind, CopySuggester, SuggestionRequest, UNAVAILABLE_MESSAGE};
pub use view::{ViewGuard, ViewHandle};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no API key configured")]
    Unavailable,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("response contained no candidates")]
    EmptyResponse,

    /// What callers show when a bio could not be drafted
    #[error("Failed to generate bio")]
    BioFailed,
}
