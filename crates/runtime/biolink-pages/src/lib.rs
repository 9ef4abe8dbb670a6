//! # biolink pages
//!
//! Stateful side of biolink: the page directory and visitor testimonials,
//! both backed by an injected [`Storage`].
//!
//! Every mutation reloads the whole collection, changes it and writes it
//! back before returning. There is no save step; edits commit as they
//! happen.

pub mod directory;
pub mod testimonials;
pub mod visit;

pub use biolink_store::Storage;
pub use directory::PageDirectory;
pub use testimonials::{Capture, TestimonialBook};
pub use visit::{follow_link, FollowOutcome, Submission};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] biolink_store::Error),
}

impl From<biolink_core::Error> for Error {
    fn from(e: biolink_core::Error) -> Self {
        match e {
            biolink_core::Error::Validation(msg) => Error::Validation(msg),
            biolink_core::Error::NotFound(what) => Error::NotFound(what),
        }
    }
}
