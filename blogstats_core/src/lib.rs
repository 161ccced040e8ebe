//! Posts, their comments, and the analytics run over them.
//!
//! A [`Store`] hands out every [`Post`] (with its [`Comments`]) and every
//! [`Comment`]. The functions in [`analytics`] group, order and pick the
//! latest comment per post from that snapshot. [`db`] provides the SQLite
//! store, [`MemoryStore`] a plain in-memory one.
#![deny(missing_docs)]

use thiserror::Error as ThisError;

pub mod analytics;
pub mod comments;
pub mod db;
pub mod models;
pub mod report;
pub mod seed;
mod store;

pub use comments::Comments;
pub use models::{Comment, CommentId, Post, PostId};
pub use store::{MemoryStore, Store};

/// Commonly used items.
pub mod prelude {
    pub use crate::analytics::{
        comment_counts_by_user, last_comment, last_comment_counts_by_user,
        posts_by_last_comment_date, post_titles, PostLastComment, UserCounts,
    };
    pub use crate::Store;
}

/// Result type that uses [`crate::Error`].
pub type Result<T> = std::result::Result<T, crate::Error>;

/// Library error type.
#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum Error {
    /// A post had no comments to pick a last comment from.
    #[error("post {post:?} has no comments")]
    NoComments {
        /// Title of the offending post.
        post: String,
    },
    /// The comments of a post were read before being loaded.
    #[error("Value has not been loaded")]
    ValueNotLoaded,
    /// A comment collection was saved or loaded before it had an owner.
    #[error("Comments collection has no owning post")]
    NotInitialized,
    /// The database already holds posts.
    #[error("Database already contains {0} posts, refusing to seed")]
    AlreadySeeded(i64),
    /// A timestamp outside the years SQLite's date functions handle (0 to 9999).
    #[error("Timestamp {0} is outside the supported years 0-9999")]
    DateOutOfRange(chrono::NaiveDateTime),
    /// The connection spec named a backend this crate does not provide.
    #[error("Unknown backend {0}")]
    UnknownBackend(String),
    /// A stored timestamp could not be parsed.
    #[error("Chrono error {0}")]
    ChronoParse(#[from] chrono::ParseError),
    /// Serialization failed.
    #[error("JSON error {0}")]
    Json(#[from] serde_json::Error),
    /// SQLite reported an error.
    #[error("SQLite error {0}")]
    SQLite(#[from] rusqlite::Error),
    /// I/O failed.
    #[error("IO error {0}")]
    IO(#[from] std::io::Error),
}
