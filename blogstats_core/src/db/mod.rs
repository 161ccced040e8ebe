//! Types, traits and methods for interacting with a database.
//!
//! The different backends are selected through a [`ConnectionSpec`]. Only
//! SQLite is provided: a file on disk or a private in-memory database.

use std::path::Path;

use crate::{Comment, CommentId, Error, PostId, Result};

mod sqlite;
pub use sqlite::{Connection, BACKEND_NAME as SQLITE_BACKEND};

/// Environment variable the CLI reads the SQLite file path from.
pub const DB_ENV_VAR: &str = "BLOGSTATS_DB";

/// Connection string selecting a private in-memory SQLite database.
pub const MEMORY_CONN_STR: &str = ":memory:";

/// Database connection spec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionSpec {
    /// Backend name.
    pub backend_name: String,
    /// Backend specific connection string.
    pub conn_str: String,
}
impl ConnectionSpec {
    /// Create a spec from a backend name and a backend specific connection string.
    pub fn new(backend_name: impl Into<String>, conn_str: impl Into<String>) -> Self {
        ConnectionSpec {
            backend_name: backend_name.into(),
            conn_str: conn_str.into(),
        }
    }

    /// A SQLite database stored in the file at `path`.
    pub fn sqlite(path: impl AsRef<Path>) -> Self {
        Self::new(SQLITE_BACKEND, path.as_ref().to_string_lossy())
    }

    /// A private in-memory SQLite database.
    pub fn memory() -> Self {
        Self::new(SQLITE_BACKEND, MEMORY_CONN_STR)
    }

    /// Whether the spec selects an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.conn_str == MEMORY_CONN_STR
    }
}

/// Connect to a database. For non-boxed connections, see individual
/// backend implementations.
pub fn connect(spec: &ConnectionSpec) -> Result<Connection> {
    match spec.backend_name.as_str() {
        SQLITE_BACKEND => Connection::open(spec),
        _ => Err(Error::UnknownBackend(spec.backend_name.clone())),
    }
}

/// Row-level operations the models need to save and load themselves.
pub trait ConnectionMethods {
    /// Insert a post row, returning its new id.
    fn insert_post(&self, title: &str) -> Result<PostId>;
    /// Insert a comment row under `post`, returning its new id.
    fn insert_comment(&self, post: PostId, comment: &Comment) -> Result<CommentId>;
    /// Load the comments of `post`, oldest row first.
    fn load_comments(&self, post: PostId) -> Result<Vec<Comment>>;
}
