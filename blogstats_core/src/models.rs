//! Post and comment records.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::db::ConnectionMethods;
use crate::{Comments, Result};

/// Post identifier.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PostId(pub i64);

/// Comment identifier.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommentId(pub i64);

/// A blog post and the comments it owns.
#[derive(Debug)]
pub struct Post {
    /// Id of the post. `None` until saved.
    pub id: Option<PostId>,
    /// Title of the post.
    pub title: String,
    /// Comments left on the post.
    pub comments: Comments,
}
impl Post {
    /// Create a new, unsaved Post without comments.
    pub fn new(title: impl Into<String>) -> Self {
        Post {
            id: None,
            title: title.into(),
            comments: Comments::new(),
        }
    }

    /// Create a new Post and queue `comments` on it.
    pub fn with_comments(
        title: impl Into<String>,
        comments: impl IntoIterator<Item = Comment>,
    ) -> Self {
        let mut post = Post::new(title);
        for comment in comments {
            post.comments.add(comment);
        }
        post
    }

    /// Saves the post and any queued comments. An unsaved post gets a new
    /// row; a saved one only writes its queued comments.
    pub fn save(&mut self, conn: &impl ConnectionMethods) -> Result<()> {
        let id = match self.id {
            Some(id) => id,
            None => {
                let id = conn.insert_post(&self.title)?;
                log::debug!("saved post {:?} as {id:?}", self.title);
                self.id = Some(id);
                id
            }
        };
        self.comments.ensure_init(id);
        self.comments.save(conn)
    }
}

/// A timestamped, authored text attached to exactly one [Post].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Comment {
    /// Id of the comment. `None` until saved.
    pub id: Option<CommentId>,
    /// The [Post] this comment belongs to. Set when the post is saved.
    pub post: Option<PostId>,
    /// Comment body.
    pub text: String,
    /// When the comment was written.
    pub created_date: NaiveDateTime,
    /// Name of the author.
    pub user_name: String,
}
impl Comment {
    /// Create a new, unsaved Comment.
    pub fn new(
        text: impl Into<String>,
        created_date: NaiveDateTime,
        user_name: impl Into<String>,
    ) -> Self {
        Comment {
            id: None,
            post: None,
            text: text.into(),
            created_date,
            user_name: user_name.into(),
        }
    }

    /// Calendar date the comment was written on.
    pub fn created_day(&self) -> NaiveDate {
        self.created_date.date()
    }
}
