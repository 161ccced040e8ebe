//! Console report: a header per query followed by its result as JSON.

use std::io::Write;

use serde::Serialize;

use crate::analytics::{self, PostLastComment, UserCounts};
use crate::db::Connection;
use crate::{Result, Store};

/// Header printed before the post titles.
pub const ALL_POSTS: &str = "All posts:";
/// Header printed before the comment counts.
pub const COMMENT_COUNTS: &str = "How many comments each user left:";
/// Header printed before the posts ordered by last comment.
pub const POSTS_BY_LAST_COMMENT: &str =
    "Posts ordered by date of last comment. Result should include text of last comment:";
/// Header printed before the last comment counts.
pub const LAST_COMMENT_COUNTS: &str = "How many last comments each user left:";

/// Results of every query, ready to be printed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    /// Titles of all posts.
    pub post_titles: Vec<String>,
    /// How many comments each user left.
    pub comment_counts: UserCounts,
    /// Posts ordered by the date of their last comment.
    pub posts_by_last_comment: Vec<PostLastComment>,
    /// How many last comments each user left.
    pub last_comment_counts: UserCounts,
}

impl Report {
    /// Runs the in-memory analytics against `store`.
    pub fn build(store: &impl Store) -> Result<Self> {
        Ok(Report {
            post_titles: analytics::post_titles(store)?,
            comment_counts: analytics::comment_counts_by_user(store)?,
            posts_by_last_comment: analytics::posts_by_last_comment_date(store)?,
            last_comment_counts: analytics::last_comment_counts_by_user(store)?,
        })
    }

    /// Runs the same queries as SQL inside the database.
    pub fn build_sql(conn: &Connection) -> Result<Self> {
        Ok(Report {
            post_titles: analytics::post_titles(conn)?,
            comment_counts: conn.comment_counts_by_user()?,
            posts_by_last_comment: conn.posts_by_last_comment_date()?,
            last_comment_counts: conn.last_comment_counts_by_user()?,
        })
    }

    /// Writes every section to `out`.
    pub fn render(&self, out: &mut impl Write, pretty: bool) -> Result<()> {
        section(out, ALL_POSTS, &self.post_titles, pretty)?;
        section(out, COMMENT_COUNTS, &self.comment_counts, pretty)?;
        section(out, POSTS_BY_LAST_COMMENT, &self.posts_by_last_comment, pretty)?;
        section(out, LAST_COMMENT_COUNTS, &self.last_comment_counts, pretty)?;
        Ok(())
    }
}

fn section(
    out: &mut impl Write,
    header: &str,
    value: &impl Serialize,
    pretty: bool,
) -> Result<()> {
    writeln!(out, "{header}")?;
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
