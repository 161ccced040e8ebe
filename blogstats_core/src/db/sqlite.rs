//! SQLite database backend
use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rusqlite::{params, OptionalExtension, Row};

use super::{ConnectionMethods, ConnectionSpec};
use crate::analytics::{PostLastComment, UserCounts};
use crate::comments::Comments;
use crate::{Comment, CommentId, Error, Post, PostId, Result, Store};

/// The name of the sqlite backend.
pub const BACKEND_NAME: &str = "sqlite";

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    text TEXT NOT NULL,
    created_date TEXT NOT NULL,
    user_name TEXT NOT NULL
);
"#;

const COMMENT_COLUMNS: &str = "id, post_id, text, created_date, user_name";

/// Latest comment of every post. Ties on `created_date` go to the
/// comment inserted first.
const LAST_COMMENTS: &str = r#"
WITH ranked AS (
    SELECT
        c.post_id,
        c.text,
        c.created_date,
        c.user_name,
        ROW_NUMBER() OVER (
            PARTITION BY c.post_id
            ORDER BY c.created_date DESC, c.id ASC
        ) AS rn
    FROM comments c
)
SELECT p.id, p.title, r.text, date(r.created_date) AS last_date, r.user_name
FROM posts p
JOIN ranked r ON r.post_id = p.id AND r.rn = 1
"#;

/// SQLite connection. Owns the schema and the row mapping of
/// [`Post`] and [`Comment`].
///
/// Comment timestamps are stored as ISO-8601 text, which only sorts and
/// parses with `date()` for years 0 to 9999; comments outside that range
/// are rejected with `Error::DateOutOfRange` when saved.
#[derive(Debug)]
pub struct Connection {
    conn: rusqlite::Connection,
}

impl Connection {
    /// Opens the database named by `spec` and creates the tables if they
    /// do not exist yet.
    pub fn open(spec: &ConnectionSpec) -> Result<Self> {
        let conn = if spec.is_memory() {
            rusqlite::Connection::open_in_memory()?
        } else {
            rusqlite::Connection::open(&spec.conn_str)?
        };
        log::info!("opened sqlite database {}", spec.conn_str);
        let connection = Connection { conn };
        connection.ensure_created()?;
        Ok(connection)
    }

    /// Creates the `posts` and `comments` tables if missing.
    pub fn ensure_created(&self) -> Result<()> {
        log::debug!("ensuring schema exists");
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Number of stored posts.
    pub fn post_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Saves `posts` and their queued comments in a single transaction.
    /// Nothing is written if any insert fails.
    pub fn save_posts(&mut self, posts: &mut [Post]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for post in posts.iter_mut() {
            post.save(&*tx)?;
        }
        tx.commit()?;
        log::debug!("committed {} posts", posts.len());
        Ok(())
    }

    /// Finds the first post titled `title`. Its comments are not loaded;
    /// call [`Comments::load`] on them.
    pub fn find_post(&self, title: &str) -> Result<Option<Post>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, title FROM posts WHERE title = ?1 ORDER BY id LIMIT 1",
                [title],
                |row| Ok((PostId(row.get(0)?), row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(row.map(|(id, title)| {
            let mut post = Post::new(title);
            post.id = Some(id);
            post.comments.ensure_init(id);
            post
        }))
    }

    /// Counts comments per author with `GROUP BY`.
    pub fn comment_counts_by_user(&self) -> Result<UserCounts> {
        self.user_counts("SELECT user_name, COUNT(*) FROM comments GROUP BY user_name")
    }

    /// Orders posts by the date of their last comment, computed with a
    /// window function. Fails with `Error::NoComments` if any post has no
    /// comments.
    pub fn posts_by_last_comment_date(&self) -> Result<Vec<PostLastComment>> {
        self.ensure_every_post_commented()?;
        let sql = format!("{LAST_COMMENTS} ORDER BY last_date DESC, p.id ASC");
        log::debug!("{sql}");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter()
            .map(|(post_title, last_date, last_comment_text)| -> Result<PostLastComment> {
                Ok(PostLastComment {
                    post_title,
                    last_comment_date: NaiveDate::parse_from_str(&last_date, "%Y-%m-%d")?,
                    last_comment_text,
                })
            })
            .collect()
    }

    /// Counts, per author, the posts whose last comment they wrote.
    /// Fails with `Error::NoComments` if any post has no comments.
    pub fn last_comment_counts_by_user(&self) -> Result<UserCounts> {
        self.ensure_every_post_commented()?;
        self.user_counts(&format!(
            "SELECT user_name, COUNT(*) FROM ({LAST_COMMENTS}) GROUP BY user_name"
        ))
    }

    fn user_counts(&self, sql: &str) -> Result<UserCounts> {
        log::debug!("{sql}");
        let mut stmt = self.conn.prepare(sql)?;
        let counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<rusqlite::Result<UserCounts>>()?;
        Ok(counts)
    }

    fn ensure_every_post_commented(&self) -> Result<()> {
        let empty: Option<String> = self
            .conn
            .query_row(
                "SELECT p.title FROM posts p \
                 WHERE NOT EXISTS (SELECT 1 FROM comments c WHERE c.post_id = p.id) \
                 ORDER BY p.id LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        match empty {
            Some(post) => Err(Error::NoComments { post }),
            None => Ok(()),
        }
    }
}

impl ConnectionMethods for rusqlite::Connection {
    fn insert_post(&self, title: &str) -> Result<PostId> {
        self.execute("INSERT INTO posts (title) VALUES (?1)", [title])?;
        Ok(PostId(self.last_insert_rowid()))
    }

    fn insert_comment(&self, post: PostId, comment: &Comment) -> Result<CommentId> {
        if !(0..=9999).contains(&comment.created_date.year()) {
            return Err(Error::DateOutOfRange(comment.created_date));
        }
        self.execute(
            "INSERT INTO comments (post_id, text, created_date, user_name) VALUES (?1, ?2, ?3, ?4)",
            params![post.0, comment.text, comment.created_date, comment.user_name],
        )?;
        Ok(CommentId(self.last_insert_rowid()))
    }

    fn load_comments(&self, post: PostId) -> Result<Vec<Comment>> {
        let mut stmt = self.prepare(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = ?1 ORDER BY id"
        ))?;
        let comments = stmt
            .query_map([post.0], row_to_comment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(comments)
    }
}

impl ConnectionMethods for Connection {
    fn insert_post(&self, title: &str) -> Result<PostId> {
        self.conn.insert_post(title)
    }

    fn insert_comment(&self, post: PostId, comment: &Comment) -> Result<CommentId> {
        self.conn.insert_comment(post, comment)
    }

    fn load_comments(&self, post: PostId) -> Result<Vec<Comment>> {
        self.conn.load_comments(post)
    }
}

impl Store for Connection {
    fn all_posts(&self) -> Result<Vec<Post>> {
        let mut by_post: HashMap<PostId, Vec<Comment>> = HashMap::new();
        for comment in self.all_comments()? {
            if let Some(post) = comment.post {
                by_post.entry(post).or_default().push(comment);
            }
        }
        let mut stmt = self.conn.prepare("SELECT id, title FROM posts ORDER BY id")?;
        let posts = stmt
            .query_map([], |row| Ok((PostId(row.get(0)?), row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(posts
            .into_iter()
            .map(|(id, title)| Post {
                id: Some(id),
                title,
                comments: Comments::loaded(id, by_post.remove(&id).unwrap_or_default()),
            })
            .collect())
    }

    fn all_comments(&self) -> Result<Vec<Comment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COMMENT_COLUMNS} FROM comments ORDER BY id"))?;
        let comments = stmt
            .query_map([], row_to_comment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(comments)
    }
}

fn row_to_comment(row: &Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: Some(CommentId(row.get(0)?)),
        post: Some(PostId(row.get(1)?)),
        text: row.get(2)?,
        created_date: row.get::<_, NaiveDateTime>(3)?,
        user_name: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::{connect, ConnectionSpec};

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    }

    #[test]
    fn ensure_created_is_repeatable() {
        let conn = connect(&ConnectionSpec::memory()).unwrap();
        conn.ensure_created().unwrap();
        assert_eq!(conn.post_count().unwrap(), 0);
    }

    #[test]
    fn created_date_survives_storage() {
        let mut conn = connect(&ConnectionSpec::memory()).unwrap();
        let mut posts = vec![Post::with_comments(
            "Post1",
            [Comment::new("1", at(2020, 3, 2), "Petr")],
        )];
        conn.save_posts(&mut posts).unwrap();

        let comments = conn.all_comments().unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].created_date, at(2020, 3, 2));
        assert_eq!(comments[0].post, posts[0].id);
    }

    #[test]
    fn find_post_loads_comments_lazily() {
        let mut conn = connect(&ConnectionSpec::memory()).unwrap();
        let mut posts = vec![Post::with_comments(
            "Post1",
            [
                Comment::new("1", at(2020, 3, 2), "Petr"),
                Comment::new("2", at(2020, 3, 4), "Elena"),
            ],
        )];
        conn.save_posts(&mut posts).unwrap();

        let post = conn.find_post("Post1").unwrap().unwrap();
        assert!(post.comments.get().is_err());
        let texts: Vec<&str> = post
            .comments
            .load(&conn)
            .unwrap()
            .iter()
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(texts, ["1", "2"]);
        assert!(conn.find_post("Post9").unwrap().is_none());
    }
}
