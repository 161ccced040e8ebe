//! The collection of comments owned by a post.
#![deny(missing_docs)]

use once_cell::unsync::OnceCell;

use crate::db::ConnectionMethods;
use crate::{Comment, Error, PostId, Result};

/// Comments belonging to one [`Post`].
///
/// Comments added with [`add`](Comments::add) are queued until
/// [`save`](Comments::save) writes them under the owning post. Persisted
/// comments are read once with [`load`](Comments::load) and cached; the
/// cache is what [`get`](Comments::get) returns.
///
/// [`Post`]: crate::Post
#[derive(Clone, Debug, Default)]
pub struct Comments {
    owner: Option<PostId>,
    new_values: Vec<Comment>,
    all_values: OnceCell<Vec<Comment>>,
}
impl Comments {
    /// Constructs an empty collection. `ensure_init` must be called
    /// before it can be saved (or `save` returns `Error::NotInitialized`).
    pub fn new() -> Self {
        Comments {
            owner: None,
            new_values: Vec::new(),
            all_values: OnceCell::new(),
        }
    }

    /// A collection whose persisted values are already known.
    pub(crate) fn loaded(owner: PostId, values: Vec<Comment>) -> Self {
        Comments {
            owner: Some(owner),
            new_values: Vec::new(),
            all_values: OnceCell::with_value(values),
        }
    }

    /// Consumes the collection, returning loaded values followed by queued ones.
    pub(crate) fn into_values(self) -> Vec<Comment> {
        let mut values = self.all_values.into_inner().unwrap_or_default();
        values.extend(self.new_values);
        values
    }

    /// Attaches the collection to its post. Has no effect once an owner is set.
    pub fn ensure_init(&mut self, owner: PostId) {
        if self.owner.is_some() {
            return;
        }
        self.owner = Some(owner);
        self.all_values = OnceCell::new();
    }

    /// The owning post, if the collection has been attached to one.
    pub fn owner(&self) -> Option<PostId> {
        self.owner
    }

    /// Queues a comment to be written by the next `save`.
    pub fn add(&mut self, comment: Comment) {
        // all_values is now out of date, so clear it
        self.all_values = OnceCell::new();
        self.new_values.push(comment);
    }

    /// Number of queued, unsaved comments.
    pub fn pending(&self) -> usize {
        self.new_values.len()
    }

    /// Returns the loaded comments. If they have not been loaded, returns
    /// `Error::ValueNotLoaded`.
    pub fn get(&self) -> Result<&[Comment]> {
        self.all_values
            .get()
            .map(Vec::as_slice)
            .ok_or(Error::ValueNotLoaded)
    }

    /// Writes queued comments under the owning post, in the order they were added.
    pub fn save(&mut self, conn: &impl ConnectionMethods) -> Result<()> {
        let owner = self.owner.ok_or(Error::NotInitialized)?;
        for comment in self.new_values.drain(..) {
            let id = conn.insert_comment(owner, &comment)?;
            log::debug!("saved comment {id:?} on post {owner:?}");
        }
        Ok(())
    }

    /// Loads the persisted comments from the database if necessary and
    /// returns them.
    pub fn load(&self, conn: &impl ConnectionMethods) -> Result<&[Comment]> {
        if let Some(values) = self.all_values.get() {
            return Ok(values.as_slice());
        }
        // If not initialised then there are no persisted values
        let Some(owner) = self.owner else {
            return Ok(&[]);
        };
        self.all_values
            .get_or_try_init(|| conn.load_comments(owner))
            .map(Vec::as_slice)
    }
}

impl From<Vec<Comment>> for Comments {
    /// An ownerless collection holding `values` as already loaded.
    fn from(values: Vec<Comment>) -> Self {
        Comments {
            owner: None,
            new_values: Vec::new(),
            all_values: OnceCell::with_value(values),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::*;

    fn comment(text: &str) -> Comment {
        let at = NaiveDate::from_ymd_opt(2020, 3, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Comment::new(text, at, "Petr")
    }

    #[test]
    fn get_before_load_is_an_error() {
        let comments = Comments::new();
        assert_matches!(comments.get(), Err(Error::ValueNotLoaded));
    }

    #[test]
    fn add_invalidates_loaded_values() {
        let mut comments = Comments::from(vec![comment("1")]);
        assert_eq!(comments.get().unwrap().len(), 1);
        comments.add(comment("2"));
        assert_eq!(comments.pending(), 1);
        assert_matches!(comments.get(), Err(Error::ValueNotLoaded));
    }

    #[test]
    fn load_returns_values_given_up_front() {
        let comments = Comments::from(vec![comment("1"), comment("2")]);
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let texts: Vec<&str> = comments
            .load(&conn)
            .unwrap()
            .iter()
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(texts, ["1", "2"]);
    }

    #[test]
    fn load_without_owner_is_empty() {
        let comments = Comments::new();
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        assert!(comments.load(&conn).unwrap().is_empty());
    }

    #[test]
    fn ensure_init_keeps_first_owner() {
        let mut comments = Comments::new();
        comments.ensure_init(PostId(3));
        comments.ensure_init(PostId(4));
        assert_eq!(comments.owner(), Some(PostId(3)));
    }
}
