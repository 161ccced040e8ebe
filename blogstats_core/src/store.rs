use crate::comments::Comments;
use crate::{Comment, CommentId, Post, PostId, Result};

/// Read access to the posts and comments the analytics run over.
pub trait Store {
    /// Every post, in the order they were saved, with comments loaded.
    fn all_posts(&self) -> Result<Vec<Post>>;
    /// Every comment, each carrying the id of its post.
    fn all_comments(&self) -> Result<Vec<Comment>>;
}

/// A [`Store`] kept in plain vectors.
///
/// Ids are assigned on construction in the order posts and comments are
/// given, the same way a fresh database would number them.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    posts: Vec<(PostId, String)>,
    comments: Vec<Comment>,
}
impl MemoryStore {
    /// Takes ownership of `posts` and all of their comments.
    pub fn new(posts: impl IntoIterator<Item = Post>) -> Self {
        let mut store = MemoryStore::default();
        for post in posts {
            let post_id = PostId(store.posts.len() as i64 + 1);
            for mut comment in post.comments.into_values() {
                comment.id = Some(CommentId(store.comments.len() as i64 + 1));
                comment.post = Some(post_id);
                store.comments.push(comment);
            }
            store.posts.push((post_id, post.title));
        }
        store
    }
}

impl Store for MemoryStore {
    fn all_posts(&self) -> Result<Vec<Post>> {
        Ok(self
            .posts
            .iter()
            .map(|(id, title)| {
                let comments = self
                    .comments
                    .iter()
                    .filter(|c| c.post == Some(*id))
                    .cloned()
                    .collect();
                Post {
                    id: Some(*id),
                    title: title.clone(),
                    comments: Comments::loaded(*id, comments),
                }
            })
            .collect())
    }

    fn all_comments(&self) -> Result<Vec<Comment>> {
        Ok(self.comments.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn assigns_ids_in_order() {
        let at = NaiveDate::from_ymd_opt(2020, 2, 7)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let store = MemoryStore::new([
            Post::with_comments("A", [Comment::new("1", at, "Ivan")]),
            Post::new("B"),
            Post::with_comments("C", [Comment::new("2", at, "Petr")]),
        ]);

        let posts = store.all_posts().unwrap();
        let ids: Vec<_> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, [Some(PostId(1)), Some(PostId(2)), Some(PostId(3))]);
        assert!(posts[1].comments.get().unwrap().is_empty());

        let comments = store.all_comments().unwrap();
        assert_eq!(comments[1].id, Some(CommentId(2)));
        assert_eq!(comments[1].post, Some(PostId(3)));
    }
}
