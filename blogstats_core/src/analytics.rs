//! Grouping and last-comment queries over a [`Store`].
//!
//! Every function reads a fresh snapshot from the store, so running one
//! twice against unchanged data yields the same result.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Comment, Error, Post, Result, Store};

/// Count per user name, ordered by name.
pub type UserCounts = BTreeMap<String, usize>;

/// A post together with its last comment.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostLastComment {
    /// Title of the post.
    pub post_title: String,
    /// Calendar date of the post's last comment.
    pub last_comment_date: NaiveDate,
    /// Text of the post's last comment.
    pub last_comment_text: String,
}

/// The comment with the latest `created_date` in `post`. When several
/// share that timestamp, the first of them in the post wins.
///
/// Returns `Error::NoComments` for a post without comments, and
/// `Error::ValueNotLoaded` if its comments were never loaded.
pub fn last_comment(post: &Post) -> Result<&Comment> {
    post.comments
        .get()?
        .iter()
        .reduce(|latest, c| {
            if c.created_date > latest.created_date {
                c
            } else {
                latest
            }
        })
        .ok_or_else(|| Error::NoComments {
            post: post.title.clone(),
        })
}

/// Titles of all posts, in store order.
pub fn post_titles(store: &impl Store) -> Result<Vec<String>> {
    Ok(store.all_posts()?.into_iter().map(|p| p.title).collect())
}

/// How many comments each user left.
pub fn comment_counts_by_user(store: &impl Store) -> Result<UserCounts> {
    Ok(count_by(
        store
            .all_comments()?
            .into_iter()
            .map(|comment| comment.user_name),
    ))
}

/// Posts ordered by the date of their last comment, most recent first.
/// Posts whose last comments fall on the same day keep store order.
pub fn posts_by_last_comment_date(store: &impl Store) -> Result<Vec<PostLastComment>> {
    let mut rows = store
        .all_posts()?
        .iter()
        .map(|post| -> Result<PostLastComment> {
            let last = last_comment(post)?;
            Ok(PostLastComment {
                post_title: post.title.clone(),
                last_comment_date: last.created_day(),
                last_comment_text: last.text.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    rows.sort_by(|a, b| b.last_comment_date.cmp(&a.last_comment_date));
    Ok(rows)
}

/// How many posts each user wrote the last comment on. Users who never
/// wrote a last comment do not appear.
pub fn last_comment_counts_by_user(store: &impl Store) -> Result<UserCounts> {
    let winners = store
        .all_posts()?
        .iter()
        .map(|post| last_comment(post).map(|c| c.user_name.clone()))
        .collect::<Result<Vec<_>>>()?;
    Ok(count_by(winners))
}

fn count_by(keys: impl IntoIterator<Item = String>) -> UserCounts {
    let mut counts = UserCounts::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    counts
}
