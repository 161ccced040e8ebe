//! The fixed posts and comments every run starts from.

use chrono::{NaiveDate, NaiveDateTime};

use crate::db::Connection;
use crate::{Comment, Error, Post, Result};

fn day(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid seed date")
}

/// Builds the seed posts with their comments queued, unsaved.
pub fn posts() -> Vec<Post> {
    vec![
        Post::with_comments(
            "Post1",
            [
                Comment::new("1", day(2020, 3, 2), "Petr"),
                Comment::new("2", day(2020, 3, 4), "Elena"),
                Comment::new("8", day(2020, 3, 5), "Ivan"),
            ],
        ),
        Post::with_comments(
            "Post2",
            [
                Comment::new("3", day(2020, 3, 5), "Elena"),
                Comment::new("4", day(2020, 3, 6), "Ivan"),
            ],
        ),
        Post::with_comments(
            "Post3",
            [
                Comment::new("5", day(2020, 2, 7), "Ivan"),
                Comment::new("6", day(2020, 2, 9), "Elena"),
                Comment::new("7", day(2020, 2, 10), "Ivan"),
                Comment::new("9", day(2020, 2, 14), "Petr"),
            ],
        ),
    ]
}

/// Writes the seed posts in one transaction. Refuses a database that
/// already holds posts.
pub fn seed(conn: &mut Connection) -> Result<()> {
    let existing = conn.post_count()?;
    if existing > 0 {
        return Err(Error::AlreadySeeded(existing));
    }
    let mut posts = posts();
    conn.save_posts(&mut posts)?;
    log::info!("seeded {} posts", posts.len());
    Ok(())
}
