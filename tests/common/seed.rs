//! Legacy-corpus fixture builders.

use std::path::Path;

use quorum::legacy::{self, LegacyComment, LegacyPost};
use rusqlite::Connection;

/// A text post with the given voter lists.
pub fn text_post(
    id: i64,
    topic: &str,
    username: &str,
    title: &str,
    upvotes: &str,
    downvotes: &str,
) -> LegacyPost {
    LegacyPost {
        id,
        topic: topic.into(),
        username: username.into(),
        title: title.into(),
        url: None,
        text_content: Some(format!("content of {title}")),
        upvotes: upvotes.into(),
        downvotes: downvotes.into(),
    }
}

/// A link post with no votes.
pub fn url_post(id: i64, topic: &str, username: &str, title: &str, url: &str) -> LegacyPost {
    LegacyPost {
        id,
        topic: topic.into(),
        username: username.into(),
        title: title.into(),
        url: Some(url.into()),
        text_content: None,
        upvotes: String::new(),
        downvotes: String::new(),
    }
}

pub fn comment(id: i64, username: &str, post_id: i64, text: &str) -> LegacyComment {
    LegacyComment {
        id,
        username: username.into(),
        post_id,
        text_content: text.into(),
    }
}

/// Create the legacy tables in the database file and load the fixtures.
pub fn seed_legacy(db: &Path, posts: &[LegacyPost], comments: &[LegacyComment]) {
    let conn = Connection::open(db).expect("open seed db");
    legacy::create_tables(&conn).expect("create legacy tables");
    for post in posts {
        legacy::insert_post(&conn, post).expect("insert legacy post");
    }
    for comment in comments {
        legacy::insert_comment(&conn, comment).expect("insert legacy comment");
    }
}
