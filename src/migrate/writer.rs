//! Normalized-row writing.
//!
//! Three passes over the legacy corpus, each fully resolving foreign keys
//! before inserting. SQLite assigns fresh rowids on insert, so the posts
//! pass returns a legacy-id to new-id map that the comments and votes passes
//! join through.

use std::borrow::Cow;
use std::collections::HashMap;

use rusqlite::{Connection, params};
use tracing::{info, warn};

use crate::error::{MigrateError, Result};
use crate::legacy::{LegacyComment, LegacyPost};
use crate::model::{POST_TITLE_MAX, PostBody};

use super::resolve::Resolver;
use super::split;
use super::{RejectedComment, RejectedVote};

/// Maps each legacy post id to its normalized post id; produced by the
/// posts pass.
#[derive(Debug, Default)]
pub struct PostIdMap {
    map: HashMap<i64, i64>,
}

impl PostIdMap {
    #[must_use]
    pub fn get(&self, legacy_id: i64) -> Option<i64> {
        self.map.get(&legacy_id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Presence test for legacy content fields: empty or whitespace-only
/// strings count as absent (common in legacy exports), but present values
/// are carried over untrimmed.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Classify a legacy post's body. Exactly one of url/content must be
/// present; the legacy source documents no resolution policy for rows
/// violating that, so both-set and neither-set are data-quality errors that
/// reject the record (and with it the run).
fn post_body(post: &LegacyPost) -> Result<PostBody> {
    match (
        present(post.url.as_deref()),
        present(post.text_content.as_deref()),
    ) {
        (Some(url), None) => Ok(PostBody::Url(url.to_string())),
        (None, Some(text)) => Ok(PostBody::Text(text.to_string())),
        (Some(_), Some(_)) => Err(MigrateError::AmbiguousContent(post.id)),
        (None, None) => Err(MigrateError::MissingContent(post.id)),
    }
}

/// Titles are free text, not identifiers: overlong legacy titles are
/// truncated at the limit (char-boundary safe) instead of rejected.
fn truncated_title(title: &str) -> Cow<'_, str> {
    if title.chars().count() <= POST_TITLE_MAX {
        Cow::Borrowed(title)
    } else {
        Cow::Owned(title.chars().take(POST_TITLE_MAX).collect())
    }
}

/// Posts pass.
///
/// # Errors
///
/// Fatal on unresolved author/topic, on content-exclusivity violations, and
/// on any database error.
pub fn write_posts(
    conn: &Connection,
    posts: &[LegacyPost],
    resolver: &Resolver,
) -> Result<PostIdMap> {
    let mut ids = PostIdMap::default();
    for post in posts {
        let body = post_body(post)?;
        let user_id = resolver.user_id(&post.username)?;
        let topic_id = resolver.topic_id(&post.topic)?;
        conn.execute(
            "INSERT INTO posts (post_title, post_url, post_content, user_id, topic_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                truncated_title(&post.title).as_ref(),
                body.url(),
                body.text(),
                user_id,
                topic_id,
            ],
        )?;
        ids.map.insert(post.id, conn.last_insert_rowid());
    }
    info!(posts = ids.len(), "posts pass complete");
    Ok(ids)
}

/// Comments pass. Text is carried over verbatim; the post reference joins
/// through the posts-pass id map. Legacy comments are flat, so every
/// migrated comment is a thread root. A comment the schema rejects on its
/// own insert (blank text) is skipped and reported; nothing else references
/// a comment, so the skip cannot dangle.
///
/// # Errors
///
/// Fatal on unresolved author or unknown legacy post reference, and on any
/// non-constraint database error.
pub fn write_comments(
    conn: &Connection,
    comments: &[LegacyComment],
    resolver: &Resolver,
    post_ids: &PostIdMap,
) -> Result<(usize, Vec<RejectedComment>)> {
    let mut written = 0;
    let mut rejected = Vec::new();
    for comment in comments {
        let user_id = resolver.user_id(&comment.username)?;
        let post_id = post_ids
            .get(comment.post_id)
            .ok_or(MigrateError::UnresolvedPost {
                comment_id: comment.id,
                post_id: comment.post_id,
            })?;
        let insert = conn.execute(
            "INSERT INTO comments (comment_text, user_id, post_id) VALUES (?1, ?2, ?3)",
            params![comment.text_content, user_id, post_id],
        );
        match insert {
            Ok(_) => written += 1,
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                warn!(legacy_comment_id = comment.id, "rejected invalid comment");
                rejected.push(RejectedComment {
                    legacy_comment_id: comment.id,
                });
            }
            Err(err) => return Err(err.into()),
        }
    }
    info!(
        comments = written,
        rejected = rejected.len(),
        "comments pass complete"
    );
    Ok((written, rejected))
}

/// Votes pass. Duplicate (user, post) pairs (contradictory up+down entries,
/// or a name repeated in one list) are a known legacy data-quality issue:
/// the UNIQUE constraint rejects the second insert and the record is
/// collected for the report while the run continues. Every other failure is
/// fatal.
///
/// # Errors
///
/// Fatal on unresolved voter names and on non-constraint database errors.
pub fn write_votes(
    conn: &Connection,
    posts: &[LegacyPost],
    resolver: &Resolver,
    post_ids: &PostIdMap,
) -> Result<(usize, Vec<RejectedVote>)> {
    let mut recorded = 0;
    let mut rejected = Vec::new();
    for post in posts {
        let post_id = post_ids
            .get(post.id)
            .ok_or(MigrateError::UnmappedPost(post.id))?;
        for (voter, direction) in split::vote_pairs(&post.upvotes, &post.downvotes) {
            let user_id = resolver.user_id(voter)?;
            let insert = conn.execute(
                "INSERT INTO votes (vote, user_id, post_id) VALUES (?1, ?2, ?3)",
                params![direction.value(), user_id, post_id],
            );
            match insert {
                Ok(_) => recorded += 1,
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    warn!(
                        voter,
                        legacy_post_id = post.id,
                        ?direction,
                        "rejected duplicate vote"
                    );
                    rejected.push(RejectedVote {
                        username: voter.to_string(),
                        legacy_post_id: post.id,
                        direction,
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
    info!(
        votes = recorded,
        rejected = rejected.len(),
        "votes pass complete"
    );
    Ok((recorded, rejected))
}
