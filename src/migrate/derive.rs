//! Entity derivation.
//!
//! First pipeline stage: scan the legacy corpus for every username (post
//! authors, comment authors, all voters) and every topic name, dedup by
//! exact string equality, validate, and insert one row per distinct name.
//! Names are identifiers: a name that fails validation fails the whole run
//! rather than being truncated, because truncation could collide two
//! distinct names and break the uniqueness invariant.

use std::collections::{BTreeSet, HashMap};

use rusqlite::Connection;
use tracing::info;

use crate::error::{MigrateError, Result};
use crate::legacy::{LegacyComment, LegacyPost};
use crate::model::{TOPIC_NAME_MAX, USERNAME_MAX};

use super::split;

/// The completed output of the derivation stage: every legacy name mapped to
/// its freshly assigned surrogate id. Consumed by
/// [`Resolver::new`](super::resolve::Resolver::new), which is the only way to
/// build a resolver, so resolution cannot start before derivation finishes.
#[derive(Debug)]
pub struct Derivation {
    pub(super) users: HashMap<String, i64>,
    pub(super) topics: HashMap<String, i64>,
}

impl Derivation {
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }
}

fn validate_username(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.chars().count() > USERNAME_MAX {
        return Err(MigrateError::InvalidUsername(name.to_string()));
    }
    Ok(())
}

fn validate_topic_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.chars().count() > TOPIC_NAME_MAX {
        return Err(MigrateError::InvalidTopicName(name.to_string()));
    }
    Ok(())
}

/// Scan the legacy corpus and persist the distinct users and topics it
/// references.
///
/// # Errors
///
/// Returns [`MigrateError::InvalidUsername`] / [`MigrateError::InvalidTopicName`]
/// if any derived name violates its length or emptiness constraint, or a
/// database error on insert failure.
pub fn derive_entities(
    conn: &Connection,
    posts: &[LegacyPost],
    comments: &[LegacyComment],
) -> Result<Derivation> {
    // BTreeSet dedups and gives deterministic insertion order.
    let mut usernames: BTreeSet<&str> = BTreeSet::new();
    let mut topic_names: BTreeSet<&str> = BTreeSet::new();

    for post in posts {
        usernames.insert(&post.username);
        topic_names.insert(&post.topic);
        for (voter, _) in split::vote_pairs(&post.upvotes, &post.downvotes) {
            usernames.insert(voter);
        }
    }
    for comment in comments {
        usernames.insert(&comment.username);
    }

    let mut users = HashMap::with_capacity(usernames.len());
    for name in usernames {
        validate_username(name)?;
        conn.execute("INSERT INTO users (username) VALUES (?1)", [name])?;
        users.insert(name.to_string(), conn.last_insert_rowid());
    }

    let mut topics = HashMap::with_capacity(topic_names.len());
    for name in topic_names {
        validate_topic_name(name)?;
        conn.execute("INSERT INTO topics (topic_name) VALUES (?1)", [name])?;
        topics.insert(name.to_string(), conn.last_insert_rowid());
    }

    info!(
        users = users.len(),
        topics = topics.len(),
        "derived legacy entities"
    );
    Ok(Derivation { users, topics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::apply_schema;

    fn legacy_post(id: i64, username: &str, topic: &str, up: &str, down: &str) -> LegacyPost {
        LegacyPost {
            id,
            topic: topic.into(),
            username: username.into(),
            title: "t".into(),
            url: None,
            text_content: Some("body".into()),
            upvotes: up.into(),
            downvotes: down.into(),
        }
    }

    fn legacy_comment(id: i64, username: &str) -> LegacyComment {
        LegacyComment {
            id,
            username: username.into(),
            post_id: 1,
            text_content: "c".into(),
        }
    }

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn dedups_across_author_voter_and_commenter_paths() {
        let conn = test_conn();
        let posts = vec![
            legacy_post(1, "alice", "rust", "alice,bob", "carol"),
            legacy_post(2, "bob", "rust", "", "alice"),
        ];
        let comments = vec![legacy_comment(1, "alice"), legacy_comment(2, "dave")];

        let derivation = derive_entities(&conn, &posts, &comments).unwrap();

        assert_eq!(derivation.user_count(), 4); // alice, bob, carol, dave
        assert_eq!(derivation.topic_count(), 1);

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 4, "exactly one row per distinct username");
    }

    #[test]
    fn dedup_is_case_sensitive_exact_equality() {
        let conn = test_conn();
        let posts = vec![legacy_post(1, "Alice", "rust", "alice", "")];

        let derivation = derive_entities(&conn, &posts, &[]).unwrap();
        assert_eq!(derivation.user_count(), 2);
    }

    #[test]
    fn overlong_username_fails_instead_of_truncating() {
        let conn = test_conn();
        let posts = vec![legacy_post(1, &"x".repeat(26), "rust", "", "")];

        let err = derive_entities(&conn, &posts, &[]).unwrap_err();
        assert!(matches!(err, MigrateError::InvalidUsername(_)));
    }

    #[test]
    fn overlong_topic_name_fails() {
        let conn = test_conn();
        let posts = vec![legacy_post(1, "alice", &"t".repeat(31), "", "")];

        let err = derive_entities(&conn, &posts, &[]).unwrap_err();
        assert!(matches!(err, MigrateError::InvalidTopicName(_)));
    }

    #[test]
    fn whitespace_only_username_fails() {
        let conn = test_conn();
        let comments = vec![legacy_comment(1, "   ")];

        let err = derive_entities(&conn, &[], &comments).unwrap_err();
        assert!(matches!(err, MigrateError::InvalidUsername(_)));
    }

    #[test]
    fn empty_corpus_derives_nothing() {
        let conn = test_conn();
        let derivation = derive_entities(&conn, &[], &[]).unwrap();
        assert_eq!(derivation.user_count(), 0);
        assert_eq!(derivation.topic_count(), 0);
    }
}
