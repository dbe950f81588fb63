//! The legacy-to-normalized migration pipeline.
//!
//! An ordered pipeline with hard barriers: entity derivation must fully
//! complete before the resolver exists (the [`Resolver`] is only
//! constructible from a completed [`derive::Derivation`]), and the resolver
//! must exist before any writer pass runs. The posts pass runs before the
//! comments and votes passes because both join through its legacy-id to
//! new-id map.
//!
//! The whole pipeline executes inside one transaction: either every pass
//! commits or none does. Fatal errors roll everything back; duplicate-vote
//! rejections are per-record data, collected in the report and logged, and
//! never abort the run.

pub mod derive;
pub mod resolve;
pub mod split;
mod writer;

pub use resolve::Resolver;
pub use writer::PostIdMap;

use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

use crate::error::{MigrateError, Result};
use crate::legacy;
use crate::model::VoteDirection;

/// Outcome of a completed (committed) migration.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub users_created: usize,
    pub topics_created: usize,
    pub posts_migrated: usize,
    pub comments_migrated: usize,
    pub votes_recorded: usize,
    /// Per-record integrity rejections: reported, never silently dropped.
    pub rejected_comments: Vec<RejectedComment>,
    pub rejected_votes: Vec<RejectedVote>,
}

impl MigrationReport {
    /// Total per-record rejections across all passes.
    #[must_use]
    pub fn rejection_count(&self) -> usize {
        self.rejected_comments.len() + self.rejected_votes.len()
    }
}

/// A comment the schema rejected on insert (blank text in the legacy row).
#[derive(Debug, Clone, Serialize)]
pub struct RejectedComment {
    pub legacy_comment_id: i64,
}

/// A vote dropped because its (user, post) pair already voted, typically a
/// name listed in both the up and down lists of one legacy post.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedVote {
    pub username: String,
    pub legacy_post_id: i64,
    pub direction: VoteDirection,
}

/// The migration runs exactly once, against an empty target. Refusing a
/// populated target up front turns a second run into a clean error instead
/// of a mid-pipeline unique-constraint failure.
fn ensure_empty_target(conn: &Connection) -> Result<()> {
    let rows: i64 = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM users)
              + (SELECT COUNT(*) FROM topics)
              + (SELECT COUNT(*) FROM posts)",
        [],
        |row| row.get(0),
    )?;
    if rows > 0 {
        return Err(MigrateError::TargetNotEmpty);
    }
    Ok(())
}

/// Run the full migration against a database holding both the legacy tables
/// and the (empty) normalized schema.
///
/// # Errors
///
/// Any fatal condition (name validation failure, resolution miss,
/// content-exclusivity violation, populated target, database error) aborts
/// and rolls back; the database is left exactly as found.
pub fn run(conn: &mut Connection) -> Result<MigrationReport> {
    let tx = conn.transaction()?;

    ensure_empty_target(&tx)?;

    let posts = legacy::load_posts(&tx)?;
    let comments = legacy::load_comments(&tx)?;
    info!(
        posts = posts.len(),
        comments = comments.len(),
        "loaded legacy corpus"
    );

    let derivation = derive::derive_entities(&tx, &posts, &comments)?;
    let users_created = derivation.user_count();
    let topics_created = derivation.topic_count();

    let resolver = Resolver::new(derivation);

    let post_ids = writer::write_posts(&tx, &posts, &resolver)?;
    let posts_migrated = post_ids.len();
    let (comments_migrated, rejected_comments) =
        writer::write_comments(&tx, &comments, &resolver, &post_ids)?;
    let (votes_recorded, rejected_votes) = writer::write_votes(&tx, &posts, &resolver, &post_ids)?;

    tx.commit()?;
    info!("migration committed");

    Ok(MigrationReport {
        users_created,
        topics_created,
        posts_migrated,
        comments_migrated,
        votes_recorded,
        rejected_comments,
        rejected_votes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::apply_schema;

    fn migration_ready_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        legacy::create_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn empty_corpus_migrates_to_empty_report() {
        let mut conn = migration_ready_conn();
        let report = run(&mut conn).unwrap();
        assert_eq!(report.users_created, 0);
        assert_eq!(report.topics_created, 0);
        assert_eq!(report.posts_migrated, 0);
        assert_eq!(report.comments_migrated, 0);
        assert_eq!(report.votes_recorded, 0);
        assert_eq!(report.rejection_count(), 0);
    }

    #[test]
    fn populated_target_is_refused() {
        let mut conn = migration_ready_conn();
        conn.execute("INSERT INTO users (username) VALUES ('existing')", [])
            .unwrap();

        let err = run(&mut conn).unwrap_err();
        assert!(matches!(err, MigrateError::TargetNotEmpty));
    }

    #[test]
    fn report_serializes_for_json_output() {
        let report = MigrationReport {
            users_created: 2,
            topics_created: 1,
            posts_migrated: 1,
            comments_migrated: 0,
            votes_recorded: 1,
            rejected_comments: vec![],
            rejected_votes: vec![RejectedVote {
                username: "alice".into(),
                legacy_post_id: 1,
                direction: VoteDirection::Down,
            }],
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["users_created"], 2);
        assert_eq!(json["rejected_votes"][0]["username"], "alice");
        assert_eq!(json["rejected_votes"][0]["direction"], "down");
    }
}
