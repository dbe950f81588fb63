//! Migration error taxonomy.
//!
//! Fatal variants abort the run and roll the transaction back. Per-record
//! vote rejections are not errors; they are collected in the
//! [`MigrationReport`](crate::migrate::MigrationReport).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrateError {
    /// Derived username fails the length or non-empty constraint.
    /// Names are identifiers: truncating one could collide with another,
    /// so the run is rejected instead.
    #[error("username {0:?} is empty or exceeds {max} characters", max = crate::model::USERNAME_MAX)]
    InvalidUsername(String),

    /// Derived topic name fails the length or non-empty constraint.
    #[error("topic name {0:?} is empty or exceeds {max} characters", max = crate::model::TOPIC_NAME_MAX)]
    InvalidTopicName(String),

    /// A legacy record references a username the deriver never produced.
    /// Signals an incomplete derivation pass, not bad data.
    #[error("no user derived for username {0:?}")]
    UnresolvedUser(String),

    /// A legacy post references a topic the deriver never produced.
    #[error("no topic derived for topic name {0:?}")]
    UnresolvedTopic(String),

    /// A legacy comment references a legacy post id missing from the
    /// posts pass output.
    #[error("legacy comment {comment_id} references unknown legacy post {post_id}")]
    UnresolvedPost { comment_id: i64, post_id: i64 },

    /// A legacy post id has no entry in the posts-pass id map. The votes
    /// pass iterates the same corpus the posts pass wrote, so this signals
    /// a pipeline bug rather than bad data.
    #[error("legacy post {0} was not assigned a normalized id")]
    UnmappedPost(i64),

    /// A legacy post carries both a URL and text content. The source has
    /// no documented resolution policy, so the record is rejected whole.
    #[error("legacy post {0} has both a URL and text content")]
    AmbiguousContent(i64),

    /// A legacy post carries neither a URL nor text content.
    #[error("legacy post {0} has neither a URL nor text content")]
    MissingContent(i64),

    /// The normalized tables already contain rows. The migration runs
    /// exactly once, against an empty target.
    #[error("target already contains normalized rows; migration requires an empty target")]
    TargetNotEmpty,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T, E = MigrateError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_identify_the_offending_record() {
        let err = MigrateError::InvalidUsername("x".repeat(30));
        assert!(err.to_string().contains("25 characters"));

        let err = MigrateError::UnresolvedPost {
            comment_id: 7,
            post_id: 99,
        };
        assert!(err.to_string().contains('7'));
        assert!(err.to_string().contains("99"));

        let err = MigrateError::AmbiguousContent(3);
        assert!(err.to_string().contains("both a URL and text content"));
    }
}
