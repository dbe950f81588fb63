//! Natural-key resolution.
//!
//! The join layer between legacy rows and normalized rows: username and
//! topic-name strings resolve to the surrogate ids assigned during
//! derivation. A [`Resolver`] can only be built by consuming a completed
//! [`Derivation`], so it is impossible to resolve against a partially
//! populated map. A lookup miss means the derivation scan was incomplete:
//! a programming error surfaced as a fatal migration error, never a row
//! with a dangling reference.

use crate::error::{MigrateError, Result};

use super::derive::Derivation;

#[derive(Debug)]
pub struct Resolver {
    derivation: Derivation,
}

impl Resolver {
    /// Build the lookup from a completed derivation.
    #[must_use]
    pub fn new(derivation: Derivation) -> Self {
        Self { derivation }
    }

    /// # Errors
    ///
    /// Returns [`MigrateError::UnresolvedUser`] if the username was never
    /// derived.
    pub fn user_id(&self, username: &str) -> Result<i64> {
        self.derivation
            .users
            .get(username)
            .copied()
            .ok_or_else(|| MigrateError::UnresolvedUser(username.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`MigrateError::UnresolvedTopic`] if the topic name was never
    /// derived.
    pub fn topic_id(&self, topic_name: &str) -> Result<i64> {
        self.derivation
            .topics
            .get(topic_name)
            .copied()
            .ok_or_else(|| MigrateError::UnresolvedTopic(topic_name.to_string()))
    }
}
