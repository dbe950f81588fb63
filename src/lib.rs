//! Forum database normalizer.
//!
//! Owns a forum's normalized SQLite schema (users, topics, posts, comments,
//! votes) and performs the one-time migration of the legacy denormalized
//! tables (`bad_posts` with comma-joined voter lists, flat `bad_comments`)
//! into it.
//!
//! The migration is a staged pipeline (derive entities, build the name to id
//! resolver, then write posts, comments, and votes) executed in a single
//! transaction. See [`migrate::run`].

pub mod cli;
pub mod error;
pub mod legacy;
pub mod migrate;
pub mod model;
pub mod output;
pub mod storage;

pub use error::{MigrateError, Result};
