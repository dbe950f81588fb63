//! SQLite-backed store for the normalized forum schema.
//!
//! [`ForumStore`] owns the connection and exposes the steady-state
//! operations the schema supports. Delete semantics ride on the foreign-key
//! actions declared in [`schema`]; the only behavior implemented here rather
//! than in DDL is the username-change timestamp, which is an explicit
//! mutation path (`rename_user`) instead of a database trigger.

pub mod schema;

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::model::{Comment, Post, PostBody, Topic, User, Vote, VoteDirection};

pub struct ForumStore {
    conn: Connection,
}

impl ForumStore {
    /// Open (creating if needed) a forum database at `path` and apply the
    /// normalized schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the schema fails to
    /// apply.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        schema::apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory store, used by tests and benchmarks.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema fails to apply.
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::apply_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Mutable access for transactional work (the migration pipeline).
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    // ── users ──

    /// # Errors
    ///
    /// Returns an error if the username violates the schema constraints or
    /// already exists.
    pub fn create_user(&self, username: &str) -> rusqlite::Result<i64> {
        self.conn
            .execute("INSERT INTO users (username) VALUES (?1)", [username])?;
        Ok(self.conn.last_insert_rowid())
    }

    /// # Errors
    ///
    /// Returns an error on query failure.
    pub fn user(&self, id: i64) -> rusqlite::Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, username, time_created, username_updated FROM users WHERE id = ?1",
                [id],
                user_from_row,
            )
            .optional()
    }

    /// # Errors
    ///
    /// Returns an error on query failure.
    pub fn user_by_name(&self, username: &str) -> rusqlite::Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, username, time_created, username_updated FROM users WHERE username = ?1",
                [username],
                user_from_row,
            )
            .optional()
    }

    /// Change a username, refreshing `username_updated` in the same UPDATE.
    /// A rename to the current name is a no-op and does not touch the
    /// timestamp. Returns whether a row changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the new name violates the schema constraints or
    /// collides with an existing user.
    pub fn rename_user(&self, id: i64, new_username: &str) -> rusqlite::Result<bool> {
        let changed = self.conn.execute(
            "UPDATE users SET username = ?1, username_updated = CURRENT_TIMESTAMP
             WHERE id = ?2 AND username <> ?1",
            params![new_username, id],
        )?;
        Ok(changed > 0)
    }

    /// Delete a user. Their posts, comments, and votes survive with
    /// `user_id` nulled (dissociation, not cascade).
    ///
    /// # Errors
    ///
    /// Returns an error on statement failure.
    pub fn delete_user(&self, id: i64) -> rusqlite::Result<bool> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    // ── topics ──

    /// # Errors
    ///
    /// Returns an error if the topic name violates the schema constraints or
    /// already exists.
    pub fn create_topic(&self, name: &str, description: Option<&str>) -> rusqlite::Result<i64> {
        self.conn.execute(
            "INSERT INTO topics (topic_name, topic_description) VALUES (?1, ?2)",
            params![name, description],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// # Errors
    ///
    /// Returns an error on query failure.
    pub fn topic(&self, id: i64) -> rusqlite::Result<Option<Topic>> {
        self.conn
            .query_row(
                "SELECT id, topic_name, topic_description, time_created FROM topics WHERE id = ?1",
                [id],
                topic_from_row,
            )
            .optional()
    }

    /// Delete a topic. All of its posts go with it, and transitively their
    /// comments and votes.
    ///
    /// # Errors
    ///
    /// Returns an error on statement failure.
    pub fn delete_topic(&self, id: i64) -> rusqlite::Result<bool> {
        let changed = self.conn.execute("DELETE FROM topics WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    // ── posts ──

    /// # Errors
    ///
    /// Returns an error if the title violates the schema constraints or a
    /// referenced row is missing.
    pub fn create_post(
        &self,
        title: &str,
        body: &PostBody,
        user_id: Option<i64>,
        topic_id: i64,
    ) -> rusqlite::Result<i64> {
        self.conn.execute(
            "INSERT INTO posts (post_title, post_url, post_content, user_id, topic_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![title, body.url(), body.text(), user_id, topic_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// # Errors
    ///
    /// Returns an error on query failure.
    pub fn post(&self, id: i64) -> rusqlite::Result<Option<Post>> {
        self.conn
            .query_row(
                "SELECT id, post_title, post_url, post_content, user_id, topic_id, time_created
                 FROM posts WHERE id = ?1",
                [id],
                post_from_row,
            )
            .optional()
    }

    /// Delete a post, cascading its comments and votes.
    ///
    /// # Errors
    ///
    /// Returns an error on statement failure.
    pub fn delete_post(&self, id: i64) -> rusqlite::Result<bool> {
        let changed = self.conn.execute("DELETE FROM posts WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    // ── comments ──

    /// Create a comment. `parent` must already exist; threads are insert-only
    /// and never re-parented, which is what keeps them acyclic.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is blank or a referenced row is missing.
    pub fn create_comment(
        &self,
        text: &str,
        user_id: Option<i64>,
        post_id: i64,
        parent: Option<i64>,
    ) -> rusqlite::Result<i64> {
        self.conn.execute(
            "INSERT INTO comments (comment_text, user_id, post_id, comment_parent_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![text, user_id, post_id, parent],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// # Errors
    ///
    /// Returns an error on query failure.
    pub fn comment(&self, id: i64) -> rusqlite::Result<Option<Comment>> {
        self.conn
            .query_row(
                "SELECT id, comment_text, user_id, post_id, comment_parent_id, time_created
                 FROM comments WHERE id = ?1",
                [id],
                comment_from_row,
            )
            .optional()
    }

    /// Delete a comment and its entire descendant subtree.
    ///
    /// # Errors
    ///
    /// Returns an error on statement failure.
    pub fn delete_comment(&self, id: i64) -> rusqlite::Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM comments WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    // ── votes ──

    /// Record a vote. At most one vote per (user, post); a second cast is
    /// rejected by the UNIQUE constraint.
    ///
    /// # Errors
    ///
    /// Returns an error if the (user, post) pair already voted or a
    /// referenced row is missing.
    pub fn cast_vote(
        &self,
        user_id: i64,
        post_id: i64,
        direction: VoteDirection,
    ) -> rusqlite::Result<i64> {
        self.conn.execute(
            "INSERT INTO votes (vote, user_id, post_id) VALUES (?1, ?2, ?3)",
            params![direction.value(), user_id, post_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// # Errors
    ///
    /// Returns an error on query failure.
    pub fn votes_for_post(&self, post_id: i64) -> rusqlite::Result<Vec<Vote>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, vote, user_id, post_id, time_created FROM votes
             WHERE post_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([post_id], vote_from_row)?;
        rows.collect()
    }

    /// Row counts for the five normalized tables, in schema order.
    ///
    /// # Errors
    ///
    /// Returns an error on query failure.
    pub fn table_counts(&self) -> rusqlite::Result<Vec<(&'static str, i64)>> {
        ["users", "topics", "posts", "comments", "votes"]
            .into_iter()
            .map(|table| {
                let count = self.conn.query_row(
                    &format!("SELECT COUNT(*) FROM {table}"),
                    [],
                    |row| row.get(0),
                )?;
                Ok((table, count))
            })
            .collect()
    }
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        time_created: timestamp_from_row(row, 2)?,
        username_updated: timestamp_from_row(row, 3)?,
    })
}

fn topic_from_row(row: &Row) -> rusqlite::Result<Topic> {
    Ok(Topic {
        id: row.get(0)?,
        topic_name: row.get(1)?,
        topic_description: row.get(2)?,
        time_created: timestamp_from_row(row, 3)?,
    })
}

fn post_from_row(row: &Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        post_title: row.get(1)?,
        post_url: row.get(2)?,
        post_content: row.get(3)?,
        user_id: row.get(4)?,
        topic_id: row.get(5)?,
        time_created: timestamp_from_row(row, 6)?,
    })
}

fn comment_from_row(row: &Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        comment_text: row.get(1)?,
        user_id: row.get(2)?,
        post_id: row.get(3)?,
        comment_parent_id: row.get(4)?,
        time_created: timestamp_from_row(row, 5)?,
    })
}

fn vote_from_row(row: &Row) -> rusqlite::Result<Vote> {
    let raw: i64 = row.get(1)?;
    let vote = VoteDirection::from_value(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Integer,
            format!("vote value {raw} outside {{1, -1}}").into(),
        )
    })?;
    Ok(Vote {
        id: row.get(0)?,
        vote,
        user_id: row.get(2)?,
        post_id: row.get(3)?,
        time_created: timestamp_from_row(row, 4)?,
    })
}

/// SQLite `CURRENT_TIMESTAMP` produces `YYYY-MM-DD HH:MM:SS` in UTC.
fn timestamp_from_row(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(err),
            )
        })
}
