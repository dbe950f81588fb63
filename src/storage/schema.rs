//! Normalized schema definitions.

use rusqlite::{Connection, Result};

/// The complete SQL schema for the normalized forum database.
///
/// Delete semantics differ per edge and are load-bearing: deleting a topic
/// cascades its posts (and transitively their comments and votes); deleting
/// a user dissociates (`SET NULL`) everything the user authored or voted on;
/// deleting a comment cascades its descendant subtree through the self-FK.
pub const SCHEMA_SQL: &str = r"
    -- Users
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY,
        username TEXT NOT NULL UNIQUE
            CHECK(length(username) <= 25 AND length(trim(username)) > 0),
        time_created DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        username_updated DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    -- Topics
    CREATE TABLE IF NOT EXISTS topics (
        id INTEGER PRIMARY KEY,
        topic_name TEXT NOT NULL UNIQUE
            CHECK(length(topic_name) <= 30 AND length(trim(topic_name)) > 0),
        topic_description TEXT
            CHECK(topic_description IS NULL OR length(topic_description) <= 500),
        time_created DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    -- Posts
    -- Exactly one of post_url / post_content is set, never both, never neither.
    CREATE TABLE IF NOT EXISTS posts (
        id INTEGER PRIMARY KEY,
        post_title TEXT NOT NULL
            CHECK(length(post_title) <= 100 AND length(trim(post_title)) > 0),
        post_url TEXT,
        post_content TEXT,
        user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
        topic_id INTEGER NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
        time_created DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        CHECK ((post_url IS NULL) != (post_content IS NULL))
    );
    CREATE INDEX IF NOT EXISTS idx_posts_user_id ON posts(user_id) WHERE user_id IS NOT NULL;
    CREATE INDEX IF NOT EXISTS idx_posts_topic_id ON posts(topic_id);
    CREATE INDEX IF NOT EXISTS idx_posts_time_created ON posts(time_created);

    -- Comments
    -- comment_parent_id forms a forest rooted at NULLs; acyclicity is
    -- enforced by construction, not by constraint.
    CREATE TABLE IF NOT EXISTS comments (
        id INTEGER PRIMARY KEY,
        comment_text TEXT NOT NULL CHECK(length(trim(comment_text)) > 0),
        user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
        post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
        comment_parent_id INTEGER REFERENCES comments(id) ON DELETE CASCADE,
        time_created DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
    CREATE INDEX IF NOT EXISTS idx_comments_post_id ON comments(post_id);
    CREATE INDEX IF NOT EXISTS idx_comments_user_id ON comments(user_id) WHERE user_id IS NOT NULL;
    CREATE INDEX IF NOT EXISTS idx_comments_parent_id ON comments(comment_parent_id)
        WHERE comment_parent_id IS NOT NULL;

    -- Votes
    CREATE TABLE IF NOT EXISTS votes (
        id INTEGER PRIMARY KEY,
        vote INTEGER NOT NULL CHECK(vote IN (1, -1)),
        user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
        post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
        time_created DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE(user_id, post_id)
    );
    CREATE INDEX IF NOT EXISTS idx_votes_post_id ON votes(post_id);
    CREATE INDEX IF NOT EXISTS idx_votes_user_id ON votes(user_id) WHERE user_id IS NOT NULL;
";

/// Apply the schema to the database.
///
/// This uses `execute_batch` to run the entire DDL script.
/// It is idempotent because all statements use `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set journal mode to WAL for concurrency
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // Enable foreign keys; the delete semantics live in the FK actions
    conn.pragma_update(None, "foreign_keys", "ON")?;

    Ok(())
}
