//! Read-only access to the legacy denormalized tables.
//!
//! The legacy corpus lives in the same database as the normalized target:
//! `bad_posts` embeds the topic name, author name, and both voter lists as
//! strings; `bad_comments` embeds the author name and a reference to the
//! legacy post id. The migration only reads these tables; the insert helpers
//! exist for tests and for operators loading a legacy dump into a fresh file.

use rusqlite::{Connection, Result, params};

/// DDL for the legacy tables. Nullable everywhere the legacy export was
/// sloppy: voter lists and content fields are frequently empty strings
/// rather than NULLs.
pub const LEGACY_SCHEMA_SQL: &str = r"
    CREATE TABLE IF NOT EXISTS bad_posts (
        id INTEGER PRIMARY KEY,
        topic TEXT NOT NULL,
        username TEXT NOT NULL,
        title TEXT NOT NULL,
        url TEXT,
        text_content TEXT,
        upvotes TEXT,
        downvotes TEXT
    );

    CREATE TABLE IF NOT EXISTS bad_comments (
        id INTEGER PRIMARY KEY,
        username TEXT NOT NULL,
        post_id INTEGER NOT NULL,
        text_content TEXT NOT NULL
    );
";

/// A row of `bad_posts`. Voter lists are comma-joined username strings.
#[derive(Debug, Clone)]
pub struct LegacyPost {
    pub id: i64,
    pub topic: String,
    pub username: String,
    pub title: String,
    pub url: Option<String>,
    pub text_content: Option<String>,
    pub upvotes: String,
    pub downvotes: String,
}

/// A row of `bad_comments`. `post_id` references the legacy post id.
#[derive(Debug, Clone)]
pub struct LegacyComment {
    pub id: i64,
    pub username: String,
    pub post_id: i64,
    pub text_content: String,
}

/// Create the legacy tables if absent.
///
/// # Errors
///
/// Returns an error if the DDL fails to execute.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(LEGACY_SCHEMA_SQL)
}

/// Load the full `bad_posts` corpus, ordered by legacy id.
///
/// # Errors
///
/// Returns an error if the table is missing or a row fails to map.
pub fn load_posts(conn: &Connection) -> Result<Vec<LegacyPost>> {
    let mut stmt = conn.prepare(
        "SELECT id, topic, username, title, url, text_content, upvotes, downvotes
         FROM bad_posts ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(LegacyPost {
            id: row.get(0)?,
            topic: row.get(1)?,
            username: row.get(2)?,
            title: row.get(3)?,
            url: row.get(4)?,
            text_content: row.get(5)?,
            upvotes: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
            downvotes: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        })
    })?;
    rows.collect()
}

/// Load the full `bad_comments` corpus, ordered by legacy id.
///
/// # Errors
///
/// Returns an error if the table is missing or a row fails to map.
pub fn load_comments(conn: &Connection) -> Result<Vec<LegacyComment>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, post_id, text_content FROM bad_comments ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(LegacyComment {
            id: row.get(0)?,
            username: row.get(1)?,
            post_id: row.get(2)?,
            text_content: row.get(3)?,
        })
    })?;
    rows.collect()
}

/// Insert a legacy post row. Fixture/loader helper; the migration never
/// writes to the legacy tables.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_post(conn: &Connection, post: &LegacyPost) -> Result<()> {
    conn.execute(
        "INSERT INTO bad_posts (id, topic, username, title, url, text_content, upvotes, downvotes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            post.id,
            post.topic,
            post.username,
            post.title,
            post.url,
            post.text_content,
            post.upvotes,
            post.downvotes,
        ],
    )?;
    Ok(())
}

/// Insert a legacy comment row. Fixture/loader helper.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_comment(conn: &Connection, comment: &LegacyComment) -> Result<()> {
    conn.execute(
        "INSERT INTO bad_comments (id, username, post_id, text_content)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            comment.id,
            comment.username,
            comment.post_id,
            comment.text_content,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn create_tables_is_idempotent() {
        let conn = memory_db();
        create_tables(&conn).unwrap();
    }

    #[test]
    fn posts_round_trip_with_null_vote_lists() {
        let conn = memory_db();
        conn.execute(
            "INSERT INTO bad_posts (id, topic, username, title, url, text_content, upvotes, downvotes)
             VALUES (1, 'rust', 'alice', 'Hi', NULL, 'body', NULL, NULL)",
            [],
        )
        .unwrap();

        let posts = load_posts(&conn).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].username, "alice");
        assert_eq!(posts[0].url, None);
        assert_eq!(posts[0].text_content.as_deref(), Some("body"));
        // NULL voter lists read as empty strings
        assert_eq!(posts[0].upvotes, "");
        assert_eq!(posts[0].downvotes, "");
    }

    #[test]
    fn comments_load_in_id_order() {
        let conn = memory_db();
        for id in [3, 1, 2] {
            insert_comment(
                &conn,
                &LegacyComment {
                    id,
                    username: "bob".into(),
                    post_id: 1,
                    text_content: format!("comment {id}"),
                },
            )
            .unwrap();
        }

        let comments = load_comments(&conn).unwrap();
        let ids: Vec<i64> = comments.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
