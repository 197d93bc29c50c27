use std::path::Path;

use anyhow::Result;
use parking_lot::Mutex;
use rusqlite::{params, Connection};

use crate::wire::PostRead;

/// Gallery of shared posts. One SQLite connection behind a mutex; inserts are
/// single rows, so a concurrent list never observes a partial record.
pub struct PostStore {
    conn: Mutex<Connection>,
}

impl PostStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                prompt TEXT NOT NULL,
                image_url TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn insert(&self, prompt: &str, image_url: &str) -> Result<PostRead> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO posts (prompt, image_url) VALUES (?1, ?2)",
            params![prompt, image_url],
        )?;
        let id = conn.last_insert_rowid();
        Ok(PostRead { id, prompt: prompt.to_string(), image_url: image_url.to_string() })
    }

    pub fn list(&self, skip: i64, limit: i64) -> Result<Vec<PostRead>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, prompt, image_url FROM posts ORDER BY id LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt.query_map(params![limit, skip], |row| {
            Ok(PostRead { id: row.get(0)?, prompt: row.get(1)?, image_url: row.get(2)? })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
