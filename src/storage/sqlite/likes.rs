use chrono::Utc;
use rusqlite::params;

use crate::errors::{CodezapError, Result};
use crate::storage::LikesStorage;
use super::SqliteStorage;

impl LikesStorage for SqliteStorage {
    fn like_exists(&self, template_id: i64, member_id: i64) -> Result<bool> {
        self.exists(
            "SELECT 1 FROM likes WHERE template_id = ? AND member_id = ?",
            params![template_id, member_id],
        )
    }

    fn insert_like(&self, template_id: i64, member_id: i64) -> Result<()> {
        let now = Utc::now();
        self.conn
            .execute(
                "INSERT INTO likes (template_id, member_id, created_at) VALUES (?, ?, ?)",
                params![template_id, member_id, now],
            )
            .map_err(|e| {
                CodezapError::from_constraint(
                    e,
                    format!("member {} already likes template {}", member_id, template_id),
                )
            })?;
        Ok(())
    }

    fn count_likes(&self, template_id: i64) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE template_id = ?",
            params![template_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
