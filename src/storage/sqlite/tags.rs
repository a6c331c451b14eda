use rusqlite::{OptionalExtension, Row, params, params_from_iter};

use crate::errors::{CodezapError, Result};
use crate::search::placeholders;
use crate::storage::TagStorage;
use crate::storage::models::Tag;
use super::SqliteStorage;

fn row_to_tag(row: &Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

impl TagStorage for SqliteStorage {
    fn find_or_create_tag(&self, name: &str) -> Result<Tag> {
        // OR IGNORE lets concurrent creators of the same name both succeed.
        self.conn
            .execute("INSERT OR IGNORE INTO tags (name) VALUES (?)", params![name])?;
        let tag = self.conn.query_row(
            "SELECT id, name FROM tags WHERE name = ?",
            params![name],
            row_to_tag,
        )?;
        Ok(tag)
    }

    fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        Ok(self
            .conn
            .query_row("SELECT id, name FROM tags WHERE name = ?", params![name], row_to_tag)
            .optional()?)
    }

    fn count_tags_with_ids(&self, ids: &[i64]) -> Result<i64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let sql = format!(
            "SELECT COUNT(*) FROM tags WHERE id IN ({})",
            placeholders(ids.len())
        );
        let count = self
            .conn
            .query_row(&sql, params_from_iter(ids.iter()), |row| row.get(0))?;
        Ok(count)
    }

    fn all_tags(&self) -> Result<Vec<Tag>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM tags ORDER BY id")?;
        let tags = stmt
            .query_map([], row_to_tag)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    fn tags_of_template(&self, template_id: i64) -> Result<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT tags.id, tags.name FROM template_tags tt
             JOIN tags ON tags.id = tt.tag_id
             WHERE tt.template_id = ?
             ORDER BY tt.id",
        )?;
        let tags = stmt
            .query_map(params![template_id], row_to_tag)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    fn tags_of_templates(&self, template_ids: &[i64]) -> Result<Vec<Tag>> {
        if template_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT tags.id, tags.name FROM template_tags tt
             JOIN tags ON tags.id = tt.tag_id
             WHERE tt.template_id IN ({})
             GROUP BY tags.id, tags.name
             ORDER BY MIN(tt.id)",
            placeholders(template_ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let tags = stmt
            .query_map(params_from_iter(template_ids.iter()), row_to_tag)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    fn link_tag(&self, template_id: i64, tag_id: i64) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO template_tags (template_id, tag_id) VALUES (?, ?)",
                params![template_id, tag_id],
            )
            .map_err(|e| {
                CodezapError::from_constraint(
                    e,
                    format!("template {} cannot be linked to tag {}", template_id, tag_id),
                )
            })?;
        Ok(())
    }

    fn unlink_tags(&self, template_id: i64, tag_ids: &[i64]) -> Result<usize> {
        if tag_ids.is_empty() {
            return Ok(0);
        }
        let sql = format!(
            "DELETE FROM template_tags WHERE template_id = ? AND tag_id IN ({})",
            placeholders(tag_ids.len())
        );
        let params = std::iter::once(&template_id).chain(tag_ids.iter());
        let changes = self.conn.execute(&sql, params_from_iter(params))?;
        Ok(changes)
    }

    fn delete_template_tags(&self, template_ids: &[i64]) -> Result<usize> {
        if template_ids.is_empty() {
            return Ok(0);
        }
        let sql = format!(
            "DELETE FROM template_tags WHERE template_id IN ({})",
            placeholders(template_ids.len())
        );
        let changes = self
            .conn
            .execute(&sql, params_from_iter(template_ids.iter()))?;
        Ok(changes)
    }
}
