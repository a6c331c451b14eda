use chrono::Utc;
use rusqlite::{Row, params};

use crate::errors::{CodezapError, Result};
use crate::storage::CategoryStorage;
use crate::storage::models::Category;
use super::{SqliteStorage, not_found};

const CATEGORY_COLUMNS: &str = "id, member_id, name, created_at";

fn row_to_category(row: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        member_id: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
    })
}

impl CategoryStorage for SqliteStorage {
    fn insert_category(&self, member_id: i64, name: &str) -> Result<Category> {
        let now = Utc::now();
        self.conn
            .execute(
                "INSERT INTO categories (member_id, name, created_at) VALUES (?, ?, ?)",
                params![member_id, name, now],
            )
            .map_err(|e| {
                CodezapError::from_constraint(e, format!("category '{}' already exists", name))
            })?;
        let id = self.conn.last_insert_rowid();
        self.get_category(id)
    }

    fn get_category(&self, id: i64) -> Result<Category> {
        let sql = format!("SELECT {} FROM categories WHERE id = ?", CATEGORY_COLUMNS);
        self.conn
            .query_row(&sql, params![id], row_to_category)
            .map_err(|e| not_found(e, || format!("Category with id {} not found", id)))
    }

    fn category_exists(&self, id: i64) -> Result<bool> {
        self.exists("SELECT 1 FROM categories WHERE id = ?", params![id])
    }

    fn categories_of_member(&self, member_id: i64) -> Result<Vec<Category>> {
        let sql = format!(
            "SELECT {} FROM categories WHERE member_id = ? ORDER BY id",
            CATEGORY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let categories = stmt
            .query_map(params![member_id], row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    fn category_in_use(&self, id: i64) -> Result<bool> {
        self.exists("SELECT 1 FROM templates WHERE category_id = ?", params![id])
    }

    fn delete_category(&self, id: i64) -> Result<bool> {
        let changes = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?", params![id])
            .map_err(|e| CodezapError::from_constraint(e, format!("category {} is in use", id)))?;
        Ok(changes > 0)
    }
}
