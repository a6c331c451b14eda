use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{Row, params, params_from_iter};

use crate::errors::{CodezapError, Result};
use crate::search::{SearchPredicate, placeholders};
use crate::storage::models::{
    NewSourceCode, NewTemplate, Page, PageRequest, SourceCode, Template, TemplateUpdate,
};
use crate::storage::{TemplateStorage, Transactional};
use super::{SqliteStorage, not_found};

const TEMPLATE_COLUMNS: &str = "
    templates.id, templates.member_id, templates.category_id, templates.title,
    templates.description, templates.created_at, templates.updated_at
";

fn row_to_template(row: &Row) -> rusqlite::Result<Template> {
    Ok(Template {
        id: row.get(0)?,
        member_id: row.get(1)?,
        category_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn row_to_source_code(row: &Row) -> rusqlite::Result<SourceCode> {
    Ok(SourceCode {
        id: row.get(0)?,
        template_id: row.get(1)?,
        filename: row.get(2)?,
        content: row.get(3)?,
        ordinal: row.get(4)?,
    })
}

impl TemplateStorage for SqliteStorage {
    fn insert_template(&self, template: NewTemplate) -> Result<Template> {
        let now = Utc::now();
        self.conn
            .execute(
                "INSERT INTO templates
                     (member_id, category_id, title, description, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                params![
                    template.member_id,
                    template.category_id,
                    template.title,
                    template.description,
                    now,
                    now,
                ],
            )
            .map_err(|e| {
                CodezapError::from_constraint(e, "template references a missing member or category")
            })?;
        let id = self.conn.last_insert_rowid();
        self.get_template(id)
    }

    fn get_template(&self, id: i64) -> Result<Template> {
        let sql = format!("SELECT {} FROM templates WHERE templates.id = ?", TEMPLATE_COLUMNS);
        self.conn
            .query_row(&sql, params![id], row_to_template)
            .map_err(|e| not_found(e, || format!("Template with id {} not found", id)))
    }

    fn template_exists(&self, id: i64) -> Result<bool> {
        self.exists("SELECT 1 FROM templates WHERE id = ?", params![id])
    }

    fn update_template(&self, id: i64, update: &TemplateUpdate) -> Result<Template> {
        let now = Utc::now();
        let changes = self
            .conn
            .execute(
                "UPDATE templates SET category_id = ?, title = ?, description = ?, updated_at = ?
                 WHERE id = ?",
                params![update.category_id, update.title, update.description, now, id],
            )
            .map_err(|e| {
                CodezapError::from_constraint(e, "template references a missing category")
            })?;
        if changes == 0 {
            return Err(CodezapError::NotFound(format!("Template with id {} not found", id)));
        }
        self.get_template(id)
    }

    fn replace_source_codes(
        &self,
        template_id: i64,
        codes: &[NewSourceCode],
    ) -> Result<Vec<SourceCode>> {
        self.atomically(|storage| {
            storage.conn.execute(
                "DELETE FROM source_codes WHERE template_id = ?",
                params![template_id],
            )?;
            let mut stmt = storage.conn.prepare(
                "INSERT INTO source_codes (template_id, filename, content, ordinal)
                 VALUES (?, ?, ?, ?)",
            )?;
            for (ordinal, code) in (1_i64..).zip(codes) {
                stmt.execute(params![template_id, code.filename, code.content, ordinal])?;
            }
            storage.source_codes_of(template_id)
        })
    }

    fn source_codes_of(&self, template_id: i64) -> Result<Vec<SourceCode>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, template_id, filename, content, ordinal FROM source_codes
             WHERE template_id = ? ORDER BY ordinal, id",
        )?;
        let codes = stmt
            .query_map(params![template_id], row_to_source_code)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(codes)
    }

    fn template_ids_of_member(&self, member_id: i64) -> Result<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM templates WHERE member_id = ? ORDER BY id")?;
        let ids = stmt
            .query_map(params![member_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    fn delete_templates(&self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        // source_codes, template_tags and likes go with ON DELETE CASCADE
        let sql = format!("DELETE FROM templates WHERE id IN ({})", placeholders(ids.len()));
        let changes = self.conn.execute(&sql, params_from_iter(ids.iter()))?;
        Ok(changes)
    }

    fn search_templates(
        &self,
        predicate: &SearchPredicate,
        page: PageRequest,
    ) -> Result<Page<Template>> {
        let (where_clause, mut values) = predicate.to_sql();

        let count_sql = format!("SELECT COUNT(*) FROM templates {}", where_clause);
        let total: i64 =
            self.conn
                .query_row(&count_sql, params_from_iter(values.iter()), |row| row.get(0))?;

        let sql = format!(
            "SELECT {} FROM templates {} ORDER BY templates.id DESC LIMIT ? OFFSET ?",
            TEMPLATE_COLUMNS, where_clause
        );
        values.push(Value::Integer(page.effective_size()));
        values.push(Value::Integer(page.offset()));

        let mut stmt = self.conn.prepare(&sql)?;
        let templates = stmt
            .query_map(params_from_iter(values.iter()), row_to_template)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Page::new(templates, total, page))
    }
}
