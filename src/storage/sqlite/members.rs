use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};

use crate::errors::{CodezapError, Result};
use crate::storage::MemberStorage;
use crate::storage::models::{Member, NewMember};
use super::{SqliteStorage, not_found};

const MEMBER_COLUMNS: &str = "id, email, name, password_hash, created_at";

fn row_to_member(row: &Row) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}

impl MemberStorage for SqliteStorage {
    fn insert_member(&self, member: NewMember) -> Result<Member> {
        let now = Utc::now();
        self.conn
            .execute(
                "INSERT INTO members (email, name, password_hash, created_at) VALUES (?, ?, ?, ?)",
                params![member.email, member.name, member.password_hash, now],
            )
            .map_err(|e| {
                CodezapError::from_constraint(
                    e,
                    format!("member '{}' <{}> already exists", member.name, member.email),
                )
            })?;
        let id = self.conn.last_insert_rowid();
        self.get_member(id)
    }

    fn get_member(&self, id: i64) -> Result<Member> {
        let sql = format!("SELECT {} FROM members WHERE id = ?", MEMBER_COLUMNS);
        self.conn
            .query_row(&sql, params![id], row_to_member)
            .map_err(|e| not_found(e, || format!("Member with id {} not found", id)))
    }

    fn find_member_by_email(&self, email: &str) -> Result<Option<Member>> {
        let sql = format!("SELECT {} FROM members WHERE email = ?", MEMBER_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![email], row_to_member)
            .optional()?)
    }

    fn member_exists(&self, id: i64) -> Result<bool> {
        self.exists("SELECT 1 FROM members WHERE id = ?", params![id])
    }

    fn member_exists_by_email(&self, email: &str) -> Result<bool> {
        self.exists("SELECT 1 FROM members WHERE email = ?", params![email])
    }

    fn member_exists_by_name(&self, name: &str) -> Result<bool> {
        self.exists("SELECT 1 FROM members WHERE name = ?", params![name])
    }
}
