mod categories;
mod likes;
mod members;
mod tags;
mod templates;

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, Params};

use crate::errors::{CodezapError, Result};
use super::Transactional;
use super::schema;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn new(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        for statement in schema::ALL {
            conn.execute(statement, [])?;
        }
        Ok(Self { conn })
    }

    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::new(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::new(conn)
    }

    #[cfg(test)]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn exists<P: Params>(&self, sql: &str, params: P) -> Result<bool> {
        let found: bool = self
            .conn
            .query_row(&format!("SELECT EXISTS({})", sql), params, |row| row.get(0))?;
        Ok(found)
    }
}

impl Transactional for SqliteStorage {
    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        if !self.conn.is_autocommit() {
            return f(self);
        }
        // Dropping the transaction without commit rolls it back.
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }
}

fn not_found(err: rusqlite::Error, message: impl FnOnce() -> String) -> CodezapError {
    match err {
        rusqlite::Error::QueryReturnedNoRows => CodezapError::NotFound(message()),
        other => CodezapError::Storage(other),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::SqliteStorage;
    use crate::storage::models::{Category, Member, NewMember, NewTemplate, Template};
    use crate::storage::{CategoryStorage, MemberStorage, TemplateStorage};

    pub fn storage() -> SqliteStorage {
        SqliteStorage::in_memory().unwrap()
    }

    pub fn member(storage: &SqliteStorage, name: &str) -> Member {
        storage
            .insert_member(NewMember {
                email: format!("{}@code.zap", name),
                name: name.to_string(),
                password_hash: "not-a-real-hash".to_string(),
            })
            .unwrap()
    }

    pub fn category(storage: &SqliteStorage, member_id: i64, name: &str) -> Category {
        storage.insert_category(member_id, name).unwrap()
    }

    pub fn template(
        storage: &SqliteStorage,
        member_id: i64,
        category_id: i64,
        title: &str,
    ) -> Template {
        storage
            .insert_template(NewTemplate {
                member_id,
                category_id,
                title: title.to_string(),
                description: String::new(),
            })
            .unwrap()
    }
}
