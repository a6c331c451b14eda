use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// What callers get back after authenticating: never the stored secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberIdentity {
    pub id: i64,
    pub email: String,
    pub name: String,
}

impl From<&Member> for MemberIdentity {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            email: member.email.clone(),
            name: member.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewMember {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub id: i64,
    pub member_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub id: i64,
    pub member_id: i64,
    pub category_id: i64,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub member_id: i64,
    pub category_id: i64,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct TemplateUpdate {
    pub category_id: i64,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceCode {
    pub id: i64,
    pub template_id: i64,
    pub filename: String,
    pub content: String,
    pub ordinal: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSourceCode {
    pub filename: String,
    pub content: String,
}

/// Filters for template search. `None` and empty values impose no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateFilter {
    pub member_id: Option<i64>,
    pub keyword: Option<String>,
    pub category_id: Option<i64>,
    pub tag_ids: Vec<i64>,
}

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn effective_size(&self) -> i64 {
        if self.size <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.size.min(MAX_PAGE_SIZE)
        }
    }

    /// Saturates instead of overflowing; a page past the end is simply empty.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.effective_size())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_elements: i64, request: PageRequest) -> Self {
        let size = request.effective_size();
        Self {
            items,
            total_elements,
            total_pages: if total_elements <= 0 {
                0
            } else {
                (total_elements - 1) / size + 1
            },
        }
    }
}
