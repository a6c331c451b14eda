use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{CodezapError, Result};
use crate::search::SearchPredicate;
use crate::storage::Storage;
use crate::storage::models::{
    Category, MAX_PAGE_SIZE, MemberIdentity, NewSourceCode, NewTemplate, Page, PageRequest,
    SourceCode, Tag, Template, TemplateFilter, TemplateUpdate,
};
use super::{category, required, tag};

/// Body of both create and update: an update replaces every field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category_id: i64,
    pub source_codes: Vec<NewSourceCode>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub member: MemberIdentity,
    pub category: Category,
    pub source_codes: Vec<SourceCode>,
    pub tags: Vec<Tag>,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub member_id: i64,
    pub category_id: i64,
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

struct ValidRequest {
    title: String,
    description: String,
    source_codes: Vec<NewSourceCode>,
    tags: Vec<String>,
}

fn validate(request: &TemplateRequest) -> Result<ValidRequest> {
    let title = required("title", &request.title)?;
    if request.source_codes.is_empty() {
        return Err(CodezapError::InvalidInput(
            "a template needs at least one source code".to_string(),
        ));
    }
    let source_codes = request
        .source_codes
        .iter()
        .map(|code| -> Result<NewSourceCode> {
            Ok(NewSourceCode {
                filename: required("filename", &code.filename)?,
                content: code.content.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ValidRequest {
        title,
        description: request.description.trim().to_string(),
        source_codes,
        tags: tag::normalize_names(&request.tags)?,
    })
}

/// The template must exist and belong to `actor`.
fn owned<S: Storage>(storage: &S, actor: &MemberIdentity, id: i64) -> Result<Template> {
    let template = storage.get_template(id)?;
    if template.member_id != actor.id {
        return Err(CodezapError::Forbidden(format!(
            "template {} does not belong to member {}",
            id, actor.id
        )));
    }
    Ok(template)
}

pub fn create<S: Storage>(
    storage: &S,
    actor: &MemberIdentity,
    request: &TemplateRequest,
) -> Result<i64> {
    let valid = validate(request)?;
    let id = storage.atomically(|s| {
        category::owned(s, actor, request.category_id)?;
        let template = s.insert_template(NewTemplate {
            member_id: actor.id,
            category_id: request.category_id,
            title: valid.title,
            description: valid.description,
        })?;
        s.replace_source_codes(template.id, &valid.source_codes)?;
        tag::create_tags(s, template.id, &valid.tags)?;
        Ok(template.id)
    })?;
    log::info!("member {} created template {}", actor.id, id);
    Ok(id)
}

pub fn get<S: Storage>(storage: &S, id: i64) -> Result<TemplateDetail> {
    let template = storage.get_template(id)?;
    let member = storage.get_member(template.member_id)?;
    Ok(TemplateDetail {
        id: template.id,
        member: MemberIdentity::from(&member),
        category: storage.get_category(template.category_id)?,
        source_codes: storage.source_codes_of(id)?,
        tags: storage.tags_of_template(id)?,
        likes_count: storage.count_likes(id)?,
        title: template.title,
        description: template.description,
        created_at: template.created_at,
        updated_at: template.updated_at,
    })
}

pub fn update<S: Storage>(
    storage: &S,
    actor: &MemberIdentity,
    id: i64,
    request: &TemplateRequest,
) -> Result<()> {
    let valid = validate(request)?;
    storage.atomically(|s| {
        owned(s, actor, id)?;
        category::owned(s, actor, request.category_id)?;
        s.update_template(
            id,
            &TemplateUpdate {
                category_id: request.category_id,
                title: valid.title,
                description: valid.description,
            },
        )?;
        s.replace_source_codes(id, &valid.source_codes)?;
        tag::reconcile(s, id, &valid.tags)?;
        Ok(())
    })?;
    log::info!("member {} updated template {}", actor.id, id);
    Ok(())
}

/// Deletes all of `ids` or none: every template must exist and belong to
/// `actor` before anything is removed.
pub fn delete_by_ids<S: Storage>(
    storage: &S,
    actor: &MemberIdentity,
    ids: &[i64],
) -> Result<usize> {
    let ids: Vec<i64> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    let removed = storage.atomically(|s| {
        for id in &ids {
            owned(s, actor, *id)?;
        }
        tag::delete_by_template_ids(s, &ids)?;
        s.delete_templates(&ids)
    })?;
    log::info!("member {} deleted {} template(s)", actor.id, removed);
    Ok(removed)
}

/// Rejects filter ids that point at nothing, so a typo is not mistaken for
/// an empty result.
fn check_filter<S: Storage>(storage: &S, filter: &TemplateFilter) -> Result<()> {
    if let Some(member_id) = filter.member_id {
        if !storage.member_exists(member_id)? {
            return Err(CodezapError::NotFound(format!(
                "Member with id {} not found",
                member_id
            )));
        }
    }
    if let Some(category_id) = filter.category_id {
        if !storage.category_exists(category_id)? {
            return Err(CodezapError::NotFound(format!(
                "Category with id {} not found",
                category_id
            )));
        }
    }
    let tag_ids: Vec<i64> = filter
        .tag_ids
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if storage.count_tags_with_ids(&tag_ids)? != tag_ids.len() as i64 {
        return Err(CodezapError::NotFound(format!("some of tags {:?} not found", tag_ids)));
    }
    Ok(())
}

fn check_page(page: PageRequest) -> Result<()> {
    if page.page < 1 {
        return Err(CodezapError::InvalidInput("page must be at least 1".to_string()));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page.size) {
        return Err(CodezapError::InvalidInput(format!(
            "page size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    Ok(())
}

pub fn search<S: Storage>(
    storage: &S,
    filter: &TemplateFilter,
    page: PageRequest,
) -> Result<Page<TemplateSummary>> {
    check_page(page)?;
    check_filter(storage, filter)?;
    let predicate = SearchPredicate::from_filter(filter);
    let found = storage.search_templates(&predicate, page)?;
    let items = found
        .items
        .into_iter()
        .map(|template| -> Result<TemplateSummary> {
            Ok(TemplateSummary {
                tags: storage.tags_of_template(template.id)?,
                id: template.id,
                title: template.title,
                description: template.description,
                member_id: template.member_id,
                category_id: template.category_id,
                created_at: template.created_at,
                updated_at: template.updated_at,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Page {
        items,
        total_elements: found.total_elements,
        total_pages: found.total_pages,
    })
}
