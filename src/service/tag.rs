//! Tag reconciliation.
//!
//! A template's tags are brought to a desired list of names by computing the
//! set difference against what is linked now ([`TagDiff`]) and applying only
//! that difference inside one transaction. Tag rows are global and shared by
//! name; they are created on demand and never deleted here.

use std::collections::HashSet;

use crate::errors::{CodezapError, Result};
use crate::storage::models::Tag;
use crate::storage::{MemberStorage, TagStorage, TemplateStorage, Transactional};
use super::required;

#[derive(Debug, Default, PartialEq)]
pub struct TagDiff {
    /// Desired but not linked, in request order.
    pub to_link: Vec<String>,
    /// Linked but no longer desired, in link order.
    pub to_unlink: Vec<String>,
}

impl TagDiff {
    pub fn compute(existing: &[String], desired: &[String]) -> Self {
        let existing_set: HashSet<&str> = existing.iter().map(String::as_str).collect();
        let desired_set: HashSet<&str> = desired.iter().map(String::as_str).collect();

        let mut seen = HashSet::new();
        let to_link = desired
            .iter()
            .filter(|name| !existing_set.contains(name.as_str()))
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect();
        let to_unlink = existing
            .iter()
            .filter(|name| !desired_set.contains(name.as_str()))
            .cloned()
            .collect();
        Self { to_link, to_unlink }
    }

    pub fn is_empty(&self) -> bool {
        self.to_link.is_empty() && self.to_unlink.is_empty()
    }
}

/// Trims every name and rejects blank ones. Duplicates are kept; the diff
/// collapses them.
pub fn normalize_names(names: &[String]) -> Result<Vec<String>> {
    names.iter().map(|name| required("tag name", name)).collect()
}

/// Links tags for a template that may not have any yet. Existing links are
/// left alone and never duplicated.
pub fn create_tags<S>(storage: &S, template_id: i64, names: &[String]) -> Result<Vec<Tag>>
where
    S: TagStorage + Transactional,
{
    apply(storage, template_id, names, false)
}

/// Makes the template's tags exactly `names`: missing tags are created and
/// linked, links to tags not in `names` are removed. Calling it again with the
/// same names changes nothing.
pub fn reconcile<S>(storage: &S, template_id: i64, names: &[String]) -> Result<Vec<Tag>>
where
    S: TagStorage + Transactional,
{
    apply(storage, template_id, names, true)
}

fn apply<S>(storage: &S, template_id: i64, names: &[String], unlink: bool) -> Result<Vec<Tag>>
where
    S: TagStorage + Transactional,
{
    let desired = normalize_names(names)?;
    storage.atomically(|s| {
        let current = s.tags_of_template(template_id)?;
        let current_names: Vec<String> = current.iter().map(|t| t.name.clone()).collect();
        let diff = TagDiff::compute(&current_names, &desired);
        if diff.is_empty() {
            log::debug!("tags of template {} already up to date", template_id);
            return Ok(current);
        }

        for name in &diff.to_link {
            let tag = s.find_or_create_tag(name)?;
            s.link_tag(template_id, tag.id)?;
        }
        if unlink && !diff.to_unlink.is_empty() {
            let stale: Vec<i64> = current
                .iter()
                .filter(|t| diff.to_unlink.contains(&t.name))
                .map(|t| t.id)
                .collect();
            s.unlink_tags(template_id, &stale)?;
        }
        log::debug!(
            "template {} tags: linked {:?}, unlinked {:?}",
            template_id,
            diff.to_link,
            if unlink { diff.to_unlink.as_slice() } else { &[] }
        );
        s.tags_of_template(template_id)
    })
}

pub fn tags_of<S>(storage: &S, template_id: i64) -> Result<Vec<Tag>>
where
    S: TagStorage + TemplateStorage,
{
    if !storage.template_exists(template_id)? {
        return Err(CodezapError::NotFound(format!(
            "Template with id {} not found",
            template_id
        )));
    }
    storage.tags_of_template(template_id)
}

pub fn tags_of_templates<S: TagStorage>(storage: &S, template_ids: &[i64]) -> Result<Vec<Tag>> {
    storage.tags_of_templates(template_ids)
}

/// Distinct tags across every template `member_id` owns.
pub fn tags_of_member<S>(storage: &S, member_id: i64) -> Result<Vec<Tag>>
where
    S: MemberStorage + TagStorage + TemplateStorage,
{
    if !storage.member_exists(member_id)? {
        return Err(CodezapError::NotFound(format!(
            "Member with id {} not found",
            member_id
        )));
    }
    let template_ids = storage.template_ids_of_member(member_id)?;
    tags_of_templates(storage, &template_ids)
}

pub fn all_tags<S: TagStorage>(storage: &S) -> Result<Vec<Tag>> {
    storage.all_tags()
}

/// Drops every tag link of the given templates. Tag rows stay.
pub fn delete_by_template_ids<S: TagStorage>(storage: &S, template_ids: &[i64]) -> Result<usize> {
    storage.delete_template_tags(template_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::{SqliteStorage, fixtures};

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn saved_template(storage: &SqliteStorage) -> i64 {
        let member = fixtures::member(storage, "zappy");
        let category = fixtures::category(storage, member.id, "c");
        fixtures::template(storage, member.id, category.id, "t").id
    }

    fn second_template(storage: &SqliteStorage) -> i64 {
        let member = fixtures::member(storage, "chorong");
        let category = fixtures::category(storage, member.id, "c");
        fixtures::template(storage, member.id, category.id, "t2").id
    }

    fn linked_names(storage: &SqliteStorage, template_id: i64) -> Vec<String> {
        storage
            .tags_of_template(template_id)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect()
    }

    // --- Diff ---

    #[test]
    fn test_diff() {
        let diff = TagDiff::compute(&strings(&["go", "rust"]), &strings(&["rust", "zig"]));
        assert_eq!(diff.to_link, strings(&["zig"]));
        assert_eq!(diff.to_unlink, strings(&["go"]));
    }

    #[test]
    fn test_diff_collapses_duplicates() {
        let diff = TagDiff::compute(&[], &strings(&["a", "b", "a"]));
        assert_eq!(diff.to_link, strings(&["a", "b"]));
        assert!(diff.to_unlink.is_empty());
    }

    #[test]
    fn test_diff_same_set_is_empty() {
        let diff = TagDiff::compute(&strings(&["a", "b"]), &strings(&["b", "a"]));
        assert!(diff.is_empty());
    }

    #[test]
    fn test_normalize_rejects_blank() {
        assert_eq!(normalize_names(&strings(&[" a "])).unwrap(), strings(&["a"]));
        assert!(matches!(
            normalize_names(&strings(&["a", " "])),
            Err(CodezapError::InvalidInput(_))
        ));
    }

    // --- Create ---

    #[test]
    fn test_create_tags() {
        let storage = fixtures::storage();
        let template = saved_template(&storage);
        let names = strings(&["tag1", "tag2", "tag3"]);
        create_tags(&storage, template, &names).unwrap();
        assert_eq!(linked_names(&storage, template), names);
    }

    #[test]
    fn test_create_tags_skips_already_linked() {
        let storage = fixtures::storage();
        let template = saved_template(&storage);
        let existing = storage.find_or_create_tag("tag1").unwrap();
        storage.link_tag(template, existing.id).unwrap();

        let names = strings(&["tag1", "tag2", "tag3"]);
        create_tags(&storage, template, &names).unwrap();
        assert_eq!(linked_names(&storage, template), names);
    }

    #[test]
    fn test_create_tags_reuses_global_tag() {
        let storage = fixtures::storage();
        let first = saved_template(&storage);
        let second = second_template(&storage);
        let x = create_tags(&storage, first, &strings(&["x"])).unwrap();
        let reused = create_tags(&storage, second, &strings(&["x"])).unwrap();
        assert_eq!(x, reused);
        assert_eq!(storage.all_tags().unwrap().len(), 1);
    }

    #[test]
    fn test_create_tags_does_not_unlink() {
        let storage = fixtures::storage();
        let template = saved_template(&storage);
        create_tags(&storage, template, &strings(&["a"])).unwrap();
        create_tags(&storage, template, &strings(&["b"])).unwrap();
        assert_eq!(linked_names(&storage, template), strings(&["a", "b"]));
    }

    // --- Reconcile ---

    #[test]
    fn test_reconcile_creates_new_tag() {
        let storage = fixtures::storage();
        let template = saved_template(&storage);
        reconcile(&storage, template, &strings(&["tag1"])).unwrap();
        assert!(storage.find_tag_by_name("tag1").unwrap().is_some());
        assert_eq!(linked_names(&storage, template), strings(&["tag1"]));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let storage = fixtures::storage();
        let template = saved_template(&storage);
        let names = strings(&["a", "b"]);
        let once = reconcile(&storage, template, &names).unwrap();
        let twice = reconcile(&storage, template, &names).unwrap();
        assert_eq!(once, twice);
        let rows: i64 = storage
            .conn()
            .query_row("SELECT COUNT(*) FROM template_tags", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 2);
    }

    #[test]
    fn test_reconcile_removes_stale_links() {
        let storage = fixtures::storage();
        let template = saved_template(&storage);
        reconcile(&storage, template, &strings(&["a", "b"])).unwrap();
        reconcile(&storage, template, &strings(&["a"])).unwrap();
        assert_eq!(linked_names(&storage, template), strings(&["a"]));
        assert!(storage.find_tag_by_name("b").unwrap().is_some());
    }

    #[test]
    fn test_reconcile_go_rust_zig_scenario() {
        let storage = fixtures::storage();
        let template = saved_template(&storage);
        reconcile(&storage, template, &strings(&["go", "rust"])).unwrap();
        let tags = reconcile(&storage, template, &strings(&["rust", "zig"])).unwrap();
        let mut names: Vec<String> = tags.into_iter().map(|t| t.name).collect();
        names.sort();
        assert_eq!(names, strings(&["rust", "zig"]));
        assert!(storage.find_tag_by_name("go").unwrap().is_some());
    }

    #[test]
    fn test_reconcile_keeps_link_order() {
        let storage = fixtures::storage();
        let template = saved_template(&storage);
        reconcile(&storage, template, &strings(&["b", "a"])).unwrap();
        reconcile(&storage, template, &strings(&["c", "a", "b"])).unwrap();
        assert_eq!(linked_names(&storage, template), strings(&["b", "a", "c"]));
    }

    #[test]
    fn test_reconcile_to_empty_removes_all() {
        let storage = fixtures::storage();
        let template = saved_template(&storage);
        reconcile(&storage, template, &strings(&["tag1", "tag2"])).unwrap();
        reconcile(&storage, template, &[]).unwrap();
        assert!(linked_names(&storage, template).is_empty());
    }

    #[test]
    fn test_reconcile_leaves_other_templates_alone() {
        let storage = fixtures::storage();
        let first = saved_template(&storage);
        let second = second_template(&storage);
        reconcile(&storage, first, &strings(&["shared"])).unwrap();
        reconcile(&storage, second, &strings(&["shared"])).unwrap();
        reconcile(&storage, first, &[]).unwrap();
        assert_eq!(linked_names(&storage, second), strings(&["shared"]));
    }

    #[test]
    fn test_reconcile_rolls_back_on_failure() {
        let storage = fixtures::storage();
        // no such template: the first link violates the foreign key
        let result = reconcile(&storage, 999, &strings(&["orphan"]));
        assert!(result.is_err());
        assert!(storage.find_tag_by_name("orphan").unwrap().is_none());
    }

    // --- Lookup / delete ---

    #[test]
    fn test_tags_of_missing_template() {
        let storage = fixtures::storage();
        assert!(matches!(tags_of(&storage, 1), Err(CodezapError::NotFound(_))));
    }

    #[test]
    fn test_tags_of_template_without_tags() {
        let storage = fixtures::storage();
        let template = saved_template(&storage);
        storage.find_or_create_tag("tag1").unwrap();
        assert!(tags_of(&storage, template).unwrap().is_empty());
    }

    #[test]
    fn test_tags_of_templates_deduplicates() {
        let storage = fixtures::storage();
        let first = saved_template(&storage);
        let second = second_template(&storage);
        create_tags(&storage, first, &strings(&["tag1", "tag2"])).unwrap();
        create_tags(&storage, second, &strings(&["tag2"])).unwrap();
        let names: Vec<String> = tags_of_templates(&storage, &[first, second])
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, strings(&["tag1", "tag2"]));
    }

    #[test]
    fn test_tags_of_member_spans_only_their_templates() {
        let storage = fixtures::storage();
        let first = saved_template(&storage);
        let second = second_template(&storage);
        let zappy = storage.get_template(first).unwrap().member_id;
        let category = fixtures::category(&storage, zappy, "other");
        let third = fixtures::template(&storage, zappy, category.id, "t3").id;
        create_tags(&storage, first, &strings(&["tag1", "tag2"])).unwrap();
        create_tags(&storage, second, &strings(&["tag4"])).unwrap();
        create_tags(&storage, third, &strings(&["tag2", "tag3"])).unwrap();

        let names: Vec<String> = tags_of_member(&storage, zappy)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, strings(&["tag1", "tag2", "tag3"]));
    }

    #[test]
    fn test_tags_of_member_without_templates_or_unknown() {
        let storage = fixtures::storage();
        let member = fixtures::member(&storage, "zappy");
        assert!(tags_of_member(&storage, member.id).unwrap().is_empty());
        assert!(matches!(
            tags_of_member(&storage, member.id + 1),
            Err(CodezapError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_by_template_ids() {
        let storage = fixtures::storage();
        let template = saved_template(&storage);
        create_tags(&storage, template, &strings(&["tag1", "tag2"])).unwrap();
        assert_eq!(delete_by_template_ids(&storage, &[template]).unwrap(), 2);
        assert!(linked_names(&storage, template).is_empty());
        assert_eq!(all_tags(&storage).unwrap().len(), 2);
    }

    #[test]
    fn test_delete_by_template_ids_without_tags() {
        let storage = fixtures::storage();
        let template = saved_template(&storage);
        assert_eq!(delete_by_template_ids(&storage, &[template]).unwrap(), 0);
    }
}
