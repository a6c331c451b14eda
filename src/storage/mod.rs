pub mod models;
pub mod schema;
pub mod sqlite;

use crate::errors::Result;
use crate::search::SearchPredicate;
use models::{
    Category, Member, NewMember, NewSourceCode, NewTemplate, Page, PageRequest, SourceCode, Tag,
    Template, TemplateUpdate,
};

/// Runs a unit of work so that it commits entirely or not at all.
pub trait Transactional {
    /// Nested calls join the outer transaction.
    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>;
}

pub trait MemberStorage {
    fn insert_member(&self, member: NewMember) -> Result<Member>;
    fn get_member(&self, id: i64) -> Result<Member>;
    fn find_member_by_email(&self, email: &str) -> Result<Option<Member>>;
    fn member_exists(&self, id: i64) -> Result<bool>;
    fn member_exists_by_email(&self, email: &str) -> Result<bool>;
    fn member_exists_by_name(&self, name: &str) -> Result<bool>;
}

pub trait CategoryStorage {
    fn insert_category(&self, member_id: i64, name: &str) -> Result<Category>;
    fn get_category(&self, id: i64) -> Result<Category>;
    fn category_exists(&self, id: i64) -> Result<bool>;
    fn categories_of_member(&self, member_id: i64) -> Result<Vec<Category>>;
    fn category_in_use(&self, id: i64) -> Result<bool>;
    fn delete_category(&self, id: i64) -> Result<bool>;
}

pub trait TemplateStorage {
    fn insert_template(&self, template: NewTemplate) -> Result<Template>;
    fn get_template(&self, id: i64) -> Result<Template>;
    fn template_exists(&self, id: i64) -> Result<bool>;
    fn update_template(&self, id: i64, update: &TemplateUpdate) -> Result<Template>;
    fn replace_source_codes(
        &self,
        template_id: i64,
        codes: &[NewSourceCode],
    ) -> Result<Vec<SourceCode>>;
    fn source_codes_of(&self, template_id: i64) -> Result<Vec<SourceCode>>;
    fn template_ids_of_member(&self, member_id: i64) -> Result<Vec<i64>>;
    fn delete_templates(&self, ids: &[i64]) -> Result<usize>;
    fn search_templates(
        &self,
        predicate: &SearchPredicate,
        page: PageRequest,
    ) -> Result<Page<Template>>;
}

pub trait TagStorage {
    /// Returns the tag with this name, creating it first if needed.
    fn find_or_create_tag(&self, name: &str) -> Result<Tag>;
    fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>>;
    fn count_tags_with_ids(&self, ids: &[i64]) -> Result<i64>;
    fn all_tags(&self) -> Result<Vec<Tag>>;
    /// Tags of a template in the order they were linked.
    fn tags_of_template(&self, template_id: i64) -> Result<Vec<Tag>>;
    /// Distinct tags across templates, in first-linked order.
    fn tags_of_templates(&self, template_ids: &[i64]) -> Result<Vec<Tag>>;
    /// Fails with `Conflict` if the pair is already linked.
    fn link_tag(&self, template_id: i64, tag_id: i64) -> Result<()>;
    fn unlink_tags(&self, template_id: i64, tag_ids: &[i64]) -> Result<usize>;
    fn delete_template_tags(&self, template_ids: &[i64]) -> Result<usize>;
}

pub trait LikesStorage {
    fn like_exists(&self, template_id: i64, member_id: i64) -> Result<bool>;
    /// Fails with `Conflict` if the pair already exists.
    fn insert_like(&self, template_id: i64, member_id: i64) -> Result<()>;
    fn count_likes(&self, template_id: i64) -> Result<i64>;
}

/// Everything the services need from a store.
pub trait Storage:
    Transactional + MemberStorage + CategoryStorage + TemplateStorage + TagStorage + LikesStorage
{
}

impl<T> Storage for T where
    T: Transactional
        + MemberStorage
        + CategoryStorage
        + TemplateStorage
        + TagStorage
        + LikesStorage
{
}
