use crate::errors::{CodezapError, Result};
use crate::storage::{LikesStorage, MemberStorage, TemplateStorage, Transactional};

/// Records that `member_id` likes `template_id`. Liking twice is a no-op.
/// Returns whether a new like was recorded.
pub fn like<S>(storage: &S, member_id: i64, template_id: i64) -> Result<bool>
where
    S: LikesStorage + MemberStorage + TemplateStorage + Transactional,
{
    storage.atomically(|s| {
        if !s.template_exists(template_id)? {
            return Err(CodezapError::NotFound(format!(
                "Template with id {} not found",
                template_id
            )));
        }
        if !s.member_exists(member_id)? {
            return Err(CodezapError::NotFound(format!(
                "Member with id {} not found",
                member_id
            )));
        }
        if s.like_exists(template_id, member_id)? {
            log::debug!("member {} already likes template {}", member_id, template_id);
            return Ok(false);
        }
        s.insert_like(template_id, member_id)?;
        log::info!("member {} liked template {}", member_id, template_id);
        Ok(true)
    })
}

pub fn likes_count<S>(storage: &S, template_id: i64) -> Result<i64>
where
    S: LikesStorage + TemplateStorage,
{
    if !storage.template_exists(template_id)? {
        return Err(CodezapError::NotFound(format!(
            "Template with id {} not found",
            template_id
        )));
    }
    storage.count_likes(template_id)
}
