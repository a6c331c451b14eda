use crate::errors::{CodezapError, Result};
use crate::storage::models::{Category, MemberIdentity};
use crate::storage::{CategoryStorage, MemberStorage};
use super::required;

pub fn create<S: CategoryStorage>(
    storage: &S,
    actor: &MemberIdentity,
    name: &str,
) -> Result<Category> {
    let name = required("category name", name)?;
    let category = storage.insert_category(actor.id, &name)?;
    log::info!("member {} created category {} '{}'", actor.id, category.id, category.name);
    Ok(category)
}

pub fn list<S>(storage: &S, member_id: i64) -> Result<Vec<Category>>
where
    S: CategoryStorage + MemberStorage,
{
    if !storage.member_exists(member_id)? {
        return Err(CodezapError::NotFound(format!(
            "Member with id {} not found",
            member_id
        )));
    }
    storage.categories_of_member(member_id)
}

/// The category must belong to `actor`.
pub fn owned<S: CategoryStorage>(
    storage: &S,
    actor: &MemberIdentity,
    id: i64,
) -> Result<Category> {
    let category = storage.get_category(id)?;
    if category.member_id != actor.id {
        return Err(CodezapError::Forbidden(format!(
            "category {} does not belong to member {}",
            id, actor.id
        )));
    }
    Ok(category)
}

pub fn delete<S: CategoryStorage>(storage: &S, actor: &MemberIdentity, id: i64) -> Result<()> {
    owned(storage, actor, id)?;
    if storage.category_in_use(id)? {
        return Err(CodezapError::Conflict(format!(
            "category {} still has templates",
            id
        )));
    }
    storage.delete_category(id)?;
    log::info!("member {} deleted category {}", actor.id, id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::fixtures::signed_up;
    use crate::storage::sqlite::SqliteStorage;
    use crate::storage::sqlite::fixtures::template;

    #[test]
    fn test_create_and_list() {
        let storage = SqliteStorage::in_memory().unwrap();
        let zappy = signed_up(&storage, "zappy");
        create(&storage, &zappy, " Rust ").unwrap();
        create(&storage, &zappy, "Go").unwrap();
        let names: Vec<String> = list(&storage, zappy.id)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Rust", "Go"]);
    }

    #[test]
    fn test_create_duplicate_conflicts() {
        let storage = SqliteStorage::in_memory().unwrap();
        let zappy = signed_up(&storage, "zappy");
        create(&storage, &zappy, "Rust").unwrap();
        assert!(matches!(
            create(&storage, &zappy, "Rust"),
            Err(CodezapError::Conflict(_))
        ));
    }

    #[test]
    fn test_list_unknown_member() {
        let storage = SqliteStorage::in_memory().unwrap();
        assert!(matches!(list(&storage, 5), Err(CodezapError::NotFound(_))));
    }

    #[test]
    fn test_delete_requires_owner() {
        let storage = SqliteStorage::in_memory().unwrap();
        let zappy = signed_up(&storage, "zappy");
        let chorong = signed_up(&storage, "chorong");
        let category = create(&storage, &zappy, "Rust").unwrap();
        assert!(matches!(
            delete(&storage, &chorong, category.id),
            Err(CodezapError::Forbidden(_))
        ));
        delete(&storage, &zappy, category.id).unwrap();
        assert!(matches!(
            delete(&storage, &zappy, category.id),
            Err(CodezapError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_in_use_conflicts() {
        let storage = SqliteStorage::in_memory().unwrap();
        let zappy = signed_up(&storage, "zappy");
        let category = create(&storage, &zappy, "Rust").unwrap();
        template(&storage, zappy.id, category.id, "t");
        assert!(matches!(
            delete(&storage, &zappy, category.id),
            Err(CodezapError::Conflict(_))
        ));
    }
}
