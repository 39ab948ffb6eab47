//! The single ownership rule: only the user recorded on a row may change it.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::{
    entity::{category, comment, post, tag, user},
    BlogError, EntityKind,
};

/// An entity with an owning user
pub trait Owned: EntityTrait {
    const KIND: EntityKind;

    /// Primary key column
    fn key() -> Self::Column;

    fn owner_of(model: &Self::Model) -> i32;
}

impl Owned for post::Entity {
    const KIND: EntityKind = EntityKind::Post;

    fn key() -> Self::Column {
        post::Column::Id
    }

    fn owner_of(model: &post::Model) -> i32 {
        model.user_id
    }
}

impl Owned for comment::Entity {
    const KIND: EntityKind = EntityKind::Comment;

    fn key() -> Self::Column {
        comment::Column::Id
    }

    fn owner_of(model: &comment::Model) -> i32 {
        model.user_id
    }
}

impl Owned for tag::Entity {
    const KIND: EntityKind = EntityKind::Tag;

    fn key() -> Self::Column {
        tag::Column::Id
    }

    fn owner_of(model: &tag::Model) -> i32 {
        model.user_id
    }
}

impl Owned for category::Entity {
    const KIND: EntityKind = EntityKind::Category;

    fn key() -> Self::Column {
        category::Column::Id
    }

    fn owner_of(model: &category::Model) -> i32 {
        model.user_id
    }
}

/// A user owns their own profile.
impl Owned for user::Entity {
    const KIND: EntityKind = EntityKind::User;

    fn key() -> Self::Column {
        user::Column::Id
    }

    fn owner_of(model: &user::Model) -> i32 {
        model.id
    }
}

/// Loads `id` and checks that `actor` owns it.
///
/// Fails with [`BlogError::NotFound`] if the row is absent and
/// [`BlogError::Forbidden`] if someone else owns it.
pub async fn owned_by<E, C>(db: &C, id: i32, actor: i32) -> Result<E::Model, BlogError>
where
    E: Owned,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let model = E::find()
        .filter(E::key().eq(id))
        .one(db)
        .await?
        .ok_or_else(|| BlogError::not_found(E::KIND, id))?;

    if E::owner_of(&model) != actor {
        tracing::debug!(kind = %E::KIND, id, actor, "ownership check failed");
        return Err(BlogError::Forbidden { kind: E::KIND, id });
    }
    Ok(model)
}

/// [`owned_by`] for callers that only know the kind at runtime.
///
/// Kinds without an owner (contacts and relation rows) are never mutable
/// through this check.
pub async fn ensure_owner<C>(
    db: &C,
    kind: EntityKind,
    id: i32,
    actor: i32,
) -> Result<(), BlogError>
where
    C: ConnectionTrait,
{
    match kind {
        EntityKind::Post => owned_by::<post::Entity, _>(db, id, actor).await.map(drop),
        EntityKind::Comment => owned_by::<comment::Entity, _>(db, id, actor).await.map(drop),
        EntityKind::Tag => owned_by::<tag::Entity, _>(db, id, actor).await.map(drop),
        EntityKind::Category => owned_by::<category::Entity, _>(db, id, actor)
            .await
            .map(drop),
        EntityKind::User => owned_by::<user::Entity, _>(db, id, actor).await.map(drop),
        EntityKind::Contact
        | EntityKind::PostLike
        | EntityKind::CommentLike
        | EntityKind::Follow => Err(BlogError::Forbidden { kind, id }),
    }
}
