use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait, QueryOrder, TransactionTrait};
use tracing::instrument;

use crate::{
    entity::{post_tag, tag},
    ownership::owned_by,
    BlogError, EntityKind,
};

#[derive(Debug)]
pub struct Tags;

impl Tags {
    /// Fails with [`BlogError::Conflict`] if the name is taken.
    #[instrument(level = "debug", skip(db))]
    pub async fn create<C>(db: &C, owner: i32, name: &str) -> Result<tag::Model, BlogError>
    where
        C: ConnectionTrait,
    {
        Ok(tag::ActiveModel {
            name: Set(name.to_owned()),
            user_id: Set(owner),
            ..Default::default()
        }
        .insert(db)
        .await?)
    }

    pub async fn find_by_id<C>(db: &C, id: i32) -> Result<tag::Model, BlogError>
    where
        C: ConnectionTrait,
    {
        tag::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| BlogError::not_found(EntityKind::Tag, id))
    }

    pub async fn list_for_owner<C>(db: &C, user_id: i32) -> Result<Vec<tag::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        Ok(tag::Entity::find()
            .filter(tag::Column::UserId.eq(user_id))
            .order_by_asc(tag::Column::Name)
            .all(db)
            .await?)
    }

    pub async fn list_all<C>(db: &C) -> Result<Vec<tag::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        Ok(tag::Entity::find()
            .order_by_asc(tag::Column::Name)
            .all(db)
            .await?)
    }

    #[instrument(level = "debug", skip(db))]
    pub async fn rename<C>(
        db: &C,
        id: i32,
        actor: i32,
        name: &str,
    ) -> Result<tag::Model, BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;
        let current = owned_by::<tag::Entity, _>(&txn, id, actor).await?;
        if current.name == name {
            return Ok(current);
        }
        let mut active: tag::ActiveModel = current.into();
        active.name = Set(name.to_owned());
        let tag = active.update(&txn).await?;
        txn.commit().await?;
        Ok(tag)
    }

    /// Owner only. Posts keep existing but lose the tag.
    #[instrument(level = "debug", skip(db))]
    pub async fn delete<C>(db: &C, id: i32, actor: i32) -> Result<(), BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;
        owned_by::<tag::Entity, _>(&txn, id, actor).await?;

        let links = post_tag::Entity::delete_many()
            .filter(post_tag::Column::TagId.eq(id))
            .exec(&txn)
            .await?;
        tag::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        tracing::info!(tag_id = id, posts = links.rows_affected, "tag deleted");
        Ok(())
    }
}
