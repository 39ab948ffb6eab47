use std::collections::BTreeSet;

use sea_orm::{
    entity::prelude::*, ActiveValue::Set, ConnectionTrait, QueryOrder, QuerySelect,
    TransactionTrait,
};
use tracing::instrument;

use crate::{
    entity::{post, post_tag, tag},
    BlogError, EntityKind,
};

#[derive(Debug)]
pub struct PostTags;

impl PostTags {
    /// Makes `tag_ids` the exact tag set of a post.
    ///
    /// Every id must exist, otherwise nothing changes and the error lists the
    /// missing ones. Duplicates are collapsed. The join carries no owner;
    /// [`Posts::update`](super::Posts::update) is the owner-checked way in.
    #[instrument(level = "debug", skip(db))]
    pub async fn set<C>(
        db: &C,
        post_id: i32,
        tag_ids: &[i32],
    ) -> Result<Vec<tag::Model>, BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;
        post::Entity::find_by_id(post_id)
            .one(&txn)
            .await?
            .ok_or_else(|| BlogError::not_found(EntityKind::Post, post_id))?;
        replace(&txn, post_id, tag_ids).await?;
        let tags = Self::tags_for_post(&txn, post_id).await?;
        txn.commit().await?;
        Ok(tags)
    }

    pub async fn tags_for_post<C>(db: &C, post_id: i32) -> Result<Vec<tag::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        let post = post::Entity::find_by_id(post_id)
            .one(db)
            .await?
            .ok_or_else(|| BlogError::not_found(EntityKind::Post, post_id))?;
        Ok(post
            .find_related(tag::Entity)
            .order_by_asc(tag::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn posts_for_tag<C>(db: &C, tag_id: i32) -> Result<Vec<post::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        let tag = tag::Entity::find_by_id(tag_id)
            .one(db)
            .await?
            .ok_or_else(|| BlogError::not_found(EntityKind::Tag, tag_id))?;
        Ok(tag
            .find_related(post::Entity)
            .order_by_asc(post::Column::Id)
            .all(db)
            .await?)
    }
}

/// Diffs the stored tag set of `post_id` against `tag_ids` and applies the
/// difference. Callers own the transaction and the ownership check.
pub(crate) async fn replace<C>(db: &C, post_id: i32, tag_ids: &[i32]) -> Result<(), BlogError>
where
    C: ConnectionTrait,
{
    let wanted: BTreeSet<i32> = tag_ids.iter().copied().collect();

    if !wanted.is_empty() {
        let found: BTreeSet<i32> = tag::Entity::find()
            .select_only()
            .column(tag::Column::Id)
            .filter(tag::Column::Id.is_in(wanted.iter().copied()))
            .into_tuple::<i32>()
            .all(db)
            .await?
            .into_iter()
            .collect();
        let missing: Vec<i32> = wanted.difference(&found).copied().collect();
        if !missing.is_empty() {
            return Err(BlogError::not_found_many(EntityKind::Tag, missing));
        }
    }

    let current: BTreeSet<i32> = post_tag::Entity::find()
        .select_only()
        .column(post_tag::Column::TagId)
        .filter(post_tag::Column::PostId.eq(post_id))
        .into_tuple::<i32>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let removed: Vec<i32> = current.difference(&wanted).copied().collect();
    let added: Vec<i32> = wanted.difference(&current).copied().collect();

    if !removed.is_empty() {
        post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .filter(post_tag::Column::TagId.is_in(removed.iter().copied()))
            .exec(db)
            .await?;
    }
    if !added.is_empty() {
        post_tag::Entity::insert_many(added.iter().map(|&tag_id| post_tag::ActiveModel {
            post_id: Set(post_id),
            tag_id: Set(tag_id),
        }))
        .exec_without_returning(db)
        .await?;
    }

    tracing::debug!(post_id, ?added, ?removed, "post tags replaced");
    Ok(())
}
