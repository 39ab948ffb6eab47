use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use sea_orm::{
    entity::prelude::*, sea_query::Expr, ActiveValue::Set, ConnectionTrait, QueryOrder,
    QuerySelect, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{
    image_position,
    thread::{build_forest, CommentNode},
};
use crate::{
    entity::{comment, comment_image, comment_like, post},
    ownership::owned_by,
    BlogError, EntityKind,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct NewComment {
    pub content: String,
    /// Reply target, on the same post
    pub parent_id: Option<i32>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CommentUpdate {
    pub content: Option<String>,
    /// Replaces the whole image list when present
    pub images: Option<Vec<String>>,
}

/// A comment as presented to readers
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: comment::Model,
    pub images: Vec<String>,
    pub like_count: u64,
}

#[derive(Debug)]
pub struct Comments;

impl Comments {
    /// Adds a comment to a post, optionally as a reply.
    ///
    /// The parent, when given, must be a comment on the same post.
    #[instrument(level = "debug", skip(db, input), fields(parent_id = ?input.parent_id))]
    pub async fn create<C>(
        db: &C,
        post_id: i32,
        author: i32,
        input: NewComment,
    ) -> Result<comment::Model, BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;

        post::Entity::find_by_id(post_id)
            .one(&txn)
            .await?
            .ok_or_else(|| BlogError::not_found(EntityKind::Post, post_id))?;

        if let Some(parent_id) = input.parent_id {
            let parent = comment::Entity::find_by_id(parent_id)
                .one(&txn)
                .await?
                .ok_or_else(|| BlogError::not_found(EntityKind::Comment, parent_id))?;
            if parent.post_id != post_id {
                return Err(BlogError::InvalidParent {
                    kind: EntityKind::Comment,
                    parent_id,
                    reason: format!("belongs to post {}, not post {post_id}", parent.post_id),
                });
            }
        }

        let comment = comment::ActiveModel {
            post_id: Set(post_id),
            user_id: Set(author),
            parent_id: Set(input.parent_id),
            content: Set(input.content),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        insert_images(&txn, comment.id, &input.images).await?;

        txn.commit().await?;
        tracing::info!(comment_id = comment.id, post_id, "comment created");
        Ok(comment)
    }

    pub async fn find_by_id<C>(db: &C, id: i32) -> Result<comment::Model, BlogError>
    where
        C: ConnectionTrait,
    {
        comment::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| BlogError::not_found(EntityKind::Comment, id))
    }

    /// The comment `id` replies to, if any
    pub async fn parent<C>(db: &C, id: i32) -> Result<Option<comment::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        let comment = Self::find_by_id(db, id).await?;
        Ok(comment.find_linked(comment::ParentLink).one(db).await?)
    }

    /// Comments without a parent, in insertion order
    pub async fn list_top_level<C>(db: &C, post_id: i32) -> Result<Vec<comment::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        require_post(db, post_id).await?;
        Ok(comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::ParentId.is_null())
            .order_by_asc(comment::Column::Id)
            .all(db)
            .await?)
    }

    /// Direct replies only; callers recurse for deeper levels.
    pub async fn list_replies<C>(db: &C, id: i32) -> Result<Vec<comment::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        Self::find_by_id(db, id).await?;
        Ok(comment::Entity::find()
            .filter(comment::Column::ParentId.eq(id))
            .order_by_asc(comment::Column::Id)
            .all(db)
            .await?)
    }

    /// Every comment on a post, flat
    pub async fn list_for_post<C>(db: &C, post_id: i32) -> Result<Vec<comment::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        require_post(db, post_id).await?;
        Ok(comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn list_for_user<C>(db: &C, user_id: i32) -> Result<Vec<comment::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        Ok(comment::Entity::find()
            .filter(comment::Column::UserId.eq(user_id))
            .order_by_asc(comment::Column::Id)
            .all(db)
            .await?)
    }

    /// The reply forest of a post
    pub async fn thread<C>(db: &C, post_id: i32) -> Result<Vec<CommentNode>, BlogError>
    where
        C: ConnectionTrait,
    {
        Ok(build_forest(Self::list_for_post(db, post_id).await?))
    }

    /// A single comment with all of its replies below it
    pub async fn subtree<C>(db: &C, id: i32) -> Result<CommentNode, BlogError>
    where
        C: ConnectionTrait,
    {
        Self::find_by_id(db, id).await?;
        let ids = descendant_ids(db, id).await?;
        let comments = comment::Entity::find()
            .filter(comment::Column::Id.is_in(ids))
            .all(db)
            .await?;

        build_forest(comments)
            .into_iter()
            .find(|node| node.comment.id == id)
            .ok_or_else(|| BlogError::not_found(EntityKind::Comment, id))
    }

    pub async fn view<C>(db: &C, id: i32) -> Result<CommentView, BlogError>
    where
        C: ConnectionTrait,
    {
        let comment = Self::find_by_id(db, id).await?;
        let mut views = Self::views(db, vec![comment]).await?;
        views
            .pop()
            .ok_or_else(|| BlogError::not_found(EntityKind::Comment, id))
    }

    /// Attaches images and like counts, two queries for the whole batch.
    pub async fn views<C>(
        db: &C,
        comments: Vec<comment::Model>,
    ) -> Result<Vec<CommentView>, BlogError>
    where
        C: ConnectionTrait,
    {
        if comments.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i32> = comments.iter().map(|c| c.id).collect();

        let mut images = comment_image::Entity::find()
            .filter(comment_image::Column::CommentId.is_in(ids.clone()))
            .order_by_asc(comment_image::Column::CommentId)
            .order_by_asc(comment_image::Column::Position)
            .all(db)
            .await?
            .into_iter()
            .into_group_map_by(|image| image.comment_id);

        let likes: HashMap<i32, i64> = comment_like::Entity::find()
            .select_only()
            .column(comment_like::Column::CommentId)
            .column_as(Expr::col(comment_like::Column::UserId).count(), "likes")
            .filter(comment_like::Column::CommentId.is_in(ids))
            .group_by(comment_like::Column::CommentId)
            .into_tuple::<(i32, i64)>()
            .all(db)
            .await?
            .into_iter()
            .collect();

        Ok(comments
            .into_iter()
            .map(|comment| CommentView {
                images: images
                    .remove(&comment.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|image| image.image_url)
                    .collect(),
                like_count: likes
                    .get(&comment.id)
                    .map(|&n| u64::try_from(n).unwrap_or_default())
                    .unwrap_or(0),
                comment,
            })
            .collect())
    }

    /// Edits a comment. Only its author may do so.
    ///
    /// `updated_at` moves only when the content actually changes.
    #[instrument(level = "debug", skip(db, input))]
    pub async fn update<C>(
        db: &C,
        id: i32,
        actor: i32,
        input: CommentUpdate,
    ) -> Result<comment::Model, BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;
        let current = owned_by::<comment::Entity, _>(&txn, id, actor).await?;

        let updated = match input.content {
            Some(content) if content != current.content => {
                let mut active: comment::ActiveModel = current.into();
                active.content = Set(content);
                active.update(&txn).await?
            }
            _ => current,
        };

        if let Some(images) = input.images {
            comment_image::Entity::delete_many()
                .filter(comment_image::Column::CommentId.eq(id))
                .exec(&txn)
                .await?;
            insert_images(&txn, id, &images).await?;
        }

        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes a comment and its whole reply subtree, with their images and
    /// likes. Returns the number of comments removed.
    #[instrument(level = "debug", skip(db))]
    pub async fn delete<C>(db: &C, id: i32, actor: i32) -> Result<u64, BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;
        owned_by::<comment::Entity, _>(&txn, id, actor).await?;

        let ids = descendant_ids(&txn, id).await?;
        let removed = purge(&txn, &ids).await?;

        txn.commit().await?;
        tracing::info!(comment_id = id, removed, "comment deleted");
        Ok(removed)
    }
}

async fn require_post<C>(db: &C, post_id: i32) -> Result<(), BlogError>
where
    C: ConnectionTrait,
{
    post::Entity::find_by_id(post_id)
        .one(db)
        .await?
        .map(drop)
        .ok_or_else(|| BlogError::not_found(EntityKind::Post, post_id))
}

async fn insert_images<C>(db: &C, comment_id: i32, urls: &[String]) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    if urls.is_empty() {
        return Ok(());
    }
    let now = chrono::Utc::now();
    let images = urls
        .iter()
        .enumerate()
        .map(|(index, url)| {
            Ok(comment_image::ActiveModel {
                comment_id: Set(comment_id),
                position: Set(image_position(index)?),
                image_url: Set(url.clone()),
                created_at: Set(now),
                ..Default::default()
            })
        })
        .collect::<Result<Vec<_>, DbErr>>()?;
    comment_image::Entity::insert_many(images).exec(db).await?;
    Ok(())
}

/// `root` and every comment below it, breadth first.
pub(crate) async fn descendant_ids<C>(db: &C, root: i32) -> Result<Vec<i32>, DbErr>
where
    C: ConnectionTrait,
{
    let mut seen = HashSet::from([root]);
    let mut ids = vec![root];
    let mut frontier = vec![root];

    while !frontier.is_empty() {
        let children: Vec<i32> = comment::Entity::find()
            .select_only()
            .column(comment::Column::Id)
            .filter(comment::Column::ParentId.is_in(frontier))
            .into_tuple()
            .all(db)
            .await?;
        frontier = children.into_iter().filter(|id| seen.insert(*id)).collect();
        ids.extend(&frontier);
    }
    Ok(ids)
}

/// Removes the given comments with their likes and images.
pub(crate) async fn purge<C>(db: &C, ids: &[i32]) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(0);
    }
    comment_like::Entity::delete_many()
        .filter(comment_like::Column::CommentId.is_in(ids.iter().copied()))
        .exec(db)
        .await?;
    comment_image::Entity::delete_many()
        .filter(comment_image::Column::CommentId.is_in(ids.iter().copied()))
        .exec(db)
        .await?;
    // rows_affected misses replies removed by the parent_id cascade on SQLite
    comment::Entity::delete_many()
        .filter(comment::Column::Id.is_in(ids.iter().copied()))
        .exec(db)
        .await?;
    Ok(ids.len() as u64)
}
