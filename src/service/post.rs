use std::collections::HashMap;

use itertools::Itertools;
use sea_orm::{
    entity::prelude::*, sea_query::Expr, ActiveValue::Set, ConnectionTrait, QueryOrder,
    QuerySelect, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{comment as comments, image_position, post_tags};
use crate::{
    entity::{category, comment, post, post_image, post_like, post_tag, tag},
    ownership::owned_by,
    BlogError, EntityKind,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category_id: Option<i32>,
    pub slug: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<i32>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Every field is optional; `None` leaves it as it is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    /// `Some(None)` detaches the post from its category
    pub category_id: Option<Option<i32>>,
    pub slug: Option<Option<String>>,
    pub tag_ids: Option<Vec<i32>>,
    pub images: Option<Vec<String>>,
}

/// A post with everything a reader sees next to it
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: post::Model,
    pub tags: Vec<String>,
    pub images: Vec<String>,
    pub like_count: u64,
}

#[derive(Debug)]
pub struct Posts;

impl Posts {
    #[instrument(level = "debug", skip(db, input), fields(title = %input.title))]
    pub async fn create<C>(db: &C, author: i32, input: NewPost) -> Result<post::Model, BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;
        if let Some(category_id) = input.category_id {
            require_category(&txn, category_id).await?;
        }

        let post = post::ActiveModel {
            title: Set(input.title),
            content: Set(input.content),
            category_id: Set(input.category_id),
            user_id: Set(author),
            slug: Set(input.slug),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        post_tags::replace(&txn, post.id, &input.tag_ids).await?;
        insert_images(&txn, post.id, &input.images).await?;

        txn.commit().await?;
        tracing::info!(post_id = post.id, author, "post created");
        Ok(post)
    }

    pub async fn find_by_id<C>(db: &C, id: i32) -> Result<post::Model, BlogError>
    where
        C: ConnectionTrait,
    {
        post::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| BlogError::not_found(EntityKind::Post, id))
    }

    pub async fn find_by_slug<C>(db: &C, slug: &str) -> Result<post::Model, BlogError>
    where
        C: ConnectionTrait,
    {
        post::Entity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(db)
            .await?
            .ok_or_else(|| BlogError::NotFound {
                kind: EntityKind::Post,
                key: slug.to_owned(),
            })
    }

    pub async fn list_for_owner<C>(db: &C, user_id: i32) -> Result<Vec<post::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        Ok(post::Entity::find()
            .filter(post::Column::UserId.eq(user_id))
            .order_by_asc(post::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn list_all<C>(db: &C) -> Result<Vec<post::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        Ok(post::Entity::find()
            .order_by_asc(post::Column::Id)
            .all(db)
            .await?)
    }

    /// Published posts, newest publication first
    pub async fn list_published<C>(db: &C) -> Result<Vec<post::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        Ok(post::Entity::find()
            .filter(post::Column::IsPublished.eq(true))
            .order_by_desc(post::Column::PublishedAt)
            .order_by_desc(post::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn list_for_category<C>(
        db: &C,
        category_id: i32,
    ) -> Result<Vec<post::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        require_category(db, category_id).await?;
        Ok(post::Entity::find()
            .filter(post::Column::CategoryId.eq(category_id))
            .order_by_asc(post::Column::Id)
            .all(db)
            .await?)
    }

    #[instrument(level = "debug", skip(db, input))]
    pub async fn update<C>(
        db: &C,
        id: i32,
        actor: i32,
        input: PostUpdate,
    ) -> Result<post::Model, BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;
        let current = owned_by::<post::Entity, _>(&txn, id, actor).await?;

        if let Some(Some(category_id)) = input.category_id {
            require_category(&txn, category_id).await?;
        }

        let mut active: post::ActiveModel = current.clone().into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(slug) = input.slug {
            active.slug = Set(slug);
        }
        let updated = if active.is_changed() {
            active.update(&txn).await?
        } else {
            current
        };

        if let Some(tag_ids) = input.tag_ids {
            post_tags::replace(&txn, id, &tag_ids).await?;
        }
        if let Some(images) = input.images {
            post_image::Entity::delete_many()
                .filter(post_image::Column::PostId.eq(id))
                .exec(&txn)
                .await?;
            insert_images(&txn, id, &images).await?;
        }

        txn.commit().await?;
        Ok(updated)
    }

    /// Marks the post published and stamps `published_at`.
    pub async fn publish<C>(db: &C, id: i32, actor: i32) -> Result<post::Model, BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        Self::set_published(db, id, actor, true).await
    }

    /// Reverts to draft and clears `published_at`.
    pub async fn unpublish<C>(db: &C, id: i32, actor: i32) -> Result<post::Model, BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        Self::set_published(db, id, actor, false).await
    }

    #[instrument(level = "debug", skip(db))]
    async fn set_published<C>(
        db: &C,
        id: i32,
        actor: i32,
        published: bool,
    ) -> Result<post::Model, BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;
        let mut active: post::ActiveModel = owned_by::<post::Entity, _>(&txn, id, actor)
            .await?
            .into();
        active.is_published = Set(published);
        active.published_at = Set(published.then(chrono::Utc::now));
        let post = active.update(&txn).await?;
        txn.commit().await?;
        Ok(post)
    }

    /// Deletes a post along with its comments, images, likes and tag links.
    #[instrument(level = "debug", skip(db))]
    pub async fn delete<C>(db: &C, id: i32, actor: i32) -> Result<(), BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;
        owned_by::<post::Entity, _>(&txn, id, actor).await?;

        let comment_ids: Vec<i32> = comment::Entity::find()
            .select_only()
            .column(comment::Column::Id)
            .filter(comment::Column::PostId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;
        let comments_removed = comments::purge(&txn, &comment_ids).await?;

        post_like::Entity::delete_many()
            .filter(post_like::Column::PostId.eq(id))
            .exec(&txn)
            .await?;
        post_image::Entity::delete_many()
            .filter(post_image::Column::PostId.eq(id))
            .exec(&txn)
            .await?;
        post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(id))
            .exec(&txn)
            .await?;
        post::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        tracing::info!(post_id = id, comments_removed, "post deleted");
        Ok(())
    }

    pub async fn view<C>(db: &C, id: i32) -> Result<PostView, BlogError>
    where
        C: ConnectionTrait,
    {
        let post = Self::find_by_id(db, id).await?;
        Self::views(db, vec![post])
            .await?
            .pop()
            .ok_or_else(|| BlogError::not_found(EntityKind::Post, id))
    }

    /// Attaches tag names, images and like counts in three queries for the
    /// whole batch, keeping the input order.
    pub async fn views<C>(db: &C, posts: Vec<post::Model>) -> Result<Vec<PostView>, BlogError>
    where
        C: ConnectionTrait,
    {
        if posts.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i32> = posts.iter().map(|p| p.id).collect();

        let mut tags = post_tag::Entity::find()
            .find_also_related(tag::Entity)
            .filter(post_tag::Column::PostId.is_in(ids.clone()))
            .order_by_asc(post_tag::Column::PostId)
            .order_by_asc(post_tag::Column::TagId)
            .all(db)
            .await?
            .into_iter()
            .filter_map(|(link, tag)| tag.map(|tag| (link.post_id, tag.name)))
            .into_group_map();

        let mut images = post_image::Entity::find()
            .filter(post_image::Column::PostId.is_in(ids.clone()))
            .order_by_asc(post_image::Column::PostId)
            .order_by_asc(post_image::Column::Position)
            .all(db)
            .await?
            .into_iter()
            .map(|image| (image.post_id, image.image_url))
            .into_group_map();

        let likes: HashMap<i32, i64> = post_like::Entity::find()
            .select_only()
            .column(post_like::Column::PostId)
            .column_as(Expr::col(post_like::Column::UserId).count(), "likes")
            .filter(post_like::Column::PostId.is_in(ids))
            .group_by(post_like::Column::PostId)
            .into_tuple::<(i32, i64)>()
            .all(db)
            .await?
            .into_iter()
            .collect();

        Ok(posts
            .into_iter()
            .map(|post| PostView {
                tags: tags.remove(&post.id).unwrap_or_default(),
                images: images.remove(&post.id).unwrap_or_default(),
                like_count: likes
                    .get(&post.id)
                    .map(|&n| u64::try_from(n).unwrap_or_default())
                    .unwrap_or(0),
                post,
            })
            .collect())
    }
}

async fn require_category<C>(db: &C, category_id: i32) -> Result<(), BlogError>
where
    C: ConnectionTrait,
{
    category::Entity::find_by_id(category_id)
        .one(db)
        .await?
        .map(drop)
        .ok_or_else(|| BlogError::not_found(EntityKind::Category, category_id))
}

async fn insert_images<C>(db: &C, post_id: i32, urls: &[String]) -> Result<(), DbErr>
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
            Ok(post_image::ActiveModel {
                post_id: Set(post_id),
                position: Set(image_position(index)?),
                image_url: Set(url.clone()),
                created_at: Set(now),
                ..Default::default()
            })
        })
        .collect::<Result<Vec<_>, DbErr>>()?;
    post_image::Entity::insert_many(images).exec(db).await?;
    Ok(())
}
