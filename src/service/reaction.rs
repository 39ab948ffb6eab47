//! One-per-pair relations between a user and a target row.
//!
//! Post likes, comment likes and follows all have the same shape: a join row
//! keyed by `(actor, target)`. [`Reactions`] implements add, remove, count and
//! the two directions of lookup once, over any [`Reaction`].

use std::marker::PhantomData;

use sea_orm::{
    entity::prelude::*, sea_query::Query, ActiveValue::Set, ConnectionTrait, IntoActiveModel,
    PaginatorTrait, QueryOrder, TransactionTrait,
};
use tracing::instrument;

use crate::{
    entity::{comment, comment_like, follow, post, post_like, user},
    BlogError, EntityKind,
};

/// Describes a join table holding `(actor, target)` pairs
pub trait Reaction {
    /// The join table
    type Join: EntityTrait;
    /// The table the relation points at
    type Target: EntityTrait;
    /// A new join row
    type Link: ActiveModelTrait<Entity = Self::Join> + Send + 'static;

    const KIND: EntityKind;
    const TARGET: EntityKind;

    fn actor_column() -> <Self::Join as EntityTrait>::Column;

    fn target_column() -> <Self::Join as EntityTrait>::Column;

    /// Primary key of the target table
    fn target_key() -> <Self::Target as EntityTrait>::Column;

    fn link(actor: i32, target: i32) -> Self::Link;

    /// Rejects pairs that may never exist.
    fn validate(_actor: i32, _target: i32) -> Result<(), BlogError> {
        Ok(())
    }
}

/// A user liking a post
#[derive(Debug)]
pub struct PostLikes;

impl Reaction for PostLikes {
    type Join = post_like::Entity;
    type Target = post::Entity;
    type Link = post_like::ActiveModel;

    const KIND: EntityKind = EntityKind::PostLike;
    const TARGET: EntityKind = EntityKind::Post;

    fn actor_column() -> post_like::Column {
        post_like::Column::UserId
    }

    fn target_column() -> post_like::Column {
        post_like::Column::PostId
    }

    fn target_key() -> post::Column {
        post::Column::Id
    }

    fn link(actor: i32, target: i32) -> post_like::ActiveModel {
        post_like::ActiveModel {
            user_id: Set(actor),
            post_id: Set(target),
            created_at: Set(chrono::Utc::now()),
        }
    }
}

/// A user liking a comment
#[derive(Debug)]
pub struct CommentLikes;

impl Reaction for CommentLikes {
    type Join = comment_like::Entity;
    type Target = comment::Entity;
    type Link = comment_like::ActiveModel;

    const KIND: EntityKind = EntityKind::CommentLike;
    const TARGET: EntityKind = EntityKind::Comment;

    fn actor_column() -> comment_like::Column {
        comment_like::Column::UserId
    }

    fn target_column() -> comment_like::Column {
        comment_like::Column::CommentId
    }

    fn target_key() -> comment::Column {
        comment::Column::Id
    }

    fn link(actor: i32, target: i32) -> comment_like::ActiveModel {
        comment_like::ActiveModel {
            user_id: Set(actor),
            comment_id: Set(target),
            created_at: Set(chrono::Utc::now()),
        }
    }
}

/// A user following another user
#[derive(Debug)]
pub struct Follows;

impl Reaction for Follows {
    type Join = follow::Entity;
    type Target = user::Entity;
    type Link = follow::ActiveModel;

    const KIND: EntityKind = EntityKind::Follow;
    const TARGET: EntityKind = EntityKind::User;

    fn actor_column() -> follow::Column {
        follow::Column::FollowerId
    }

    fn target_column() -> follow::Column {
        follow::Column::FollowingId
    }

    fn target_key() -> user::Column {
        user::Column::Id
    }

    fn link(actor: i32, target: i32) -> follow::ActiveModel {
        follow::ActiveModel {
            follower_id: Set(actor),
            following_id: Set(target),
            created_at: Set(chrono::Utc::now()),
        }
    }

    fn validate(actor: i32, target: i32) -> Result<(), BlogError> {
        if actor == target {
            return Err(BlogError::Conflict(format!("user {actor} cannot follow themself")));
        }
        Ok(())
    }
}

/// Operations over the join table described by `R`
#[derive(Debug)]
pub struct Reactions<R>(PhantomData<R>);

impl<R> Reactions<R>
where
    R: Reaction,
    <R::Join as EntityTrait>::Model: Sync,
    <R::Target as EntityTrait>::Model: Sync,
    <R::Join as EntityTrait>::Model: IntoActiveModel<R::Link>,
{
    /// Records that `actor` reacted to `target`.
    ///
    /// Fails with [`BlogError::NotFound`] if the target is absent and with
    /// [`BlogError::Conflict`] if the pair already exists, including when a
    /// concurrent insert of the same pair wins the race.
    #[instrument(level = "debug", skip(db), fields(kind = %R::KIND))]
    pub async fn add<C>(db: &C, actor: i32, target: i32) -> Result<(), BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        R::validate(actor, target)?;

        let txn = db.begin().await?;
        Self::require_target(&txn, target).await?;
        if Self::contains(&txn, actor, target).await? {
            return Err(Self::already_exists(actor, target));
        }

        R::Join::insert(R::link(actor, target))
            .exec_without_returning(&txn)
            .await
            .map_err(|err| match BlogError::from(err) {
                BlogError::Conflict(_) => Self::already_exists(actor, target),
                other => other,
            })?;
        txn.commit().await?;

        tracing::debug!("relation added");
        Ok(())
    }

    /// Removes the pair. Fails with [`BlogError::Conflict`] if it does not exist.
    #[instrument(level = "debug", skip(db), fields(kind = %R::KIND))]
    pub async fn remove<C>(db: &C, actor: i32, target: i32) -> Result<(), BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;
        Self::require_target(&txn, target).await?;

        let res = R::Join::delete_many()
            .filter(R::actor_column().eq(actor))
            .filter(R::target_column().eq(target))
            .exec(&txn)
            .await?;
        if res.rows_affected == 0 {
            return Err(BlogError::Conflict(format!(
                "no {} from user {actor} on {} {target}",
                R::KIND,
                R::TARGET
            )));
        }
        txn.commit().await?;

        tracing::debug!("relation removed");
        Ok(())
    }

    pub async fn contains<C>(db: &C, actor: i32, target: i32) -> Result<bool, BlogError>
    where
        C: ConnectionTrait,
    {
        let found = R::Join::find()
            .filter(R::actor_column().eq(actor))
            .filter(R::target_column().eq(target))
            .one(db)
            .await?;
        Ok(found.is_some())
    }

    /// Number of relations pointing at `target`
    pub async fn count<C>(db: &C, target: i32) -> Result<u64, BlogError>
    where
        C: ConnectionTrait,
    {
        Ok(R::Join::find()
            .filter(R::target_column().eq(target))
            .count(db)
            .await?)
    }

    /// Everything `actor` has reacted to, by target id
    pub async fn targets_of<C>(
        db: &C,
        actor: i32,
    ) -> Result<Vec<<R::Target as EntityTrait>::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        let targets = Query::select()
            .column(R::target_column())
            .from(R::Join::default())
            .and_where(R::actor_column().eq(actor))
            .to_owned();

        Ok(R::Target::find()
            .filter(R::target_key().in_subquery(targets))
            .order_by_asc(R::target_key())
            .all(db)
            .await?)
    }

    /// Users who reacted to `target`, by user id
    pub async fn actors_of<C>(db: &C, target: i32) -> Result<Vec<user::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        Self::require_target(db, target).await?;

        let actors = Query::select()
            .column(R::actor_column())
            .from(R::Join::default())
            .and_where(R::target_column().eq(target))
            .to_owned();

        Ok(user::Entity::find()
            .filter(user::Column::Id.in_subquery(actors))
            .order_by_asc(user::Column::Id)
            .all(db)
            .await?)
    }

    async fn require_target<C>(db: &C, target: i32) -> Result<(), BlogError>
    where
        C: ConnectionTrait,
    {
        R::Target::find()
            .filter(R::target_key().eq(target))
            .one(db)
            .await?
            .map(drop)
            .ok_or_else(|| BlogError::not_found(R::TARGET, target))
    }

    fn already_exists(actor: i32, target: i32) -> BlogError {
        BlogError::Conflict(format!(
            "{} from user {actor} on {} {target} already exists",
            R::KIND,
            R::TARGET
        ))
    }
}
