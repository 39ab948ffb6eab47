use std::collections::HashSet;

use sea_orm::{
    entity::prelude::*, sea_query::Expr, ActiveValue::Set, ConnectionTrait, QueryOrder,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    entity::{category, post},
    ownership::owned_by,
    BlogError, EntityKind,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub parent_id: Option<i32>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    /// `Some(None)` makes the category a root
    pub parent_id: Option<Option<i32>>,
    pub description: Option<Option<String>>,
}

#[derive(Debug)]
pub struct Categories;

impl Categories {
    #[instrument(level = "debug", skip(db, input), fields(name = %input.name))]
    pub async fn create<C>(
        db: &C,
        owner: i32,
        input: NewCategory,
    ) -> Result<category::Model, BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;
        if let Some(parent_id) = input.parent_id {
            Self::find_by_id(&txn, parent_id).await?;
        }
        let category = category::ActiveModel {
            name: Set(input.name),
            parent_id: Set(input.parent_id),
            user_id: Set(owner),
            description: Set(input.description),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;
        Ok(category)
    }

    pub async fn find_by_id<C>(db: &C, id: i32) -> Result<category::Model, BlogError>
    where
        C: ConnectionTrait,
    {
        category::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| BlogError::not_found(EntityKind::Category, id))
    }

    pub async fn list_for_owner<C>(
        db: &C,
        user_id: i32,
    ) -> Result<Vec<category::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        Ok(category::Entity::find()
            .filter(category::Column::UserId.eq(user_id))
            .order_by_asc(category::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn list_all<C>(db: &C) -> Result<Vec<category::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        Ok(category::Entity::find()
            .order_by_asc(category::Column::Id)
            .all(db)
            .await?)
    }

    /// Direct children
    pub async fn children<C>(db: &C, id: i32) -> Result<Vec<category::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        Self::find_by_id(db, id).await?;
        Ok(category::Entity::find()
            .filter(category::Column::ParentId.eq(id))
            .order_by_asc(category::Column::Id)
            .all(db)
            .await?)
    }

    /// Parent, grandparent and so on up to the root.
    pub async fn ancestors<C>(db: &C, id: i32) -> Result<Vec<category::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        let mut current = Self::find_by_id(db, id).await?;
        let mut seen = HashSet::from([current.id]);
        let mut ancestors = Vec::new();

        while let Some(parent) = current.find_linked(category::ParentLink).one(db).await? {
            if !seen.insert(parent.id) {
                tracing::warn!(category_id = id, parent_id = parent.id, "category cycle");
                break;
            }
            ancestors.push(parent.clone());
            current = parent;
        }
        Ok(ancestors)
    }

    /// Owner only. Re-parenting under the category itself or one of its
    /// descendants fails with [`BlogError::InvalidParent`].
    #[instrument(level = "debug", skip(db, input))]
    pub async fn update<C>(
        db: &C,
        id: i32,
        actor: i32,
        input: CategoryUpdate,
    ) -> Result<category::Model, BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;
        let current = owned_by::<category::Entity, _>(&txn, id, actor).await?;

        if let Some(Some(parent_id)) = input.parent_id {
            if parent_id == id {
                return Err(BlogError::InvalidParent {
                    kind: EntityKind::Category,
                    parent_id,
                    reason: "a category cannot be its own parent".to_owned(),
                });
            }
            let ancestors = Self::ancestors(&txn, parent_id).await?;
            if ancestors.iter().any(|c| c.id == id) {
                return Err(BlogError::InvalidParent {
                    kind: EntityKind::Category,
                    parent_id,
                    reason: format!("category {parent_id} is below category {id}"),
                });
            }
        }

        let mut active: category::ActiveModel = current.clone().into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(parent_id) = input.parent_id {
            active.parent_id = Set(parent_id);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        let updated = if active.is_changed() {
            active.update(&txn).await?
        } else {
            current
        };

        txn.commit().await?;
        Ok(updated)
    }

    /// Owner only. Child categories become roots and posts lose their
    /// category; neither is deleted.
    #[instrument(level = "debug", skip(db))]
    pub async fn delete<C>(db: &C, id: i32, actor: i32) -> Result<(), BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;
        owned_by::<category::Entity, _>(&txn, id, actor).await?;

        let children = category::Entity::update_many()
            .col_expr(category::Column::ParentId, Expr::value(Option::<i32>::None))
            .filter(category::Column::ParentId.eq(id))
            .exec(&txn)
            .await?;
        let posts = post::Entity::update_many()
            .col_expr(post::Column::CategoryId, Expr::value(Option::<i32>::None))
            .filter(post::Column::CategoryId.eq(id))
            .exec(&txn)
            .await?;
        category::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        tracing::info!(
            category_id = id,
            children = children.rows_affected,
            posts = posts.rows_affected,
            "category deleted"
        );
        Ok(())
    }
}
