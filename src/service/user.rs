use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{entity::user, ownership::owned_by, BlogError, EntityKind};

/// A new account. The password arrives already hashed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub avatar: Option<Option<String>>,
    pub bio: Option<Option<String>>,
}

/// What other users may see of an account
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PublicProfile {
    pub id: i32,
    pub username: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

impl From<user::Model> for PublicProfile {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            avatar: user.avatar,
            bio: user.bio,
        }
    }
}

#[derive(Debug)]
pub struct Users;

impl Users {
    /// Fails with [`BlogError::Conflict`] on a taken username or email.
    #[instrument(level = "debug", skip(db, input), fields(username = %input.username))]
    pub async fn create<C>(db: &C, input: NewUser) -> Result<user::Model, BlogError>
    where
        C: ConnectionTrait,
    {
        let user = user::ActiveModel {
            username: Set(input.username),
            email: Set(input.email),
            password_hash: Set(input.password_hash),
            avatar: Set(input.avatar),
            bio: Set(input.bio),
            ..Default::default()
        }
        .insert(db)
        .await?;
        tracing::info!(user_id = user.id, "user created");
        Ok(user)
    }

    pub async fn find_by_id<C>(db: &C, id: i32) -> Result<user::Model, BlogError>
    where
        C: ConnectionTrait,
    {
        user::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| BlogError::not_found(EntityKind::User, id))
    }

    pub async fn find_by_username<C>(db: &C, username: &str) -> Result<user::Model, BlogError>
    where
        C: ConnectionTrait,
    {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(db)
            .await?
            .ok_or_else(|| BlogError::NotFound {
                kind: EntityKind::User,
                key: username.to_owned(),
            })
    }

    pub async fn public_profile<C>(db: &C, id: i32) -> Result<PublicProfile, BlogError>
    where
        C: ConnectionTrait,
    {
        Self::find_by_id(db, id).await.map(PublicProfile::from)
    }

    /// Users may only edit their own profile.
    #[instrument(level = "debug", skip(db, input))]
    pub async fn update_profile<C>(
        db: &C,
        id: i32,
        actor: i32,
        input: ProfileUpdate,
    ) -> Result<user::Model, BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;
        let current = owned_by::<user::Entity, _>(&txn, id, actor).await?;

        let mut active: user::ActiveModel = current.clone().into();
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(avatar) = input.avatar {
            active.avatar = Set(avatar);
        }
        if let Some(bio) = input.bio {
            active.bio = Set(bio);
        }
        let updated = if active.is_changed() {
            active.update(&txn).await?
        } else {
            current
        };

        txn.commit().await?;
        Ok(updated)
    }

    /// Enables or disables an account. Disabled users fail authentication.
    /// Like profile edits, only the account holder may do this.
    #[instrument(level = "debug", skip(db))]
    pub async fn set_active<C>(
        db: &C,
        id: i32,
        actor: i32,
        active: bool,
    ) -> Result<user::Model, BlogError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;
        let current = owned_by::<user::Entity, _>(&txn, id, actor).await?;
        let updated = if current.is_active == active {
            current
        } else {
            let mut model: user::ActiveModel = current.into();
            model.is_active = Set(active);
            model.update(&txn).await?
        };
        txn.commit().await?;
        Ok(updated)
    }
}
