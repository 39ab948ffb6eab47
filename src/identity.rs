//! Resolving callers to users.
//!
//! Credential issuing and validation live outside this crate. An
//! [`IdentityProvider`] turns whatever the transport carries into a user id;
//! [`authenticate`] then makes sure that user exists and is active.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, EntityTrait};

use crate::{entity::user, BlogError};

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Maps a credential to a user id, or fails with [`BlogError::Unauthorized`].
    async fn resolve(&self, credential: &str) -> Result<i32, BlogError>;
}

/// A fixed token table
#[derive(Debug, Default, Clone)]
pub struct StaticIdentity {
    tokens: HashMap<String, i32>,
}

impl StaticIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, user_id: i32) -> Self {
        self.insert(token, user_id);
        self
    }

    pub fn insert(&mut self, token: impl Into<String>, user_id: i32) {
        self.tokens.insert(token.into(), user_id);
    }

    pub fn revoke(&mut self, token: &str) -> bool {
        self.tokens.remove(token).is_some()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn resolve(&self, credential: &str) -> Result<i32, BlogError> {
        self.tokens
            .get(credential)
            .copied()
            .ok_or(BlogError::Unauthorized)
    }
}

/// Resolves a credential and loads the active user behind it.
pub async fn authenticate<P, C>(
    provider: &P,
    db: &C,
    credential: Option<&str>,
) -> Result<user::Model, BlogError>
where
    P: IdentityProvider + ?Sized,
    C: ConnectionTrait,
{
    let credential = credential.ok_or(BlogError::Unauthorized)?;
    let user_id = provider.resolve(credential).await?;
    match user::Entity::find_by_id(user_id).one(db).await? {
        Some(user) if user.is_active => Ok(user),
        Some(_) => {
            tracing::warn!(user_id, "inactive user presented a valid credential");
            Err(BlogError::Unauthorized)
        }
        None => Err(BlogError::Unauthorized),
    }
}
