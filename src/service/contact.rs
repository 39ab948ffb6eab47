use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait, QueryOrder};
use serde::Deserialize;
use tracing::instrument;

use crate::{entity::contact, BlogError, EntityKind};

/// A message left through the contact form
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug)]
pub struct Contacts;

impl Contacts {
    #[instrument(level = "debug", skip(db, form), fields(email = %form.email))]
    pub async fn submit<C>(db: &C, form: ContactForm) -> Result<contact::Model, BlogError>
    where
        C: ConnectionTrait,
    {
        let contact = contact::ActiveModel {
            name: Set(form.name),
            email: Set(form.email),
            message: Set(form.message),
            ..Default::default()
        }
        .insert(db)
        .await?;
        tracing::info!(contact_id = contact.id, "contact message received");
        Ok(contact)
    }

    pub async fn find_by_id<C>(db: &C, id: i32) -> Result<contact::Model, BlogError>
    where
        C: ConnectionTrait,
    {
        contact::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| BlogError::not_found(EntityKind::Contact, id))
    }

    /// Newest first
    pub async fn list_all<C>(db: &C) -> Result<Vec<contact::Model>, BlogError>
    where
        C: ConnectionTrait,
    {
        Ok(contact::Entity::find()
            .order_by_desc(contact::Column::Id)
            .all(db)
            .await?)
    }
}
