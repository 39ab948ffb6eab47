//! DDL for the blog tables.
//!
//! Statements are returned in dependency order so they can be applied one by one,
//! either directly through [`create_tables`] or from a migration.

use crate::entity::*;
use sea_orm::{
    sea_query::{
        self, ColumnDef, ForeignKey, ForeignKeyAction, Index, IndexCreateStatement, IntoIden,
        IntoTableRef, TableCreateStatement, TableDropStatement,
    },
    ConnectionTrait, DbErr, ExecResult,
};

async fn create_table<C>(db: &C, stmt: &TableCreateStatement) -> Result<ExecResult, DbErr>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    db.execute(builder.build(stmt)).await
}

async fn create_index<C>(db: &C, stmt: &IndexCreateStatement) -> Result<ExecResult, DbErr>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    db.execute(builder.build(stmt)).await
}

/// Creates every table and secondary index, skipping the ones that already exist.
pub async fn create_tables<C>(db: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    for stmt in table_statements() {
        create_table(db, &stmt).await?;
    }
    for stmt in index_statements() {
        create_index(db, &stmt).await?;
    }
    Ok(())
}

pub fn table_statements() -> Vec<TableCreateStatement> {
    vec![
        user_table(),
        category_table(),
        tag_table(),
        post_table(),
        post_tag_table(),
        post_image_table(),
        post_like_table(),
        comment_table(),
        comment_image_table(),
        comment_like_table(),
        follow_table(),
        contact_table(),
    ]
}

/// Drop statements, children before parents.
pub fn drop_statements() -> Vec<TableDropStatement> {
    vec![
        drop_table(contact::Entity),
        drop_table(follow::Entity),
        drop_table(comment_like::Entity),
        drop_table(comment_image::Entity),
        drop_table(comment::Entity),
        drop_table(post_like::Entity),
        drop_table(post_image::Entity),
        drop_table(post_tag::Entity),
        drop_table(post::Entity),
        drop_table(tag::Entity),
        drop_table(category::Entity),
        drop_table(user::Entity),
    ]
}

fn drop_table<T: IntoTableRef>(table: T) -> TableDropStatement {
    sea_query::Table::drop().table(table).if_exists().to_owned()
}

pub fn index_statements() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("idx-post-user_id")
            .table(post::Entity)
            .col(post::Column::UserId)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx-comment-post_id")
            .table(comment::Entity)
            .col(comment::Column::PostId)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx-comment-parent_id")
            .table(comment::Entity)
            .col(comment::Column::ParentId)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx-category-parent_id")
            .table(category::Entity)
            .col(category::Column::ParentId)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx-contact-email")
            .table(contact::Entity)
            .col(contact::Column::Email)
            .if_not_exists()
            .to_owned(),
    ]
}

fn id_column<C: IntoIden>(column: C) -> ColumnDef {
    ColumnDef::new(column)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn cascade(name: &str) -> sea_query::ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .on_delete(ForeignKeyAction::Cascade)
        .on_update(ForeignKeyAction::Cascade)
        .to_owned()
}

fn set_null(name: &str) -> sea_query::ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .on_delete(ForeignKeyAction::SetNull)
        .on_update(ForeignKeyAction::Cascade)
        .to_owned()
}

fn user_table() -> TableCreateStatement {
    sea_query::Table::create()
        .table(user::Entity)
        .if_not_exists()
        .col(&mut id_column(user::Column::Id))
        .col(
            ColumnDef::new(user::Column::Username)
                .string()
                .not_null()
                .unique_key(),
        )
        .col(
            ColumnDef::new(user::Column::Email)
                .string()
                .not_null()
                .unique_key(),
        )
        .col(
            ColumnDef::new(user::Column::PasswordHash)
                .string()
                .not_null(),
        )
        .col(
            ColumnDef::new(user::Column::IsActive)
                .boolean()
                .not_null()
                .default(true),
        )
        .col(ColumnDef::new(user::Column::Avatar).string())
        .col(ColumnDef::new(user::Column::Bio).string())
        .col(
            ColumnDef::new(user::Column::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(
            ColumnDef::new(user::Column::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .to_owned()
}

fn category_table() -> TableCreateStatement {
    sea_query::Table::create()
        .table(category::Entity)
        .if_not_exists()
        .col(&mut id_column(category::Column::Id))
        .col(
            ColumnDef::new(category::Column::Name)
                .string()
                .not_null()
                .unique_key(),
        )
        .col(ColumnDef::new(category::Column::ParentId).integer())
        .col(ColumnDef::new(category::Column::UserId).integer().not_null())
        .col(ColumnDef::new(category::Column::Description).string())
        .col(
            ColumnDef::new(category::Column::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(
            ColumnDef::new(category::Column::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .foreign_key(
            set_null("fk-category-parent_id")
                .from(category::Entity, category::Column::ParentId)
                .to(category::Entity, category::Column::Id),
        )
        .foreign_key(
            cascade("fk-category-user_id")
                .from(category::Entity, category::Column::UserId)
                .to(user::Entity, user::Column::Id),
        )
        .to_owned()
}

fn tag_table() -> TableCreateStatement {
    sea_query::Table::create()
        .table(tag::Entity)
        .if_not_exists()
        .col(&mut id_column(tag::Column::Id))
        .col(
            ColumnDef::new(tag::Column::Name)
                .string()
                .not_null()
                .unique_key(),
        )
        .col(ColumnDef::new(tag::Column::UserId).integer().not_null())
        .foreign_key(
            cascade("fk-tag-user_id")
                .from(tag::Entity, tag::Column::UserId)
                .to(user::Entity, user::Column::Id),
        )
        .to_owned()
}

fn post_table() -> TableCreateStatement {
    sea_query::Table::create()
        .table(post::Entity)
        .if_not_exists()
        .col(&mut id_column(post::Column::Id))
        .col(ColumnDef::new(post::Column::Title).string().not_null())
        .col(ColumnDef::new(post::Column::Content).text().not_null())
        .col(ColumnDef::new(post::Column::CategoryId).integer())
        .col(ColumnDef::new(post::Column::UserId).integer().not_null())
        .col(
            ColumnDef::new(post::Column::IsPublished)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(ColumnDef::new(post::Column::PublishedAt).timestamp_with_time_zone())
        .col(ColumnDef::new(post::Column::Slug).string().unique_key())
        .col(
            ColumnDef::new(post::Column::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(
            ColumnDef::new(post::Column::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .foreign_key(
            cascade("fk-post-user_id")
                .from(post::Entity, post::Column::UserId)
                .to(user::Entity, user::Column::Id),
        )
        .foreign_key(
            set_null("fk-post-category_id")
                .from(post::Entity, post::Column::CategoryId)
                .to(category::Entity, category::Column::Id),
        )
        .to_owned()
}

fn post_tag_table() -> TableCreateStatement {
    sea_query::Table::create()
        .table(post_tag::Entity)
        .if_not_exists()
        .col(ColumnDef::new(post_tag::Column::PostId).integer().not_null())
        .col(ColumnDef::new(post_tag::Column::TagId).integer().not_null())
        .primary_key(
            Index::create()
                .name("pk-post_tag")
                .col(post_tag::Column::PostId)
                .col(post_tag::Column::TagId),
        )
        .foreign_key(
            cascade("fk-post_tag-post_id")
                .from(post_tag::Entity, post_tag::Column::PostId)
                .to(post::Entity, post::Column::Id),
        )
        .foreign_key(
            cascade("fk-post_tag-tag_id")
                .from(post_tag::Entity, post_tag::Column::TagId)
                .to(tag::Entity, tag::Column::Id),
        )
        .to_owned()
}

fn post_image_table() -> TableCreateStatement {
    sea_query::Table::create()
        .table(post_image::Entity)
        .if_not_exists()
        .col(&mut id_column(post_image::Column::Id))
        .col(ColumnDef::new(post_image::Column::PostId).integer().not_null())
        .col(
            ColumnDef::new(post_image::Column::Position)
                .integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(post_image::Column::ImageUrl)
                .string()
                .not_null(),
        )
        .col(
            ColumnDef::new(post_image::Column::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .foreign_key(
            cascade("fk-post_image-post_id")
                .from(post_image::Entity, post_image::Column::PostId)
                .to(post::Entity, post::Column::Id),
        )
        .to_owned()
}

fn post_like_table() -> TableCreateStatement {
    sea_query::Table::create()
        .table(post_like::Entity)
        .if_not_exists()
        .col(ColumnDef::new(post_like::Column::UserId).integer().not_null())
        .col(ColumnDef::new(post_like::Column::PostId).integer().not_null())
        .col(
            ColumnDef::new(post_like::Column::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .primary_key(
            Index::create()
                .name("pk-post_like")
                .col(post_like::Column::UserId)
                .col(post_like::Column::PostId),
        )
        .foreign_key(
            cascade("fk-post_like-user_id")
                .from(post_like::Entity, post_like::Column::UserId)
                .to(user::Entity, user::Column::Id),
        )
        .foreign_key(
            cascade("fk-post_like-post_id")
                .from(post_like::Entity, post_like::Column::PostId)
                .to(post::Entity, post::Column::Id),
        )
        .to_owned()
}

fn comment_table() -> TableCreateStatement {
    sea_query::Table::create()
        .table(comment::Entity)
        .if_not_exists()
        .col(&mut id_column(comment::Column::Id))
        .col(ColumnDef::new(comment::Column::PostId).integer().not_null())
        .col(ColumnDef::new(comment::Column::UserId).integer().not_null())
        .col(ColumnDef::new(comment::Column::ParentId).integer())
        .col(ColumnDef::new(comment::Column::Content).text().not_null())
        .col(
            ColumnDef::new(comment::Column::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(
            ColumnDef::new(comment::Column::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .foreign_key(
            cascade("fk-comment-post_id")
                .from(comment::Entity, comment::Column::PostId)
                .to(post::Entity, post::Column::Id),
        )
        .foreign_key(
            cascade("fk-comment-user_id")
                .from(comment::Entity, comment::Column::UserId)
                .to(user::Entity, user::Column::Id),
        )
        .foreign_key(
            cascade("fk-comment-parent_id")
                .from(comment::Entity, comment::Column::ParentId)
                .to(comment::Entity, comment::Column::Id),
        )
        .to_owned()
}

fn comment_image_table() -> TableCreateStatement {
    sea_query::Table::create()
        .table(comment_image::Entity)
        .if_not_exists()
        .col(&mut id_column(comment_image::Column::Id))
        .col(
            ColumnDef::new(comment_image::Column::CommentId)
                .integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(comment_image::Column::Position)
                .integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(comment_image::Column::ImageUrl)
                .string()
                .not_null(),
        )
        .col(
            ColumnDef::new(comment_image::Column::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .foreign_key(
            cascade("fk-comment_image-comment_id")
                .from(comment_image::Entity, comment_image::Column::CommentId)
                .to(comment::Entity, comment::Column::Id),
        )
        .to_owned()
}

fn comment_like_table() -> TableCreateStatement {
    sea_query::Table::create()
        .table(comment_like::Entity)
        .if_not_exists()
        .col(
            ColumnDef::new(comment_like::Column::UserId)
                .integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(comment_like::Column::CommentId)
                .integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(comment_like::Column::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .primary_key(
            Index::create()
                .name("pk-comment_like")
                .col(comment_like::Column::UserId)
                .col(comment_like::Column::CommentId),
        )
        .foreign_key(
            cascade("fk-comment_like-user_id")
                .from(comment_like::Entity, comment_like::Column::UserId)
                .to(user::Entity, user::Column::Id),
        )
        .foreign_key(
            cascade("fk-comment_like-comment_id")
                .from(comment_like::Entity, comment_like::Column::CommentId)
                .to(comment::Entity, comment::Column::Id),
        )
        .to_owned()
}

fn follow_table() -> TableCreateStatement {
    sea_query::Table::create()
        .table(follow::Entity)
        .if_not_exists()
        .col(
            ColumnDef::new(follow::Column::FollowerId)
                .integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(follow::Column::FollowingId)
                .integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(follow::Column::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .primary_key(
            Index::create()
                .name("pk-follow")
                .col(follow::Column::FollowerId)
                .col(follow::Column::FollowingId),
        )
        .foreign_key(
            cascade("fk-follow-follower_id")
                .from(follow::Entity, follow::Column::FollowerId)
                .to(user::Entity, user::Column::Id),
        )
        .foreign_key(
            cascade("fk-follow-following_id")
                .from(follow::Entity, follow::Column::FollowingId)
                .to(user::Entity, user::Column::Id),
        )
        .to_owned()
}

fn contact_table() -> TableCreateStatement {
    sea_query::Table::create()
        .table(contact::Entity)
        .if_not_exists()
        .col(&mut id_column(contact::Column::Id))
        .col(ColumnDef::new(contact::Column::Name).string().not_null())
        .col(ColumnDef::new(contact::Column::Email).string().not_null())
        .col(ColumnDef::new(contact::Column::Message).text().not_null())
        .col(
            ColumnDef::new(contact::Column::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(
            ColumnDef::new(contact::Column::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .to_owned()
}
