use sea_blog::schema;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for stmt in schema::table_statements() {
            manager.create_table(stmt).await?;
        }
        for stmt in schema::index_statements() {
            manager.create_index(stmt).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for stmt in schema::drop_statements() {
            manager.drop_table(stmt).await?;
        }
        Ok(())
    }
}
