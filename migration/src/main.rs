use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    // DATABASE_URL may come from a local .env
    dotenvy::dotenv().ok();

    cli::run_cli(migration::Migrator).await;
}
