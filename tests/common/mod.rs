use sea_blog::{
    entity::{post, tag, user},
    schema,
    service::{NewPost, NewUser, Posts, Tags, Users},
};
use sea_orm::{Database, DatabaseConnection};
use tracing_subscriber::EnvFilter;

pub struct TestContext {
    pub db: DatabaseConnection,
}

impl TestContext {
    /// A fresh in-memory database with every blog table created.
    pub async fn new(test_name: &str) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let db = Database::connect("sqlite::memory:").await.unwrap();
        schema::create_tables(&db).await.unwrap();
        tracing::debug!(test_name, "database ready");

        Self { db }
    }
}

pub async fn create_user(db: &DatabaseConnection, username: &str) -> user::Model {
    Users::create(
        db,
        NewUser {
            username: username.to_owned(),
            email: format!("{username}@example.com"),
            password_hash: format!("hash-of-{username}"),
            ..Default::default()
        },
    )
    .await
    .unwrap()
}

pub async fn create_post(db: &DatabaseConnection, author: i32, title: &str) -> post::Model {
    Posts::create(
        db,
        author,
        NewPost {
            title: title.to_owned(),
            content: format!("{title} body"),
            ..Default::default()
        },
    )
    .await
    .unwrap()
}

pub async fn create_tag(db: &DatabaseConnection, owner: i32, name: &str) -> tag::Model {
    Tags::create(db, owner, name).await.unwrap()
}
