pub mod common;

pub use common::{create_post, create_tag, create_user, TestContext};
use pretty_assertions::assert_eq;
use sea_blog::{
    entity::{comment, comment_image, comment_like, post_image, post_like, post_tag},
    service::{
        CommentLikeService, Comments, NewComment, NewPost, PostLikeService, PostTags, PostUpdate,
        Posts,
    },
    BlogError, EntityKind, ErrorKind,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

async fn tag_ids(db: &DatabaseConnection, post_id: i32) -> Vec<i32> {
    PostTags::tags_for_post(db, post_id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect()
}

#[tokio::test]
async fn create_with_tags_and_images() {
    let ctx = TestContext::new("create_with_tags_and_images").await;
    let db = &ctx.db;
    let alice = create_user(db, "alice").await;
    let bob = create_user(db, "bob").await;
    let rust = create_tag(db, alice.id, "rust").await;
    let orm = create_tag(db, alice.id, "orm").await;

    let post = Posts::create(
        db,
        alice.id,
        NewPost {
            title: "Relations".to_owned(),
            content: "Many to many".to_owned(),
            slug: Some("relations".to_owned()),
            tag_ids: vec![orm.id, rust.id, orm.id],
            images: vec!["cover.png".to_owned(), "diagram.png".to_owned()],
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(!post.is_published);
    assert_eq!(post.published_at, None);
    assert_eq!(post.created_at, post.updated_at);

    PostLikeService::add(db, bob.id, post.id).await.unwrap();

    let view = Posts::view(db, post.id).await.unwrap();
    assert_eq!(view.post, post);
    assert_eq!(view.tags, vec!["rust".to_owned(), "orm".to_owned()]);
    assert_eq!(
        view.images,
        vec!["cover.png".to_owned(), "diagram.png".to_owned()]
    );
    assert_eq!(view.like_count, 1);

    assert_eq!(Posts::find_by_slug(db, "relations").await.unwrap(), post);
    assert!(matches!(
        Posts::find_by_slug(db, "missing").await,
        Err(BlogError::NotFound { kind: EntityKind::Post, ref key }) if key == "missing"
    ));
    assert_eq!(
        PostTags::posts_for_tag(db, rust.id).await.unwrap(),
        vec![post]
    );
}

#[tokio::test]
async fn create_validates_references() {
    let ctx = TestContext::new("create_validates_references").await;
    let db = &ctx.db;
    let alice = create_user(db, "alice").await;
    let rust = create_tag(db, alice.id, "rust").await;

    let err = Posts::create(
        db,
        alice.id,
        NewPost {
            title: "Lost".to_owned(),
            category_id: Some(42),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, BlogError::NotFound { kind: EntityKind::Category, .. }));

    let err = Posts::create(
        db,
        alice.id,
        NewPost {
            title: "Mistagged".to_owned(),
            tag_ids: vec![rust.id, 9, 7],
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "tag not found: 7, 9");

    assert_eq!(Posts::list_all(db).await.unwrap(), vec![]);
}

#[tokio::test]
async fn slugs_are_unique() {
    let ctx = TestContext::new("slugs_are_unique").await;
    let db = &ctx.db;
    let alice = create_user(db, "alice").await;

    let new_post = |title: &str| NewPost {
        title: title.to_owned(),
        content: String::new(),
        slug: Some("same".to_owned()),
        ..Default::default()
    };
    let first = Posts::create(db, alice.id, new_post("one")).await.unwrap();
    let err = Posts::create(db, alice.id, new_post("two"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let other = create_post(db, alice.id, "three").await;
    let err = Posts::update(
        db,
        other.id,
        alice.id,
        PostUpdate {
            slug: Some(Some("same".to_owned())),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // Posts without a slug never collide
    create_post(db, alice.id, "four").await;
    assert_eq!(Posts::list_for_owner(db, alice.id).await.unwrap().len(), 3);
    assert_eq!(Posts::find_by_slug(db, "same").await.unwrap(), first);
}

#[tokio::test]
async fn set_post_tags_replaces_the_set() {
    let ctx = TestContext::new("set_post_tags_replaces_the_set").await;
    let db = &ctx.db;
    let alice = create_user(db, "alice").await;
    let bob = create_user(db, "bob").await;
    let t1 = create_tag(db, alice.id, "one").await;
    let t2 = create_tag(db, alice.id, "two").await;
    let t3 = create_tag(db, bob.id, "three").await;
    let post = create_post(db, alice.id, "Tagged").await;

    PostTags::set(db, post.id, &[t3.id]).await.unwrap();
    assert_eq!(tag_ids(db, post.id).await, vec![t3.id]);

    PostTags::set(db, post.id, &[]).await.unwrap();
    assert_eq!(tag_ids(db, post.id).await, Vec::<i32>::new());

    let tags = PostTags::set(db, post.id, &[t2.id, t1.id, t2.id])
        .await
        .unwrap();
    assert_eq!(tags, vec![t1.clone(), t2.clone()]);
    assert_eq!(
        post_tag::Entity::find()
            .filter(post_tag::Column::PostId.eq(post.id))
            .count(db)
            .await
            .unwrap(),
        2
    );

    // A missing id leaves the set untouched
    let err = PostTags::set(db, post.id, &[t3.id, 99])
        .await
        .unwrap_err();
    assert!(matches!(err, BlogError::NotFound { kind: EntityKind::Tag, ref key } if key == "99"));
    assert_eq!(tag_ids(db, post.id).await, vec![t1.id, t2.id]);

    assert_eq!(
        PostTags::set(db, 404, &[t1.id]).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn update_replaces_given_fields() {
    let ctx = TestContext::new("update_replaces_given_fields").await;
    let db = &ctx.db;
    let alice = create_user(db, "alice").await;
    let bob = create_user(db, "bob").await;
    let tag = create_tag(db, alice.id, "news").await;
    let post = Posts::create(
        db,
        alice.id,
        NewPost {
            title: "Draft".to_owned(),
            content: "text".to_owned(),
            images: vec!["a.png".to_owned()],
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(
        Posts::update(db, post.id, bob.id, PostUpdate::default())
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::Forbidden
    );

    let updated = Posts::update(
        db,
        post.id,
        alice.id,
        PostUpdate {
            title: Some("Final".to_owned()),
            tag_ids: Some(vec![tag.id]),
            images: Some(vec!["b.png".to_owned(), "c.png".to_owned()]),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.content, "text");

    let view = Posts::view(db, post.id).await.unwrap();
    assert_eq!(view.tags, vec!["news".to_owned()]);
    assert_eq!(view.images, vec!["b.png".to_owned(), "c.png".to_owned()]);
}

#[tokio::test]
async fn publish_and_unpublish() {
    let ctx = TestContext::new("publish_and_unpublish").await;
    let db = &ctx.db;
    let alice = create_user(db, "alice").await;
    let bob = create_user(db, "bob").await;
    let draft = create_post(db, alice.id, "Draft").await;
    let post = create_post(db, alice.id, "Public").await;

    assert_eq!(
        Posts::publish(db, post.id, bob.id).await.unwrap_err().kind(),
        ErrorKind::Forbidden
    );

    let published = Posts::publish(db, post.id, alice.id).await.unwrap();
    assert!(published.is_published);
    assert!(published.published_at.is_some());
    assert_eq!(
        Posts::list_published(db).await.unwrap(),
        vec![published.clone()]
    );

    let unpublished = Posts::unpublish(db, post.id, alice.id).await.unwrap();
    assert!(!unpublished.is_published);
    assert_eq!(unpublished.published_at, None);
    assert_eq!(Posts::list_published(db).await.unwrap(), vec![]);
    assert_eq!(Posts::find_by_id(db, draft.id).await.unwrap(), draft);
}

#[tokio::test]
async fn deleting_a_post_cascades() {
    let ctx = TestContext::new("deleting_a_post_cascades").await;
    let db = &ctx.db;
    let alice = create_user(db, "alice").await;
    let bob = create_user(db, "bob").await;
    let tag = create_tag(db, alice.id, "doomed").await;
    let post = Posts::create(
        db,
        alice.id,
        NewPost {
            title: "Doomed".to_owned(),
            tag_ids: vec![tag.id],
            images: vec!["x.png".to_owned()],
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let survivor = create_post(db, alice.id, "Survivor").await;

    let top = Comments::create(
        db,
        post.id,
        bob.id,
        NewComment {
            content: "top".to_owned(),
            images: vec!["y.png".to_owned()],
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let reply = Comments::create(
        db,
        post.id,
        alice.id,
        NewComment {
            content: "reply".to_owned(),
            parent_id: Some(top.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    Comments::create(
        db,
        survivor.id,
        bob.id,
        NewComment {
            content: "elsewhere".to_owned(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    PostLikeService::add(db, bob.id, post.id).await.unwrap();
    CommentLikeService::add(db, alice.id, reply.id).await.unwrap();

    assert_eq!(
        Posts::delete(db, post.id, bob.id).await.unwrap_err().kind(),
        ErrorKind::Forbidden
    );
    Posts::delete(db, post.id, alice.id).await.unwrap();

    assert_eq!(
        Posts::find_by_id(db, post.id).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        comment::Entity::find()
            .filter(comment::Column::PostId.eq(post.id))
            .count(db)
            .await
            .unwrap(),
        0
    );
    assert_eq!(comment::Entity::find().count(db).await.unwrap(), 1);
    assert_eq!(comment_image::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(comment_like::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(post_image::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(post_like::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(post_tag::Entity::find().count(db).await.unwrap(), 0);

    // The tag itself outlives the post
    assert_eq!(PostTags::posts_for_tag(db, tag.id).await.unwrap(), vec![]);
}
