pub mod common;

use std::time::Duration;

pub use common::{create_post, create_user, TestContext};
use pretty_assertions::assert_eq;
use sea_blog::{
    entity::{comment, comment_image, comment_like},
    service::{CommentLikeService, CommentUpdate, Comments, NewComment},
    BlogError, EntityKind, ErrorKind,
};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

fn reply(content: &str, parent_id: Option<i32>) -> NewComment {
    NewComment {
        content: content.to_owned(),
        parent_id,
        images: vec![],
    }
}

async fn comment_count(db: &DatabaseConnection) -> u64 {
    comment::Entity::find().count(db).await.unwrap()
}

#[tokio::test]
async fn replies_form_a_thread() {
    let ctx = TestContext::new("replies_form_a_thread").await;
    let db = &ctx.db;
    let alice = create_user(db, "alice").await;
    let bob = create_user(db, "bob").await;
    let post = create_post(db, alice.id, "Hello").await;

    let a = Comments::create(db, post.id, bob.id, reply("first", None))
        .await
        .unwrap();
    let b = Comments::create(db, post.id, alice.id, reply("thanks", Some(a.id)))
        .await
        .unwrap();
    let c = Comments::create(db, post.id, bob.id, reply("second", None))
        .await
        .unwrap();

    assert_eq!(
        Comments::list_top_level(db, post.id).await.unwrap(),
        vec![a.clone(), c.clone()]
    );
    assert_eq!(Comments::list_replies(db, a.id).await.unwrap(), vec![b.clone()]);
    assert_eq!(Comments::list_replies(db, b.id).await.unwrap(), vec![]);
    assert_eq!(Comments::parent(db, b.id).await.unwrap(), Some(a.clone()));
    assert_eq!(Comments::parent(db, a.id).await.unwrap(), None);

    let thread = Comments::thread(db, post.id).await.unwrap();
    assert_eq!(thread.len(), 2);
    assert_eq!(thread[0].comment, a);
    assert_eq!(thread[0].replies.len(), 1);
    assert_eq!(thread[0].replies[0].comment, b);
    assert_eq!(thread[1].comment, c);
    assert_eq!(thread[1].size(), 1);

    let subtree = Comments::subtree(db, a.id).await.unwrap();
    assert_eq!(subtree.size(), 2);
    assert_eq!(subtree.depth(), 2);

    assert_eq!(
        Comments::list_for_user(db, bob.id).await.unwrap(),
        vec![a, c]
    );
}

#[tokio::test]
async fn parent_must_be_on_the_same_post() {
    let ctx = TestContext::new("parent_must_be_on_the_same_post").await;
    let db = &ctx.db;
    let alice = create_user(db, "alice").await;
    let first = create_post(db, alice.id, "First").await;
    let second = create_post(db, alice.id, "Second").await;

    let on_first = Comments::create(db, first.id, alice.id, reply("hi", None))
        .await
        .unwrap();

    let err = Comments::create(db, second.id, alice.id, reply("stray", Some(on_first.id)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BlogError::InvalidParent {
            kind: EntityKind::Comment,
            parent_id,
            ..
        } if parent_id == on_first.id
    ));
    assert_eq!(err.status_code(), 400);

    let err = Comments::create(db, first.id, alice.id, reply("orphan", Some(999)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = Comments::create(db, 999, alice.id, reply("nowhere", None))
        .await
        .unwrap_err();
    assert!(matches!(err, BlogError::NotFound { kind: EntityKind::Post, .. }));

    assert_eq!(comment_count(db).await, 1);
}

#[tokio::test]
async fn missing_targets_are_not_found() {
    let ctx = TestContext::new("missing_targets_are_not_found").await;
    let db = &ctx.db;

    assert_eq!(
        Comments::list_top_level(db, 1).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        Comments::list_replies(db, 1).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        Comments::update(db, 1, 1, CommentUpdate::default())
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        Comments::delete(db, 1, 1).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn deleting_a_comment_removes_its_subtree() {
    let ctx = TestContext::new("deleting_a_comment_removes_its_subtree").await;
    let db = &ctx.db;
    let alice = create_user(db, "alice").await;
    let bob = create_user(db, "bob").await;
    let post = create_post(db, alice.id, "Hello").await;

    let a = Comments::create(db, post.id, alice.id, reply("root", None))
        .await
        .unwrap();
    let b = Comments::create(
        db,
        post.id,
        bob.id,
        NewComment {
            content: "reply".to_owned(),
            parent_id: Some(a.id),
            images: vec!["https://img.example.com/b.png".to_owned()],
        },
    )
    .await
    .unwrap();
    let c = Comments::create(db, post.id, alice.id, reply("reply to reply", Some(b.id)))
        .await
        .unwrap();
    let d = Comments::create(db, post.id, bob.id, reply("unrelated", None))
        .await
        .unwrap();
    CommentLikeService::add(db, bob.id, c.id).await.unwrap();

    // Only the author of the root may remove it, even though bob wrote a reply
    assert_eq!(
        Comments::delete(db, a.id, bob.id).await.unwrap_err().kind(),
        ErrorKind::Forbidden
    );

    assert_eq!(Comments::delete(db, a.id, alice.id).await.unwrap(), 3);

    assert_eq!(Comments::list_for_post(db, post.id).await.unwrap(), vec![d]);
    for id in [a.id, b.id, c.id] {
        assert_eq!(
            Comments::find_by_id(db, id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
    assert_eq!(comment_image::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(comment_like::Entity::find().count(db).await.unwrap(), 0);
}

#[tokio::test]
async fn only_the_author_may_change_a_comment() {
    let ctx = TestContext::new("only_the_author_may_change_a_comment").await;
    let db = &ctx.db;
    let alice = create_user(db, "alice").await;
    let bob = create_user(db, "bob").await;
    let post = create_post(db, alice.id, "Hello").await;

    let comment = Comments::create(db, post.id, bob.id, reply("mine", None))
        .await
        .unwrap();

    let err = Comments::update(
        db,
        comment.id,
        alice.id,
        CommentUpdate {
            content: Some("hijacked".to_owned()),
            images: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        BlogError::Forbidden { kind: EntityKind::Comment, id } if id == comment.id
    ));
    assert_eq!(err.status_code(), 403);

    assert_eq!(
        Comments::delete(db, comment.id, alice.id)
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::Forbidden
    );

    assert_eq!(Comments::find_by_id(db, comment.id).await.unwrap(), comment);
}

#[tokio::test]
async fn updated_at_moves_only_with_content() {
    let ctx = TestContext::new("updated_at_moves_only_with_content").await;
    let db = &ctx.db;
    let alice = create_user(db, "alice").await;
    let post = create_post(db, alice.id, "Hello").await;

    let original = Comments::create(
        db,
        post.id,
        alice.id,
        NewComment {
            content: "draft".to_owned(),
            parent_id: None,
            images: vec!["one.png".to_owned(), "two.png".to_owned()],
        },
    )
    .await
    .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let same = Comments::update(
        db,
        original.id,
        alice.id,
        CommentUpdate {
            content: Some("draft".to_owned()),
            images: Some(vec!["three.png".to_owned()]),
        },
    )
    .await
    .unwrap();
    assert_eq!(same.updated_at, original.updated_at);
    assert_eq!(
        Comments::view(db, original.id).await.unwrap().images,
        vec!["three.png".to_owned()]
    );

    let edited = Comments::update(
        db,
        original.id,
        alice.id,
        CommentUpdate {
            content: Some("final".to_owned()),
            images: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(edited.content, "final");
    assert_eq!(edited.created_at, original.created_at);
    assert!(edited.updated_at > original.updated_at);
    assert_eq!(
        Comments::view(db, original.id).await.unwrap().images,
        vec!["three.png".to_owned()]
    );
}

#[tokio::test]
async fn comment_views_carry_images_and_likes() {
    let ctx = TestContext::new("comment_views_carry_images_and_likes").await;
    let db = &ctx.db;
    let alice = create_user(db, "alice").await;
    let bob = create_user(db, "bob").await;
    let post = create_post(db, alice.id, "Hello").await;

    let liked = Comments::create(
        db,
        post.id,
        alice.id,
        NewComment {
            content: "look".to_owned(),
            parent_id: None,
            images: vec!["b.png".to_owned(), "a.png".to_owned()],
        },
    )
    .await
    .unwrap();
    let plain = Comments::create(db, post.id, bob.id, reply("nice", Some(liked.id)))
        .await
        .unwrap();
    CommentLikeService::add(db, alice.id, liked.id).await.unwrap();
    CommentLikeService::add(db, bob.id, liked.id).await.unwrap();

    let views = Comments::views(db, vec![liked.clone(), plain.clone()])
        .await
        .unwrap();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].comment, liked);
    assert_eq!(views[0].images, vec!["b.png".to_owned(), "a.png".to_owned()]);
    assert_eq!(views[0].like_count, 2);
    assert_eq!(views[1].comment, plain);
    assert!(views[1].images.is_empty());
    assert_eq!(views[1].like_count, 0);
}
