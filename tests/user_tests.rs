pub mod common;

pub use common::{create_post, create_user, TestContext};
use pretty_assertions::assert_eq;
use sea_blog::{
    authenticate, ensure_owner,
    service::{ContactForm, Contacts, NewUser, ProfileUpdate, PublicProfile, Users},
    BlogError, EntityKind, ErrorKind, StaticIdentity,
};

#[tokio::test]
async fn usernames_and_emails_are_unique() {
    let ctx = TestContext::new("usernames_and_emails_are_unique").await;
    let db = &ctx.db;
    let alice = create_user(db, "alice").await;
    assert!(alice.is_active);

    let err = Users::create(
        db,
        NewUser {
            username: "alice".to_owned(),
            email: "other@example.com".to_owned(),
            password_hash: "x".to_owned(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let err = Users::create(
        db,
        NewUser {
            username: "alice2".to_owned(),
            email: alice.email.clone(),
            password_hash: "x".to_owned(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    assert_eq!(Users::find_by_username(db, "alice").await.unwrap(), alice);
    assert!(matches!(
        Users::find_by_username(db, "nobody").await,
        Err(BlogError::NotFound { kind: EntityKind::User, .. })
    ));
}

#[tokio::test]
async fn profiles() {
    let ctx = TestContext::new("profiles").await;
    let db = &ctx.db;
    let alice = create_user(db, "alice").await;
    let bob = create_user(db, "bob").await;

    let update = ProfileUpdate {
        bio: Some(Some("Writes about databases".to_owned())),
        avatar: Some(Some("alice.png".to_owned())),
        ..Default::default()
    };
    assert_eq!(
        Users::update_profile(db, alice.id, bob.id, update.clone())
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::Forbidden
    );
    let updated = Users::update_profile(db, alice.id, alice.id, update)
        .await
        .unwrap();
    assert_eq!(updated.bio.as_deref(), Some("Writes about databases"));

    assert_eq!(
        Users::public_profile(db, alice.id).await.unwrap(),
        PublicProfile {
            id: alice.id,
            username: "alice".to_owned(),
            avatar: Some("alice.png".to_owned()),
            bio: Some("Writes about databases".to_owned()),
        }
    );
}

#[tokio::test]
async fn authenticate_requires_an_active_user() {
    let ctx = TestContext::new("authenticate_requires_an_active_user").await;
    let db = &ctx.db;
    let alice = create_user(db, "alice").await;
    let identity = StaticIdentity::new()
        .with_token("alice-token", alice.id)
        .with_token("ghost-token", 999);

    assert_eq!(
        authenticate(&identity, db, Some("alice-token")).await.unwrap(),
        alice
    );
    for credential in [None, Some("wrong"), Some("ghost-token")] {
        let err = authenticate(&identity, db, credential).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.status_code(), 401);
    }

    let bob = create_user(db, "bob").await;
    assert_eq!(
        Users::set_active(db, alice.id, bob.id, false)
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::Forbidden
    );
    assert!(Users::find_by_id(db, alice.id).await.unwrap().is_active);

    let deactivated = Users::set_active(db, alice.id, alice.id, false)
        .await
        .unwrap();
    assert!(!deactivated.is_active);
    assert_eq!(
        authenticate(&identity, db, Some("alice-token"))
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::Unauthorized
    );
}

#[tokio::test]
async fn ownership_by_kind() {
    let ctx = TestContext::new("ownership_by_kind").await;
    let db = &ctx.db;
    let alice = create_user(db, "alice").await;
    let bob = create_user(db, "bob").await;
    let post = create_post(db, alice.id, "Hello").await;

    ensure_owner(db, EntityKind::Post, post.id, alice.id)
        .await
        .unwrap();
    ensure_owner(db, EntityKind::User, bob.id, bob.id)
        .await
        .unwrap();
    assert_eq!(
        ensure_owner(db, EntityKind::Post, post.id, bob.id)
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::Forbidden
    );
    assert_eq!(
        ensure_owner(db, EntityKind::Comment, 1, alice.id)
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        ensure_owner(db, EntityKind::Follow, 1, alice.id)
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::Forbidden
    );
}

#[tokio::test]
async fn contact_messages() {
    let ctx = TestContext::new("contact_messages").await;
    let db = &ctx.db;

    let first = Contacts::submit(
        db,
        ContactForm {
            name: "Carol".to_owned(),
            email: "carol@example.com".to_owned(),
            message: "Love the blog".to_owned(),
        },
    )
    .await
    .unwrap();
    let second = Contacts::submit(
        db,
        ContactForm {
            name: "Dave".to_owned(),
            email: "dave@example.com".to_owned(),
            message: "Typo in the last post".to_owned(),
        },
    )
    .await
    .unwrap();

    assert_eq!(Contacts::find_by_id(db, first.id).await.unwrap(), first);
    let all = Contacts::list_all(db).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, second.id);
    assert_eq!(
        Contacts::find_by_id(db, 99).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}
