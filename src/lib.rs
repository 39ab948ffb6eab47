#![deny(
    missing_debug_implementations,
    clippy::print_stderr,
    clippy::print_stdout
)]

//! # sea-blog
//!
//! The storage core of a blog: users, categories, tags, posts with images,
//! threaded comments, likes, follows and a contact inbox, on top of SeaORM.
//!
//! Each operation is an associated function on a service struct in
//! [`service`]. It takes any connection that can open a transaction, so the
//! same call works on a pool or inside a caller's transaction.
//!
//! ```no_run
//! use sea_blog::{schema, service::{Comments, NewComment, PostLikeService}, Config};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Config::from_env()?.connect().await?;
//! schema::create_tables(&db).await?;
//!
//! let reply = Comments::create(&db, 1, 2, NewComment {
//!     content: "Agreed".to_owned(),
//!     parent_id: Some(7),
//!     images: vec![],
//! })
//! .await?;
//! PostLikeService::add(&db, 2, reply.post_id).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Failures are reported as [`BlogError`]; [`BlogError::status_code`] gives
//! the HTTP status a transport layer should answer with.

pub mod config;
pub mod entity;
pub mod error;
pub mod identity;
pub mod ownership;
pub mod schema;
pub mod service;

pub use config::{Config, ConfigError};
pub use error::{BlogError, EntityKind, ErrorKind};
pub use identity::{authenticate, IdentityProvider, StaticIdentity};
pub use ownership::{ensure_owner, owned_by, Owned};
