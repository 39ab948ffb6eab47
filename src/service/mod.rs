//! Operations over the store, one transaction each.
//!
//! Every service is a unit struct with associated functions generic over the
//! connection, so callers can pass a pool or an open transaction.

use sea_orm::DbErr;

mod category;
mod comment;
mod contact;
mod post;
mod post_tags;
mod reaction;
mod tag;
pub mod thread;
mod user;

pub use category::{Categories, CategoryUpdate, NewCategory};
pub use comment::{CommentUpdate, CommentView, Comments, NewComment};
pub use contact::{ContactForm, Contacts};
pub use post::{NewPost, PostUpdate, PostView, Posts};
pub use post_tags::PostTags;
pub use reaction::{CommentLikes, Follows, PostLikes, Reaction, Reactions};
pub use tag::Tags;
pub use thread::{build_forest, CommentNode};
pub use user::{NewUser, ProfileUpdate, PublicProfile, Users};

/// Likes on posts
pub type PostLikeService = Reactions<PostLikes>;
/// Likes on comments
pub type CommentLikeService = Reactions<CommentLikes>;
/// Who follows whom
pub type FollowService = Reactions<Follows>;

/// Converts an index in an image list to the stored `position`.
pub(crate) fn image_position(index: usize) -> Result<i32, DbErr> {
    i32::try_from(index)
        .map_err(|_| DbErr::Custom(format!("image position {index} does not fit in i32")))
}
