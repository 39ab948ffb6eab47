//! Table definitions for the blog store.

pub mod prelude;

pub mod category;
pub mod comment;
pub mod comment_image;
pub mod comment_like;
pub mod contact;
pub mod follow;
pub mod post;
pub mod post_image;
pub mod post_like;
pub mod post_tag;
pub mod tag;
pub mod user;
