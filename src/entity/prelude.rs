pub use super::category::Entity as Category;
pub use super::comment::Entity as Comment;
pub use super::comment_image::Entity as CommentImage;
pub use super::comment_like::Entity as CommentLike;
pub use super::contact::Entity as Contact;
pub use super::follow::Entity as Follow;
pub use super::post::Entity as Post;
pub use super::post_image::Entity as PostImage;
pub use super::post_like::Entity as PostLike;
pub use super::post_tag::Entity as PostTag;
pub use super::tag::Entity as Tag;
pub use super::user::Entity as User;
