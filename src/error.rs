use itertools::Itertools;
use sea_orm::{DbErr, SqlErr};
use strum::Display;
use thiserror::Error;

/// The kinds of record the store keeps, used to label errors and ownership checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    User,
    Category,
    Tag,
    Post,
    Comment,
    Contact,
    PostLike,
    CommentLike,
    Follow,
}

/// An error from a blog store operation
#[derive(Error, Debug)]
pub enum BlogError {
    /// A referenced record does not exist
    #[error("{kind} not found: {key}")]
    NotFound { kind: EntityKind, key: String },
    /// The actor does not own the record it tried to change
    #[error("not allowed to modify {kind} {id}")]
    Forbidden { kind: EntityKind, id: i32 },
    /// A uniqueness rule was violated, or a relation was already in the requested state
    #[error("conflict: {0}")]
    Conflict(String),
    /// A parent pointer would break the tree it belongs to
    #[error("invalid {kind} parent {parent_id}: {reason}")]
    InvalidParent {
        kind: EntityKind,
        parent_id: i32,
        reason: String,
    },
    /// No identity, or the identity does not map to an active user
    #[error("unauthorized")]
    Unauthorized,
    /// The store failed for a reason not covered above
    #[error("store error: {0}")]
    Store(#[source] DbErr),
}

/// Flat classification of [`BlogError`], for callers that only branch on the category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Conflict,
    InvalidParent,
    Unauthorized,
    Store,
}

impl BlogError {
    pub fn not_found(kind: EntityKind, id: i32) -> Self {
        Self::NotFound {
            kind,
            key: id.to_string(),
        }
    }

    /// Lists every missing id, in ascending order
    pub fn not_found_many(kind: EntityKind, ids: impl IntoIterator<Item = i32>) -> Self {
        Self::NotFound {
            kind,
            key: ids.into_iter().sorted().join(", "),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::InvalidParent { .. } => ErrorKind::InvalidParent,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    /// HTTP status a transport binding should answer with
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::Forbidden => 403,
            ErrorKind::Conflict => 409,
            ErrorKind::InvalidParent => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Store => 500,
        }
    }
}

impl From<DbErr> for BlogError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => Self::Conflict(message),
            _ => Self::Store(err),
        }
    }
}
