//! Core domain model of the blog service.
//!
//! Entities, validated value objects and the error types shared by the layers
//! above. Validation lives in the value-object `parse` constructors so that an
//! entity, once built, is known to be well-formed.

pub mod blog_post;
pub mod errors;
pub mod user;
pub mod value_objects;

pub use blog_post::{BlogPost, NewBlogPost};
pub use errors::{DomainError, RepositoryError};
pub use user::{NewUser, User};
pub use value_objects::{
    ContactEmail, Description, PasswordHash, PostId, PostName, Subject, Timestamp, UserEmail,
    UserId, Username,
};
