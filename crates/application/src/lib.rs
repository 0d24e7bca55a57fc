//! Application layer.
//!
//! Use-case services around the domain model: input validation, default
//! values, and the abstractions over external adapters (password hashing,
//! the clock, storage).

pub mod clock;
pub mod dto;
pub mod error;
pub mod password;
pub mod repository;
pub mod services;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use clock::{Clock, SystemClock};
pub use dto::{BlogPostDto, UserDto};
pub use error::ApplicationError;
pub use password::{PasswordHasher, PasswordHasherError};
pub use repository::{BlogPostRepository, UserRepository};
pub use services::{
    AccountService, AccountServiceDependencies, AuthenticateUserRequest, BlogService,
    BlogServiceDependencies, CreatePostRequest, RegisterUserRequest, ReplacePostRequest,
    UpdateUserRequest,
};
