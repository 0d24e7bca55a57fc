//! Infrastructure layer.
//!
//! Database pool and repositories plus the bcrypt password hasher,
//! implementing the interfaces the application layer defines.

pub mod db;
pub mod password;

pub use db::repositories::{SqlBlogPostRepository, SqlUserRepository};
pub use db::{create_pool, ensure_schema};
pub use password::BcryptPasswordHasher;
