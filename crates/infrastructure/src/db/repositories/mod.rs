//! Repository implementations over the shared `Any` pool.

pub mod blog_post_repository_impl;
pub mod user_repository_impl;

pub use blog_post_repository_impl::SqlBlogPostRepository;
pub use user_repository_impl::SqlUserRepository;
