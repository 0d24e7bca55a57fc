mod account_service;
mod blog_service;

#[cfg(test)]
mod blog_service_tests;

pub use account_service::{
    AccountService, AccountServiceDependencies, AuthenticateUserRequest, RegisterUserRequest,
    UpdateUserRequest,
};
pub use blog_service::{
    BlogService, BlogServiceDependencies, CreatePostRequest, ReplacePostRequest,
};
