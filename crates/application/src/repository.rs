use async_trait::async_trait;
use domain::{BlogPost, NewBlogPost, NewUser, PostId, RepositoryError, User, UserId};

#[async_trait]
pub trait BlogPostRepository: Send + Sync {
    async fn create(&self, post: NewBlogPost) -> Result<BlogPost, RepositoryError>;
    async fn update(&self, post: BlogPost) -> Result<BlogPost, RepositoryError>;
    async fn find_by_id(&self, id: PostId) -> Result<Option<BlogPost>, RepositoryError>;
    async fn list(&self) -> Result<Vec<BlogPost>, RepositoryError>;
    async fn delete(&self, id: PostId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;
    async fn update(&self, user: User) -> Result<User, RepositoryError>;
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;
    async fn delete(&self, id: UserId) -> Result<(), RepositoryError>;
}
