use std::sync::Arc;

use chrono::NaiveDate;
use domain::{
    BlogPost, ContactEmail, Description, DomainError, NewBlogPost, PostId, PostName,
    RepositoryError, Subject,
};

use crate::{
    clock::Clock, dto::BlogPostDto, error::ApplicationError, repository::BlogPostRepository,
};

#[derive(Debug, Clone)]
pub struct CreatePostRequest {
    pub name: String,
    pub email: Option<String>,
    pub subject: String,
    /// Defaults to the current date when not supplied.
    pub date: Option<NaiveDate>,
    pub description: String,
}

/// Full-record replacement payload; identical shape to creation.
pub type ReplacePostRequest = CreatePostRequest;

pub struct BlogServiceDependencies {
    pub post_repository: Arc<dyn BlogPostRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct BlogService {
    deps: BlogServiceDependencies,
}

impl BlogService {
    pub fn new(deps: BlogServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn list(&self) -> Result<Vec<BlogPostDto>, ApplicationError> {
        let posts = self.deps.post_repository.list().await?;
        Ok(posts.iter().map(BlogPostDto::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<BlogPostDto, ApplicationError> {
        let post = self
            .deps
            .post_repository
            .find_by_id(PostId(id))
            .await?
            .ok_or(DomainError::PostNotFound)?;
        Ok(BlogPostDto::from(&post))
    }

    pub async fn create(&self, request: CreatePostRequest) -> Result<BlogPostDto, ApplicationError> {
        let post = NewBlogPost {
            name: PostName::parse(request.name)?,
            email: ContactEmail::parse_optional(request.email)?,
            subject: Subject::parse(request.subject)?,
            date: request.date.unwrap_or_else(|| self.deps.clock.today()),
            description: Description::parse(request.description)?,
        };
        let stored = self.deps.post_repository.create(post).await?;
        Ok(BlogPostDto::from(&stored))
    }

    /// Replace every field of an existing post. An omitted date falls back to
    /// the current date, the same default that applies on creation.
    pub async fn replace(
        &self,
        id: i64,
        request: ReplacePostRequest,
    ) -> Result<BlogPostDto, ApplicationError> {
        let mut post: BlogPost = self
            .deps
            .post_repository
            .find_by_id(PostId(id))
            .await?
            .ok_or(DomainError::PostNotFound)?;

        post.replace(
            PostName::parse(request.name)?,
            ContactEmail::parse_optional(request.email)?,
            Subject::parse(request.subject)?,
            request.date.unwrap_or_else(|| self.deps.clock.today()),
            Description::parse(request.description)?,
        );

        let stored = self.deps.post_repository.update(post).await?;
        Ok(BlogPostDto::from(&stored))
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApplicationError> {
        match self.deps.post_repository.delete(PostId(id)).await {
            Err(RepositoryError::NotFound) => Err(DomainError::PostNotFound.into()),
            other => other.map_err(Into::into),
        }
    }
}
