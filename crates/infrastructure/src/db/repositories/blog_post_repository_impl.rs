//! Blog post repository over the `Any` pool.

use application::BlogPostRepository;
use async_trait::async_trait;
use chrono::NaiveDate;
use config::DatabaseEngine;
use domain::{
    BlogPost, ContactEmail, Description, NewBlogPost, PostId, PostName, RepositoryError, Subject,
};
use sqlx::{AnyPool, FromRow};

use crate::db::placeholder;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Row shape shared by all three backends.
#[derive(Debug, Clone, FromRow)]
struct DbBlogPost {
    id: i64,
    name: String,
    email: Option<String>,
    subject: String,
    date: String,
    description: String,
}

impl TryFrom<DbBlogPost> for BlogPost {
    type Error = RepositoryError;

    fn try_from(row: DbBlogPost) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT)
            .map_err(|err| RepositoryError::storage(format!("bad date in row {}: {err}", row.id)))?;
        Ok(BlogPost {
            id: PostId(row.id),
            name: PostName::parse(row.name)
                .map_err(|err| RepositoryError::storage(err.to_string()))?,
            email: ContactEmail::parse_optional(row.email)
                .map_err(|err| RepositoryError::storage(err.to_string()))?,
            subject: Subject::parse(row.subject)
                .map_err(|err| RepositoryError::storage(err.to_string()))?,
            date,
            description: Description::parse(row.description)
                .map_err(|err| RepositoryError::storage(err.to_string()))?,
        })
    }
}

pub struct SqlBlogPostRepository {
    pool: AnyPool,
    engine: DatabaseEngine,
}

impl SqlBlogPostRepository {
    pub fn new(pool: AnyPool, engine: DatabaseEngine) -> Self {
        Self { pool, engine }
    }

    fn ph(&self, n: usize) -> String {
        placeholder(self.engine, n)
    }
}

#[async_trait]
impl BlogPostRepository for SqlBlogPostRepository {
    async fn create(&self, post: NewBlogPost) -> Result<BlogPost, RepositoryError> {
        let date = post.date.format(DATE_FORMAT).to_string();
        let email = post.email.as_ref().map(|e| e.as_str().to_owned());

        let id = match self.engine {
            DatabaseEngine::Postgres => sqlx::query_scalar::<_, i64>(
                "INSERT INTO blog_posts (name, email, subject, date, description)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING id",
            )
            .bind(post.name.as_str())
            .bind(email)
            .bind(post.subject.as_str())
            .bind(&date)
            .bind(post.description.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|err| RepositoryError::storage(err.to_string()))?,
            // MySQL has no RETURNING; rely on the driver-reported insert id.
            DatabaseEngine::MySql | DatabaseEngine::Sqlite => {
                let result = sqlx::query(
                    "INSERT INTO blog_posts (name, email, subject, date, description)
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(post.name.as_str())
                .bind(email)
                .bind(post.subject.as_str())
                .bind(&date)
                .bind(post.description.as_str())
                .execute(&self.pool)
                .await
                .map_err(|err| RepositoryError::storage(err.to_string()))?;
                result.last_insert_id().ok_or_else(|| {
                    RepositoryError::storage("driver did not report an insert id")
                })?
            }
        };

        self.find_by_id(PostId(id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, post: BlogPost) -> Result<BlogPost, RepositoryError> {
        let sql = format!(
            "UPDATE blog_posts
             SET name = {}, email = {}, subject = {}, date = {}, description = {}
             WHERE id = {}",
            self.ph(1),
            self.ph(2),
            self.ph(3),
            self.ph(4),
            self.ph(5),
            self.ph(6),
        );

        let result = sqlx::query(&sql)
            .bind(post.name.as_str())
            .bind(post.email.as_ref().map(|e| e.as_str().to_owned()))
            .bind(post.subject.as_str())
            .bind(post.date.format(DATE_FORMAT).to_string())
            .bind(post.description.as_str())
            .bind(i64::from(post.id))
            .execute(&self.pool)
            .await
            .map_err(|err| RepositoryError::storage(err.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_id(post.id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<BlogPost>, RepositoryError> {
        let sql = format!(
            "SELECT id, name, email, subject, date, description
             FROM blog_posts WHERE id = {}",
            self.ph(1)
        );

        let row = sqlx::query_as::<_, DbBlogPost>(&sql)
            .bind(i64::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| RepositoryError::storage(err.to_string()))?;

        row.map(BlogPost::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        let rows = sqlx::query_as::<_, DbBlogPost>(
            "SELECT id, name, email, subject, date, description
             FROM blog_posts ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|err| RepositoryError::storage(err.to_string()))?;

        rows.into_iter().map(BlogPost::try_from).collect()
    }

    async fn delete(&self, id: PostId) -> Result<(), RepositoryError> {
        let sql = format!("DELETE FROM blog_posts WHERE id = {}", self.ph(1));

        let result = sqlx::query(&sql)
            .bind(i64::from(id))
            .execute(&self.pool)
            .await
            .map_err(|err| RepositoryError::storage(err.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
