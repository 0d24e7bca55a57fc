//! User repository over the `Any` pool.

use application::UserRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use config::DatabaseEngine;
use domain::{NewUser, PasswordHash, RepositoryError, User, UserEmail, UserId, Username};
use sqlx::{AnyPool, FromRow};

use crate::db::placeholder;

const USER_COLUMNS: &str = "id, username, email, password, is_staff, is_active, date_joined";

#[derive(Debug, Clone, FromRow)]
struct DbUser {
    id: i64,
    username: String,
    email: String,
    password: String,
    // Stored as 0/1; the Any driver has no portable boolean.
    is_staff: i64,
    is_active: i64,
    date_joined: String,
}

impl TryFrom<DbUser> for User {
    type Error = RepositoryError;

    fn try_from(row: DbUser) -> Result<Self, Self::Error> {
        let date_joined = DateTime::parse_from_rfc3339(&row.date_joined)
            .map_err(|err| {
                RepositoryError::storage(format!("bad timestamp in row {}: {err}", row.id))
            })?
            .with_timezone(&Utc);
        Ok(User {
            id: UserId(row.id),
            username: Username::parse(row.username)
                .map_err(|err| RepositoryError::storage(err.to_string()))?,
            email: UserEmail::parse(row.email)
                .map_err(|err| RepositoryError::storage(err.to_string()))?,
            password: PasswordHash::new(row.password),
            is_staff: row.is_staff != 0,
            is_active: row.is_active != 0,
            date_joined,
        })
    }
}

pub struct SqlUserRepository {
    pool: AnyPool,
    engine: DatabaseEngine,
}

impl SqlUserRepository {
    pub fn new(pool: AnyPool, engine: DatabaseEngine) -> Self {
        Self { pool, engine }
    }

    fn ph(&self, n: usize) -> String {
        placeholder(self.engine, n)
    }
}

fn map_insert_error(err: sqlx::Error) -> RepositoryError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict;
        }
    }
    RepositoryError::storage(err.to_string())
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let date_joined = user.date_joined.to_rfc3339();

        let id = match self.engine {
            DatabaseEngine::Postgres => sqlx::query_scalar::<_, i64>(
                "INSERT INTO users (username, email, password, is_staff, is_active, date_joined)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 RETURNING id",
            )
            .bind(user.username.as_str())
            .bind(user.email.as_str())
            .bind(user.password.as_str())
            .bind(user.is_staff as i64)
            .bind(user.is_active as i64)
            .bind(&date_joined)
            .fetch_one(&self.pool)
            .await
            .map_err(map_insert_error)?,
            DatabaseEngine::MySql | DatabaseEngine::Sqlite => {
                let result = sqlx::query(
                    "INSERT INTO users (username, email, password, is_staff, is_active, date_joined)
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(user.username.as_str())
                .bind(user.email.as_str())
                .bind(user.password.as_str())
                .bind(user.is_staff as i64)
                .bind(user.is_active as i64)
                .bind(&date_joined)
                .execute(&self.pool)
                .await
                .map_err(map_insert_error)?;
                result
                    .last_insert_id()
                    .ok_or_else(|| RepositoryError::storage("driver did not report an insert id"))?
            }
        };

        self.find_by_id(UserId(id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, user: User) -> Result<User, RepositoryError> {
        let sql = format!(
            "UPDATE users
             SET username = {}, email = {}, password = {}, is_staff = {}, is_active = {}
             WHERE id = {}",
            self.ph(1),
            self.ph(2),
            self.ph(3),
            self.ph(4),
            self.ph(5),
            self.ph(6),
        );

        let result = sqlx::query(&sql)
            .bind(user.username.as_str())
            .bind(user.email.as_str())
            .bind(user.password.as_str())
            .bind(user.is_staff as i64)
            .bind(user.is_active as i64)
            .bind(i64::from(user.id))
            .execute(&self.pool)
            .await
            .map_err(map_insert_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_id(user.id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = {}", self.ph(1));

        let row = sqlx::query_as::<_, DbUser>(&sql)
            .bind(i64::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| RepositoryError::storage(err.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = {}",
            self.ph(1)
        );

        let row = sqlx::query_as::<_, DbUser>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| RepositoryError::storage(err.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");

        let rows = sqlx::query_as::<_, DbUser>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| RepositoryError::storage(err.to_string()))?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let sql = format!("DELETE FROM users WHERE id = {}", self.ph(1));

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
