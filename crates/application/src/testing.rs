//! In-memory fakes for tests, here and in the crates above.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use domain::{
    BlogPost, NewBlogPost, NewUser, PasswordHash, PostId, RepositoryError, Timestamp, User,
    UserId,
};

use crate::clock::Clock;
use crate::password::{PasswordHasher, PasswordHasherError};
use crate::repository::{BlogPostRepository, UserRepository};

pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2024, 5, 4, 12, 0, 0).unwrap(),
    ))
}

/// Reversible stand-in for bcrypt so assertions stay deterministic.
pub struct PlainPasswordHasher;

#[async_trait]
impl PasswordHasher for PlainPasswordHasher {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHasherError> {
        Ok(PasswordHash::new(format!("plain${plaintext}")))
    }

    async fn verify(
        &self,
        plaintext: &str,
        hashed: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        Ok(hashed.as_str() == format!("plain${plaintext}"))
    }
}

#[derive(Default)]
pub struct InMemoryBlogPostRepository {
    posts: Mutex<Vec<BlogPost>>,
    next_id: AtomicI64,
}

#[async_trait]
impl BlogPostRepository for InMemoryBlogPostRepository {
    async fn create(&self, post: NewBlogPost) -> Result<BlogPost, RepositoryError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = BlogPost {
            id: PostId(id),
            name: post.name,
            email: post.email,
            subject: post.subject,
            date: post.date,
            description: post.description,
        };
        self.posts.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, post: BlogPost) -> Result<BlogPost, RepositoryError> {
        let mut posts = self.posts.lock().unwrap();
        let slot = posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = post.clone();
        Ok(post)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<BlogPost>, RepositoryError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        Ok(self.posts.lock().unwrap().clone())
    }

    async fn delete(&self, id: PostId) -> Result<(), RepositoryError> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    next_id: AtomicI64,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.username.as_str() == user.username.as_str())
        {
            return Err(RepositoryError::Conflict);
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = User {
            id: UserId(id),
            username: user.username,
            email: user.email,
            password: user.password,
            is_staff: user.is_staff,
            is_active: user.is_active,
            date_joined: user.date_joined,
        };
        users.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, user: User) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.id != user.id && u.username.as_str() == user.username.as_str())
        {
            return Err(RepositoryError::Conflict);
        }
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = user.clone();
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username.as_str() == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
