use chrono::NaiveDate;
use domain::{BlogPost, Timestamp, User};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPostDto {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub subject: String,
    pub date: NaiveDate,
    pub description: String,
}

impl From<&BlogPost> for BlogPostDto {
    fn from(post: &BlogPost) -> Self {
        Self {
            id: post.id.into(),
            name: post.name.as_str().to_owned(),
            email: post.email.as_ref().map(|e| e.as_str().to_owned()),
            subject: post.subject.as_str().to_owned(),
            date: post.date,
            description: post.description.as_str().to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: Timestamp,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.into(),
            username: user.username.as_str().to_owned(),
            email: user.email.as_str().to_owned(),
            is_staff: user.is_staff,
            is_active: user.is_active,
            date_joined: user.date_joined,
        }
    }
}
