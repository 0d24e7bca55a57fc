use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::value_objects::{ContactEmail, Description, PostId, PostName, Subject};

/// A persisted blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: PostId,
    pub name: PostName,
    pub email: Option<ContactEmail>,
    pub subject: Subject,
    pub date: NaiveDate,
    pub description: Description,
}

/// A blog post that has not been stored yet; the id is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlogPost {
    pub name: PostName,
    pub email: Option<ContactEmail>,
    pub subject: Subject,
    pub date: NaiveDate,
    pub description: Description,
}

impl BlogPost {
    /// Full-record replacement: every field except the identity is rewritten.
    pub fn replace(
        &mut self,
        name: PostName,
        email: Option<ContactEmail>,
        subject: Subject,
        date: NaiveDate,
        description: Description,
    ) {
        self.name = name;
        self.email = email;
        self.subject = subject;
        self.date = date;
        self.description = description;
    }
}
