use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Timestamp type used across the domain.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Blog post identifier, assigned by the storage layer on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostId(pub i64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PostId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<PostId> for i64 {
    fn from(value: PostId) -> Self {
        value.0
    }
}

/// User identifier, assigned by the storage layer on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<UserId> for i64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

/// Author name on a blog post. Required, at most 20 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostName(String);

impl PostName {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_owned();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("name", "cannot be empty"));
        }
        if value.chars().count() > 20 {
            return Err(DomainError::invalid_argument(
                "name",
                "cannot exceed 20 characters",
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Optional contact address on a blog post, at most 30 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactEmail(String);

impl ContactEmail {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_owned();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("email", "cannot be empty"));
        }
        if value.chars().count() > 30 {
            return Err(DomainError::invalid_argument(
                "email",
                "cannot exceed 30 characters",
            ));
        }
        Ok(Self(value))
    }

    /// The field is optional; blank input means absent rather than invalid.
    pub fn parse_optional(
        value: Option<impl Into<String>>,
    ) -> Result<Option<Self>, DomainError> {
        match value {
            None => Ok(None),
            Some(raw) => {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    Ok(None)
                } else {
                    Self::parse(raw).map(Some)
                }
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Post subject line. Required, at most 20 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject(String);

impl Subject {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_owned();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("subject", "cannot be empty"));
        }
        if value.chars().count() > 20 {
            return Err(DomainError::invalid_argument(
                "subject",
                "cannot exceed 20 characters",
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Post body. Required, unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Description(String);

impl Description {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::invalid_argument(
                "description",
                "cannot be empty",
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated account name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_owned();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("username", "cannot be empty"));
        }
        if value.chars().count() > 150 {
            return Err(DomainError::invalid_argument("username", "too long"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated account email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserEmail(String);

impl UserEmail {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_owned();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("email", "cannot be empty"));
        }
        if !value.contains('@') {
            return Err(DomainError::invalid_argument("email", "not a valid address"));
        }
        if value.chars().count() > 254 {
            return Err(DomainError::invalid_argument("email", "too long"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An already-hashed password. The plaintext never enters the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_name_rejects_empty_and_overlong() {
        assert!(PostName::parse("").is_err());
        assert!(PostName::parse("   ").is_err());
        assert!(PostName::parse("a".repeat(21)).is_err());
        assert_eq!(PostName::parse(" Ada ").unwrap().as_str(), "Ada");
        assert!(PostName::parse("a".repeat(20)).is_ok());
    }

    #[test]
    fn test_subject_limits() {
        assert!(Subject::parse("").is_err());
        assert!(Subject::parse("x".repeat(20)).is_ok());
        assert!(Subject::parse("x".repeat(21)).is_err());
    }

    #[test]
    fn test_contact_email_blank_means_absent() {
        assert_eq!(ContactEmail::parse_optional(None::<String>).unwrap(), None);
        assert_eq!(ContactEmail::parse_optional(Some("  ")).unwrap(), None);
        assert_eq!(
            ContactEmail::parse_optional(Some("ada@example.com"))
                .unwrap()
                .unwrap()
                .as_str(),
            "ada@example.com"
        );
        assert!(ContactEmail::parse_optional(Some("e".repeat(31))).is_err());
    }

    #[test]
    fn test_description_must_not_be_blank() {
        assert!(Description::parse("").is_err());
        assert!(Description::parse(" \n ").is_err());
        assert!(Description::parse("hello").is_ok());
    }

    #[test]
    fn test_username_and_email_validation() {
        assert!(Username::parse("").is_err());
        assert!(Username::parse("a".repeat(151)).is_err());
        assert!(Username::parse("ada").is_ok());

        assert!(UserEmail::parse("not-an-address").is_err());
        assert!(UserEmail::parse("ada@example.com").is_ok());
    }
}
