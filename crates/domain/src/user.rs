use crate::value_objects::{PasswordHash, Timestamp, UserEmail, UserId, Username};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: UserEmail,
    // The hash must never leave the server.
    #[serde(skip_serializing)]
    pub password: PasswordHash,
    /// Staff accounts may use the admin surface.
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: Timestamp,
}

/// An account that has not been stored yet; the id is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub email: UserEmail,
    pub password: PasswordHash,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: Timestamp,
}

impl NewUser {
    /// A regular account, active immediately.
    pub fn register(
        username: Username,
        email: UserEmail,
        password: PasswordHash,
        now: Timestamp,
    ) -> Self {
        Self {
            username,
            email,
            password,
            is_staff: false,
            is_active: true,
            date_joined: now,
        }
    }

    /// A staff account, used when bootstrapping the admin surface.
    pub fn register_staff(
        username: Username,
        email: UserEmail,
        password: PasswordHash,
        now: Timestamp,
    ) -> Self {
        Self {
            is_staff: true,
            ..Self::register(username, email, password, now)
        }
    }
}

impl User {
    pub fn set_password(&mut self, password: PasswordHash) {
        self.password = password;
    }
}
