use std::sync::Arc;

use domain::{
    DomainError, NewUser, RepositoryError, UserEmail, UserId, Username,
};

use crate::{
    clock::Clock, dto::UserDto, error::ApplicationError, password::PasswordHasher,
    repository::UserRepository,
};

#[derive(Debug, Clone)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AuthenticateUserRequest {
    pub username: String,
    pub password: String,
}

/// Admin-side account update; the password is changed through other flows.
#[derive(Debug, Clone)]
pub struct UpdateUserRequest {
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub is_active: bool,
}

pub struct AccountServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub clock: Arc<dyn Clock>,
}

pub struct AccountService {
    deps: AccountServiceDependencies,
}

impl AccountService {
    pub fn new(deps: AccountServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn register(
        &self,
        request: RegisterUserRequest,
    ) -> Result<UserDto, ApplicationError> {
        self.register_with_role(request, false).await
    }

    /// Registration for a staff account; used by the admin bootstrap command.
    pub async fn register_staff(
        &self,
        request: RegisterUserRequest,
    ) -> Result<UserDto, ApplicationError> {
        self.register_with_role(request, true).await
    }

    async fn register_with_role(
        &self,
        request: RegisterUserRequest,
        is_staff: bool,
    ) -> Result<UserDto, ApplicationError> {
        let username = Username::parse(request.username)?;
        let email = UserEmail::parse(request.email)?;
        validate_password(&request.password, username.as_str())?;

        if self
            .deps
            .user_repository
            .find_by_username(username.as_str())
            .await?
            .is_some()
        {
            return Err(DomainError::UserAlreadyExists.into());
        }

        let password = self.deps.password_hasher.hash(&request.password).await?;
        let now = self.deps.clock.now();
        let user = if is_staff {
            NewUser::register_staff(username, email, password, now)
        } else {
            NewUser::register(username, email, password, now)
        };

        // The unique index backs up the pre-check under concurrent registration.
        let stored = match self.deps.user_repository.create(user).await {
            Err(RepositoryError::Conflict) => {
                return Err(DomainError::UserAlreadyExists.into())
            }
            other => other?,
        };
        Ok(UserDto::from(&stored))
    }

    pub async fn authenticate(
        &self,
        request: AuthenticateUserRequest,
    ) -> Result<UserDto, ApplicationError> {
        let user = self
            .deps
            .user_repository
            .find_by_username(request.username.trim())
            .await?
            .ok_or(ApplicationError::Authentication)?;

        let password_ok = self
            .deps
            .password_hasher
            .verify(&request.password, &user.password)
            .await?;
        if !password_ok || !user.is_active {
            return Err(ApplicationError::Authentication);
        }

        Ok(UserDto::from(&user))
    }

    pub async fn get(&self, id: i64) -> Result<UserDto, ApplicationError> {
        let user = self
            .deps
            .user_repository
            .find_by_id(UserId(id))
            .await?
            .ok_or(DomainError::UserNotFound)?;
        Ok(UserDto::from(&user))
    }

    pub async fn list(&self) -> Result<Vec<UserDto>, ApplicationError> {
        let users = self.deps.user_repository.list().await?;
        Ok(users.iter().map(UserDto::from).collect())
    }

    pub async fn update(
        &self,
        id: i64,
        request: UpdateUserRequest,
    ) -> Result<UserDto, ApplicationError> {
        let mut user = self
            .deps
            .user_repository
            .find_by_id(UserId(id))
            .await?
            .ok_or(DomainError::UserNotFound)?;

        user.username = Username::parse(request.username)?;
        user.email = UserEmail::parse(request.email)?;
        user.is_staff = request.is_staff;
        user.is_active = request.is_active;

        let stored = match self.deps.user_repository.update(user).await {
            Err(RepositoryError::Conflict) => {
                return Err(DomainError::UserAlreadyExists.into())
            }
            other => other?,
        };
        Ok(UserDto::from(&stored))
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApplicationError> {
        match self.deps.user_repository.delete(UserId(id)).await {
            Err(RepositoryError::NotFound) => Err(DomainError::UserNotFound.into()),
            other => other.map_err(Into::into),
        }
    }
}

/// Minimal password policy: at least 8 characters, not entirely numeric, and
/// not equal to the username.
fn validate_password(plaintext: &str, username: &str) -> Result<(), DomainError> {
    if plaintext.chars().count() < 8 {
        return Err(DomainError::invalid_argument(
            "password",
            "must be at least 8 characters",
        ));
    }
    if plaintext.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::invalid_argument(
            "password",
            "cannot be entirely numeric",
        ));
    }
    if plaintext.eq_ignore_ascii_case(username) {
        return Err(DomainError::invalid_argument(
            "password",
            "cannot be the same as the username",
        ));
    }
    Ok(())
}
