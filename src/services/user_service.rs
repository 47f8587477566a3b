use std::{sync::Arc, time::Duration};

use validator::Validate;

use crate::{
    auth::password::{hash_password, verify_password},
    errors::{AppError, AppResult},
    models::{domain::User, dto::request::CredentialsRequest},
    repositories::UserRepository,
    services::deadline::bounded,
};

pub struct UserService {
    repository: Arc<dyn UserRepository>,
    deadline: Duration,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, deadline: Duration) -> Self {
        Self {
            repository,
            deadline,
        }
    }

    pub async fn register(&self, mut request: CredentialsRequest) -> AppResult<User> {
        // Length limits apply to the login as stored
        request.login = request.login.trim().to_string();
        request.validate()?;

        let password_hash = hash_password(&request.password)?;
        let login = request.login;
        let user = User::new(&login, &password_hash);

        let user = bounded(
            self.deadline,
            "users.create",
            &login,
            self.repository.create(user),
        )
        .await?;

        log::info!("Registered user {} ({})", user.login, user.id);
        Ok(user)
    }

    pub async fn authenticate(&self, request: CredentialsRequest) -> AppResult<User> {
        let login = request.login.trim();
        if login.is_empty() {
            return Err(AppError::BadRequest("login is required".to_string()));
        }

        let user = bounded(
            self.deadline,
            "users.find_by_login",
            login,
            self.repository.find_by_login(login),
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", login)))?;

        if !verify_password(&request.password, &user.password_hash) {
            log::warn!("Failed login attempt for {}", login);
            return Err(AppError::Unauthorized("Password is not correct".to_string()));
        }

        Ok(user)
    }
}
