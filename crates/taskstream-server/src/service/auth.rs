use crate::auth::{create_access_token, hash_password, verify_password};
use crate::error::ApiError;
use crate::state::AppState;
use serde::Deserialize;
use taskstream_common::models::auth::{User, UserRole};
use taskstream_common::validation::validate_new_user;
use taskstream_db::UserRepo;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A freshly authenticated user plus their access token.
#[derive(Debug)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}

/// Register a new account. Self-registration always yields the `user` role;
/// admin accounts only come from the seeded initial admin.
pub async fn register(state: &AppState, req: &RegisterRequest) -> Result<AuthPayload, ApiError> {
    let name = req.name.as_deref().unwrap_or("").trim();
    let email = req.email.as_deref().unwrap_or("").trim();
    let password = req.password.as_deref().unwrap_or("");

    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation(
            "Name, email and password are required".to_string(),
        ));
    }

    let errors = validate_new_user(name, email, password);
    if !errors.is_empty() {
        return Err(ApiError::Validation(format!(
            "Invalid data: {}",
            errors.join(", ")
        )));
    }

    if UserRepo::email_exists(&state.pool, email).await? {
        return Err(ApiError::Validation("Email already in use".to_string()));
    }

    let password_hash = hash_password(password)?;
    let row = UserRepo::create(
        &state.pool,
        Uuid::new_v4(),
        name,
        email,
        &password_hash,
        UserRole::User.as_str(),
    )
    .await?;

    let token = create_access_token(
        &row.user_id.to_string(),
        &row.email,
        UserRole::User,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_secs,
    )?;

    Ok(AuthPayload {
        user: super::user_to_model(&row)?,
        token,
    })
}

/// Authenticate by email and password. Unknown email and wrong password are
/// indistinguishable to the caller.
pub async fn login(state: &AppState, email: &str, password: &str) -> Result<AuthPayload, ApiError> {
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let Some(row) = UserRepo::get_by_email(&state.pool, email).await? else {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    };

    if !verify_password(password, &row.password_hash)? {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let user = super::user_to_model(&row)?;
    let token = create_access_token(
        &row.user_id.to_string(),
        &row.email,
        user.role,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_secs,
    )?;

    Ok(AuthPayload { user, token })
}
