use crate::{
    auth::{
        generate_token, hash_password, verify_password, AuthResponse, AuthenticatedUserId,
        LoginRequest, RegisterRequest, UpdatePasswordRequest,
    },
    error::AppError,
    models::User,
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Records `token` as the account's single live token, replacing any
/// previous one. The auth middleware only honors the recorded token, so this
/// doubles as "log out everywhere else".
async fn record_token(pool: &PgPool, user_id: i32, token: &str) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO auth_tokens (user_id, token) VALUES ($1, $2)
         ON CONFLICT (user_id) DO UPDATE SET token = EXCLUDED.token, created_at = now()",
    )
    .bind(user_id)
    .bind(token)
    .execute(pool)
    .await?;

    Ok(())
}

/// Register a new user
///
/// Creates a new user account and returns an authentication token.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    register_data.validate()?;

    // Check if email already exists
    let existing_user: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(&register_data.email)
        .fetch_optional(&**pool)
        .await?;

    if existing_user.is_some() {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    // Hash password
    let password_hash = hash_password(&register_data.password)?;

    // Insert new user
    let (user_id,): (i32,) = sqlx::query_as(
        "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&register_data.username)
    .bind(&register_data.email)
    .bind(&password_hash)
    .fetch_one(&**pool)
    .await?;

    // Generate and record token
    let token = generate_token(user_id)?;
    record_token(&pool, user_id, &token).await?;

    Ok(HttpResponse::Created().json(AuthResponse { token, user_id }))
}

/// Login user
///
/// Authenticates a user and returns an authentication token.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    login_data.validate()?;

    // Get user from database
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, created_at FROM users WHERE email = $1",
    )
    .bind(&login_data.email)
    .fetch_optional(&**pool)
    .await?;

    match user {
        Some(user) => {
            // Verify password
            if verify_password(&login_data.password, &user.password_hash)? {
                let token = generate_token(user.id)?;
                record_token(&pool, user.id, &token).await?;

                Ok(HttpResponse::Ok().json(AuthResponse {
                    token,
                    user_id: user.id,
                }))
            } else {
                Err(AppError::Unauthorized("Invalid credentials".into()))
            }
        }
        None => Err(AppError::Unauthorized("Invalid credentials".into())),
    }
}

/// Change password
///
/// Replaces the password of an authenticated account. Requires the old
/// password to match, the new one to differ from it, and the confirmation to
/// repeat the new one.
#[post("/update_password")]
pub async fn update_password(
    pool: web::Data<PgPool>,
    user: AuthenticatedUserId,
    payload: web::Json<UpdatePasswordRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    if payload.new_password != payload.confirm_password {
        return Err(AppError::BadRequest("Passwords do not match".into()));
    }
    if payload.new_password == payload.old_password {
        return Err(AppError::BadRequest(
            "New password must differ from the old one".into(),
        ));
    }

    let (password_hash,): (String,) =
        sqlx::query_as("SELECT password_hash FROM users WHERE id = $1")
            .bind(user.0)
            .fetch_one(&**pool)
            .await?;

    if !verify_password(&payload.old_password, &password_hash)? {
        return Err(AppError::BadRequest("Old password incorrect".into()));
    }

    let new_hash = hash_password(&payload.new_password)?;
    sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(&new_hash)
        .bind(user.0)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "detail": "Password was changed"
    })))
}
