use crate::{
    error::AppError,
    reset::{AppResetService, CheckCodeRequest, CreatePasswordRequest, SendCodeRequest},
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Request a password-reset code
///
/// Emails a fresh 5-digit code to the account and (re-)creates its reset
/// record with a full attempt budget. Delivery is dispatched in the
/// background; the response does not wait for it.
#[post("/send_code")]
pub async fn send_code(
    service: web::Data<AppResetService>,
    payload: web::Json<SendCodeRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    service
        .issue_code(&payload.email)
        .await
        .map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "detail": "Code sent to your email"
    })))
}

/// Check a reset code
///
/// Verifies the submitted code against the pending one. Every call spends one
/// of the code's five attempts, including calls with the correct code.
#[post("/check_code")]
pub async fn check_code(
    service: web::Data<AppResetService>,
    payload: web::Json<CheckCodeRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let verification = service
        .verify_code(&payload.email, &payload.code)
        .await
        .map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "correct": true,
        "user_id": verification.user_id
    })))
}

/// Complete the password reset
///
/// Re-verifies the code (spending an attempt), replaces the account password,
/// revokes any live session token and deletes the reset record.
#[post("/create_password")]
pub async fn create_password(
    service: web::Data<AppResetService>,
    payload: web::Json<CreatePasswordRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    service
        .consume_code(
            payload.user_id,
            &payload.code,
            &payload.new_password,
            &payload.confirm_password,
        )
        .await
        .map_err(AppError::from)?;

    Ok(HttpResponse::Created().json(json!({
        "detail": "Password created"
    })))
}
