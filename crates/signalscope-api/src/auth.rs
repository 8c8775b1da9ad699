use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use tracing::error;
use uuid::Uuid;

use signalscope_types::api::{LoginRequest, RegisterRequest, TokenResponse};
use signalscope_types::models::User;

use crate::error::ApiError;
use crate::{AppState, format_timestamp, parse_timestamp, password};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db()?;

    // Emails are case-insensitive identities; normalize before storing so
    // lookups and the unique index agree.
    let email = req.email.trim().to_lowercase();
    let password_hash = password::hash_password(&req.password)?;

    let user_id = Uuid::new_v4();
    let created_at = Utc::now();

    let row_email = email.clone();
    let row_name = req.name.clone();
    let stamp = format_timestamp(created_at);
    tokio::task::spawn_blocking(move || {
        db.create_user(&user_id.to_string(), &row_email, &password_hash, &row_name, &stamp)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.into())
    })??;

    let token = state.tokens.issue(user_id)?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            access_token: token,
            token_type: "bearer".to_string(),
            user: User {
                id: user_id,
                email,
                name: req.name,
                created_at,
            },
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db()?;

    let email = req.email.trim().to_lowercase();
    let plaintext = req.password;

    // Lookup and Argon2 verification are both blocking work; one closure
    // keeps unknown-email and wrong-password paths indistinguishable.
    let row = tokio::task::spawn_blocking(move || {
        let row = db.find_user_by_email(&email)?;
        Ok::<_, signalscope_db::StoreError>(
            row.filter(|r| password::verify_password(&plaintext, &r.password)),
        )
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.into())
    })??
    .ok_or(ApiError::InvalidCredentials)?;

    let user_id: Uuid = row
        .id
        .parse()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("corrupt user id '{}': {e}", row.id)))?;

    let token = state.tokens.issue(user_id)?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user: User {
            id: user_id,
            email: row.email,
            name: row.name,
            created_at: parse_timestamp(&row.created_at, "user"),
        },
    }))
}
