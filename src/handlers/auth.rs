// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::{
        AccessToken, LoginUserPayload, RefreshTokenPayload, RegisterUserPayload, TokenPair,
        UpdateProfilePayload, User,
    },
};

// POST /api/register/
#[utoipa::path(
    post,
    path = "/api/register/",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = User),
        (status = 400, description = "Dados inválidos ou usuário já existe")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let user = app_state
        .auth_service
        .register_user(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(user)))
}

// POST /api/token/
#[utoipa::path(
    post,
    path = "/api/token/",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Par de tokens (access + refresh)", body = TokenPair),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let tokens = app_state
        .auth_service
        .login_user(&payload.username, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(tokens))
}

// POST /api/token/refresh/
#[utoipa::path(
    post,
    path = "/api/token/refresh/",
    tag = "Auth",
    request_body = RefreshTokenPayload,
    responses(
        (status = 200, description = "Novo access token", body = AccessToken),
        (status = 401, description = "Refresh token inválido ou expirado")
    )
)]
pub async fn refresh(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RefreshTokenPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let access = app_state
        .auth_service
        .refresh_access_token(&payload.refresh)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(access))
}

// GET /api/profile/
#[utoipa::path(
    get,
    path = "/api/profile/",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário autenticado", body = User),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_profile(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

// PUT /api/profile/
#[utoipa::path(
    put,
    path = "/api/profile/",
    tag = "Users",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = User),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let updated = app_state
        .auth_service
        .update_profile(user.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(updated))
}
