// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    #[schema(example = "caixa01")]
    pub username: String,
    #[schema(example = "caixa01@loja.com")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserPayload {
    #[validate(length(min = 3, max = 150, message = "invalid_username"))]
    #[serde(default)]
    pub username: String,
    #[validate(length(min = 6, message = "password_too_short"))]
    #[serde(default)]
    pub password: String,
    #[validate(email(message = "invalid_email"))]
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(length(min = 1, message = "required"))]
    pub username: String,
    #[validate(length(min = 1, message = "required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenPayload {
    #[validate(length(min = 1, message = "required"))]
    pub refresh: String,
}

// PUT /profile: todos os campos são opcionais
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfilePayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: Option<String>,
}

// Resposta do login
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccessToken {
    pub access: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
    pub token_type: TokenType,
}
