// src/models/customer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    #[schema(example = "Maria Souza")]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CustomerPayload {
    #[validate(length(min = 1, max = 200, message = "required"))]
    #[serde(default)]
    pub name: String,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    #[validate(length(max = 50, message = "too_long"))]
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Trecho de nome, e-mail ou telefone
    #[serde(default)]
    pub q: String,
}
