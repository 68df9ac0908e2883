// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Produtos abaixo deste estoque entram no alerta do dashboard
pub const LOW_STOCK_THRESHOLD: i32 = 10;

// --- Categorias ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: Uuid,
    #[schema(example = "Bebidas")]
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Usado tanto no POST quanto no PUT (substituição completa)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CategoryPayload {
    #[validate(length(min = 1, max = 100, message = "required"))]
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
}

// --- Produtos ---
// `category_name` vem do LEFT JOIN com categories
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Coca-Cola 350ml")]
    pub name: String,
    #[serde(rename = "category")]
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub description: Option<String>,
    #[schema(example = "5.50")]
    pub price: Decimal,
    #[schema(example = 42)]
    pub stock: i32,
    #[schema(example = "7894900011517")]
    pub barcode: Option<String>,
    #[serde(rename = "image")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Maior valor que cabe em NUMERIC(12,2): 9_999_999_999.99
/// (mantissa 999_999_999_999 = 0xE8_D4A5_0FFF, escala 2).
pub const MAX_MONEY: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Valor monetário: entre 0 e `MAX_MONEY`.
pub(crate) fn validate_money(val: &Decimal) -> Result<(), ValidationError> {
    if *val < Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("must_not_be_negative".into());
        return Err(err);
    }
    if *val > MAX_MONEY {
        let mut err = ValidationError::new("range");
        err.add_param("max".into(), &MAX_MONEY.to_string());
        err.message = Some("amount_too_large".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProductPayload {
    #[validate(length(min = 1, max = 200, message = "required"))]
    #[serde(default)]
    pub name: String,
    #[serde(rename = "category")]
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_money"))]
    pub price: Decimal,
    #[validate(range(min = 0, message = "must_not_be_negative"))]
    #[serde(default)]
    pub stock: i32,
    #[validate(length(min = 1, max = 100, message = "invalid_barcode"))]
    pub barcode: Option<String>,
    #[serde(rename = "image")]
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductSearchQuery {
    /// Trecho do nome ou do código de barras
    #[serde(default)]
    pub q: String,
    /// Restringe a busca a uma categoria
    pub category: Option<Uuid>,
}
