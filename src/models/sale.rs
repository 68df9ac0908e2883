// src/models/sale.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::catalog::validate_money;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sale_status", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum SaleStatus {
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "completed")]
    Completed,
    #[serde(alias = "cancelled")]
    Cancelled,
}

impl SaleStatus {
    /// Transições permitidas depois do checkout.
    /// CANCELLED é terminal; não existe "voltar" para PENDING.
    pub fn can_transition_to(self, next: SaleStatus) -> bool {
        matches!(
            (self, next),
            (SaleStatus::Pending, SaleStatus::Completed)
                | (SaleStatus::Pending, SaleStatus::Cancelled)
                | (SaleStatus::Completed, SaleStatus::Cancelled)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SaleStatus::Pending => "PENDING",
            SaleStatus::Completed => "COMPLETED",
            SaleStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    #[serde(alias = "cash")]
    Cash,
    #[serde(alias = "card")]
    Card,
    #[serde(alias = "bank_transfer")]
    BankTransfer,
    #[serde(alias = "mobile")]
    Mobile,
    #[serde(alias = "other")]
    Other,
}

// --- Cabeçalho da venda ---
// customer_name e user_name vêm dos LEFT JOINs
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Sale {
    pub id: Uuid,
    #[schema(example = "SALE-20261019-3F2A9B1C")]
    pub reference_no: String,
    #[serde(rename = "customer")]
    pub customer_id: Option<Uuid>,
    pub customer_name: Option<String>,
    #[serde(rename = "user")]
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub status: SaleStatus,
    #[schema(example = "25.00")]
    pub total_amount: Decimal,
    #[schema(example = "30.00")]
    pub paid_amount: Decimal,
    #[schema(example = "5.00")]
    pub change_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Itens da venda ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SaleItem {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub sale_id: Uuid,
    #[serde(rename = "product")]
    pub product_id: Uuid,
    pub product_name: String,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = "12.50")]
    pub price: Decimal,
    #[schema(example = "25.00")]
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// Linha do produto travada pelo UPDATE de baixa de estoque
#[derive(Debug, Clone, FromRow)]
pub struct StockDeduction {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
}

// ---
// Payloads
// ---

fn validate_initial_status(status: &SaleStatus) -> Result<(), ValidationError> {
    if *status == SaleStatus::Cancelled {
        let mut err = ValidationError::new("status");
        err.message = Some("invalid_initial_status".into());
        return Err(err);
    }
    Ok(())
}

// Serialize: o validator de tamanho em `items` registra a lista como parâmetro
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SaleItemPayload {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub product: Uuid,
    #[validate(range(min = 1, message = "must_be_positive"))]
    #[schema(example = 2)]
    pub quantity: i32,
    /// Preço unitário; se omitido usa o preço atual do produto
    #[validate(custom(function = "validate_money"))]
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSalePayload {
    pub customer: Option<Uuid>,
    #[validate(custom(function = "validate_initial_status"))]
    pub status: Option<SaleStatus>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Valor pago; se omitido a venda é considerada paga no valor exato
    #[validate(custom(function = "validate_money"))]
    pub paid_amount: Option<Decimal>,
    /// Total calculado pelo cliente, conferido contra o total do servidor
    #[validate(custom(function = "validate_money"))]
    pub total_amount: Option<Decimal>,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "at_least_one_item"))]
    #[validate(nested)]
    pub items: Vec<SaleItemPayload>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSaleStatusPayload {
    pub status: SaleStatus,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SaleListQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<SaleStatus>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedSales {
    pub count: i64,
    pub results: Vec<SaleDetail>,
}
