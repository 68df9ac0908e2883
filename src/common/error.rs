// src/common/error.rs

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::{
    common::i18n::{translate, translate_with},
    middleware::i18n::Locale,
    models::sale::SaleStatus,
};

// Erro interno de todas as camadas (repo -> service -> handler)
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] ValidationErrors),

    #[error("Nome de usuário já existe")]
    UsernameAlreadyExists,

    // Referência do payload (produto, cliente, categoria) que não existe
    #[error("Referência inexistente em '{field}'")]
    UnknownReference { field: String },

    #[error("Estoque insuficiente para o produto {product_id}")]
    InsufficientStock {
        field: String,
        product_id: Uuid,
        available: i32,
        requested: i32,
    },

    // Valor calculado que não cabe na coluna NUMERIC(12,2)
    #[error("Valor fora do intervalo em '{field}'")]
    AmountOutOfRange { field: String },

    #[error("Total informado ({received}) difere do calculado ({expected})")]
    TotalMismatch { expected: Decimal, received: Decimal },

    #[error("Valor pago ({paid}) menor que o total ({total})")]
    InsufficientPayment { total: Decimal, paid: Decimal },

    #[error("Transição de status inválida: {from:?} -> {to:?}")]
    InvalidStatusTransition { from: SaleStatus, to: SaleStatus },

    #[error("Violação de unicidade em '{0}'")]
    UniqueConstraintViolation(String),

    #[error("Registro referenciado em '{0}'")]
    ForeignKeyViolation(String),

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// Erro "pronto para o cliente": status + mensagem já traduzida
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    fn new(status: StatusCode, error: String) -> Self {
        Self { status, error, details: None }
    }

    fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

fn field_detail(field: &str, message: String) -> Value {
    json!({ field: [message] })
}

/// Achata os erros do validator (inclusive listas aninhadas, ex: `items[0].quantity`)
/// em um mapa campo -> mensagens traduzidas.
pub fn flatten_validation_errors(errors: &ValidationErrors, lang: &str) -> BTreeMap<String, Vec<String>> {
    let mut out = BTreeMap::new();
    collect_errors(errors, "", lang, &mut out);
    out
}

fn collect_errors(
    errors: &ValidationErrors,
    prefix: &str,
    lang: &str,
    out: &mut BTreeMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors
                    .iter()
                    .map(|e| {
                        let key = e.message.as_deref().unwrap_or(&e.code);
                        translate(lang, key)
                    })
                    .collect();
                out.insert(path, messages);
            }
            ValidationErrorsKind::Struct(inner) => collect_errors(inner, &path, lang, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_errors(inner, &format!("{path}[{index}]"), lang, out);
                }
            }
        }
    }
}

impl AppError {
    pub fn to_api_error(self, locale: &Locale) -> ApiError {
        let lang = locale.0.as_str();
        let bad_request = |key: &str| ApiError::new(StatusCode::BAD_REQUEST, translate(lang, key));

        match self {
            AppError::ValidationError(errors) => {
                let details = flatten_validation_errors(&errors, lang);
                bad_request("validation_failed").with_details(json!(details))
            }
            AppError::UsernameAlreadyExists => bad_request("username_exists")
                .with_details(field_detail("username", translate(lang, "username_exists"))),
            AppError::UnknownReference { field } => bad_request("validation_failed")
                .with_details(field_detail(&field, translate(lang, "unknown_reference"))),
            AppError::InsufficientStock { field, available, requested, .. } => {
                let message = translate_with(
                    lang,
                    "insufficient_stock",
                    &[("available", available.to_string()), ("requested", requested.to_string())],
                );
                bad_request("validation_failed").with_details(field_detail(&field, message))
            }
            AppError::AmountOutOfRange { field } => bad_request("validation_failed")
                .with_details(field_detail(&field, translate(lang, "amount_too_large"))),
            AppError::TotalMismatch { expected, .. } => {
                let message = translate_with(lang, "total_mismatch", &[("expected", expected.to_string())]);
                bad_request("validation_failed").with_details(field_detail("total_amount", message))
            }
            AppError::InsufficientPayment { total, .. } => {
                let message = translate_with(lang, "insufficient_payment", &[("total", total.to_string())]);
                bad_request("validation_failed").with_details(field_detail("paid_amount", message))
            }
            AppError::InvalidStatusTransition { from, to } => {
                let message = translate_with(
                    lang,
                    "invalid_status_transition",
                    &[("from", from.as_str().to_string()), ("to", to.as_str().to_string())],
                );
                bad_request("validation_failed").with_details(field_detail("status", message))
            }
            AppError::UniqueConstraintViolation(field) => bad_request("validation_failed")
                .with_details(field_detail(&field, translate(lang, "unique_violation"))),
            AppError::ForeignKeyViolation(_) => bad_request("foreign_key_violation"),
            AppError::BadRequest(reason) => {
                tracing::debug!("Requisição inválida: {}", reason);
                bad_request("bad_request").with_details(json!({ "reason": reason }))
            }
            AppError::NotFound(resource) => {
                ApiError::new(StatusCode::NOT_FOUND, translate(lang, "not_found"))
                    .with_details(json!({ "resource": resource }))
            }
            AppError::InvalidCredentials => {
                ApiError::new(StatusCode::UNAUTHORIZED, translate(lang, "invalid_credentials"))
            }
            AppError::InvalidToken => ApiError::new(StatusCode::UNAUTHORIZED, translate(lang, "invalid_token")),

            // Todos os outros erros (banco, bcrypt, jwt, anyhow) viram 500.
            // O detalhe vai para o log, nunca para o cliente.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, translate(lang, "internal_error"))
            }
        }
    }
}

// Usado onde não temos o Locale em mãos (ex: middleware de autenticação)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

/// Converte violações de constraint do Postgres em erros de domínio.
/// Os nomes vêm das migrations (`<tabela>_<coluna>_key` / `_fkey`).
pub(crate) fn map_constraint_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        let constraint = db_err.constraint().unwrap_or_default();
        if db_err.is_unique_violation() {
            return match constraint {
                "users_username_key" => AppError::UsernameAlreadyExists,
                "categories_name_key" => AppError::UniqueConstraintViolation("name".into()),
                "products_barcode_key" => AppError::UniqueConstraintViolation("barcode".into()),
                other => AppError::UniqueConstraintViolation(other.to_string()),
            };
        }
        if db_err.is_foreign_key_violation() {
            return match constraint {
                "products_category_id_fkey" => AppError::UnknownReference { field: "category".into() },
                "sales_customer_id_fkey" => AppError::UnknownReference { field: "customer".into() },
                other => AppError::ForeignKeyViolation(other.to_string()),
            };
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Line {
        #[validate(range(min = 1, message = "must_be_positive"))]
        quantity: i32,
    }

    #[derive(Validate)]
    struct Cart {
        #[validate(length(min = 1, message = "required"))]
        name: String,
        #[validate(nested)]
        items: Vec<Line>,
    }

    #[test]
    fn nested_list_errors_are_flattened_with_index() {
        let cart = Cart {
            name: String::new(),
            items: vec![Line { quantity: 1 }, Line { quantity: 0 }],
        };
        let errors = cart.validate().unwrap_err();
        let flat = flatten_validation_errors(&errors, "en");

        assert_eq!(flat["name"], vec!["This field is required.".to_string()]);
        assert_eq!(
            flat["items[1].quantity"],
            vec!["This value must be greater than zero.".to_string()]
        );
        assert!(!flat.contains_key("items[0].quantity"));
    }

    #[test]
    fn status_codes() {
        let en = Locale::default();
        assert_eq!(AppError::NotFound("Product").to_api_error(&en).status, StatusCode::NOT_FOUND);
        assert_eq!(AppError::InvalidToken.to_api_error(&en).status, StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::UsernameAlreadyExists.to_api_error(&en).status, StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).to_api_error(&en).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn insufficient_stock_points_at_the_line() {
        let err = AppError::InsufficientStock {
            field: "items[2].quantity".into(),
            product_id: Uuid::new_v4(),
            available: 1,
            requested: 4,
        };
        let api = err.to_api_error(&Locale("pt".into()));
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(
            details["items[2].quantity"][0],
            "Estoque insuficiente (disponível: 1, solicitado: 4)."
        );
    }

    #[test]
    fn amount_out_of_range_is_a_field_error() {
        let api = AppError::AmountOutOfRange { field: "total_amount".into() }.to_api_error(&Locale::default());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            api.details.unwrap()["total_amount"][0],
            "Ensure this value is at most 9999999999.99."
        );
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let api = AppError::InternalServerError(anyhow::anyhow!("senha do banco"))
            .to_api_error(&Locale::default());
        assert_eq!(api.error, "An unexpected error occurred.");
        assert!(api.details.is_none());
    }
}
