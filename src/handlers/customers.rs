// src/handlers/customers.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::customer::{Customer, CustomerPayload, SearchQuery},
};

#[utoipa::path(
    get,
    path = "/api/customers/",
    tag = "Customers",
    responses((status = 200, body = Vec<Customer>)),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let customers = app_state
        .customer_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(customers))
}

#[utoipa::path(
    post,
    path = "/api/customers/",
    tag = "Customers",
    request_body = CustomerPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Customer),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let customer = app_state
        .customer_service
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(customer)))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}/",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = app_state
        .customer_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(customer))
}

#[utoipa::path(
    put,
    path = "/api/customers/{id}/",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = CustomerPayload,
    responses(
        (status = 200, body = Customer),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<CustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let customer = app_state
        .customer_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(customer))
}

#[utoipa::path(
    delete,
    path = "/api/customers/{id}/",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Removido; as vendas do cliente são mantidas"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .customer_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/customers/search/",
    tag = "Customers",
    params(SearchQuery),
    responses((status = 200, description = "Busca por nome, e-mail ou telefone", body = Vec<Customer>)),
    security(("api_jwt" = []))
)]
pub async fn search_customers(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let customers = app_state
        .customer_service
        .search(&query.q)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(customers))
}
