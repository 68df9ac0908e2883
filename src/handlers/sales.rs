// src/handlers/sales.rs

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
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::sale::{CreateSalePayload, PaginatedSales, SaleDetail, SaleListQuery, UpdateSaleStatusPayload},
};

// GET /api/sales/
#[utoipa::path(
    get,
    path = "/api/sales/",
    tag = "Sales",
    params(SaleListQuery),
    responses(
        (status = 200, description = "Vendas paginadas, mais recentes primeiro", body = PaginatedSales),
        (status = 400, description = "Paginação inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<SaleListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .sale_service
        .list_sales(&query)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(page))
}

// GET /api/sales/{id}/
#[utoipa::path(
    get,
    path = "/api/sales/{id}/",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda com os itens", body = SaleDetail),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let sale = app_state
        .sale_service
        .get_sale(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(sale))
}

// POST /api/sales/create/
#[utoipa::path(
    post,
    path = "/api/sales/create/",
    tag = "Sales",
    request_body = CreateSalePayload,
    responses(
        (status = 201, description = "Venda registrada e estoque baixado", body = SaleDetail),
        (status = 400, description = "Carrinho inválido, estoque insuficiente ou total divergente"),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateSalePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let sale = app_state
        .sale_service
        .create_sale(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(sale)))
}

// PUT /api/sales/{id}/status/
#[utoipa::path(
    put,
    path = "/api/sales/{id}/status/",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    request_body = UpdateSaleStatusPayload,
    responses(
        (status = 200, description = "Status alterado", body = SaleDetail),
        (status = 400, description = "Transição não permitida"),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_sale_status(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSaleStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let sale = app_state
        .sale_service
        .change_status(id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(sale))
}
