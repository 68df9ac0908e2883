// src/handlers/catalog.rs

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
    models::catalog::{Category, CategoryPayload, Product, ProductPayload, ProductSearchQuery},
};

// =========================================================================
//  CATEGORIAS
// =========================================================================

#[utoipa::path(
    get,
    path = "/api/categories/",
    tag = "Catalog",
    responses((status = 200, description = "Categorias ordenadas por nome", body = Vec<Category>)),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let categories = app_state
        .catalog_service
        .list_categories()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(categories))
}

#[utoipa::path(
    post,
    path = "/api/categories/",
    tag = "Catalog",
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 400, description = "Nome vazio ou duplicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let category = app_state
        .catalog_service
        .create_category(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}/",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 200, body = Category),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let category = app_state
        .catalog_service
        .get_category(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(category))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}/",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    request_body = CategoryPayload,
    responses(
        (status = 200, body = Category),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let category = app_state
        .catalog_service
        .update_category(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(category))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}/",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 204, description = "Removida; os produtos ficam sem categoria"),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .catalog_service
        .delete_category(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
//  PRODUTOS
// =========================================================================

#[utoipa::path(
    get,
    path = "/api/products/",
    tag = "Catalog",
    responses((status = 200, body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let products = app_state
        .catalog_service
        .list_products()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(products))
}

#[utoipa::path(
    post,
    path = "/api/products/",
    tag = "Catalog",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Preço/estoque negativo, barcode duplicado ou categoria inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let product = app_state
        .catalog_service
        .create_product(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = app_state
        .catalog_service
        .get_product(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(product))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}/",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = ProductPayload,
    responses(
        (status = 200, body = Product),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let product = app_state
        .catalog_service
        .update_product(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(product))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}/",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 204, description = "Removido"),
        (status = 400, description = "Produto já vendido (referenciado por itens de venda)"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .catalog_service
        .delete_product(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/products/category/{category_id}/",
    tag = "Catalog",
    params(("category_id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 200, body = Vec<Product>),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn products_by_category(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let products = app_state
        .catalog_service
        .products_by_category(category_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/api/products/search/",
    tag = "Catalog",
    params(ProductSearchQuery),
    responses((status = 200, description = "Busca por nome ou código de barras", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn search_products(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ProductSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let products = app_state
        .catalog_service
        .search_products(&query.q, query.category)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(products))
}
