// src/handlers/dashboard.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::dashboard::{DailySalesEntry, DashboardStats, MonthlySalesEntry, WeeklySalesEntry},
};

// GET /api/dashboard/stats/
#[utoipa::path(
    get,
    path = "/api/dashboard/stats/",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Indicadores do dia e do catálogo", body = DashboardStats),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let stats = app_state
        .dashboard_service
        .stats()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(stats))
}

// GET /api/dashboard/sales/daily/
#[utoipa::path(
    get,
    path = "/api/dashboard/sales/daily/",
    tag = "Dashboard",
    responses((status = 200, description = "Últimos 7 dias", body = Vec<DailySalesEntry>)),
    security(("api_jwt" = []))
)]
pub async fn get_daily_sales(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .dashboard_service
        .daily_sales()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(entries))
}

// GET /api/dashboard/sales/weekly/
#[utoipa::path(
    get,
    path = "/api/dashboard/sales/weekly/",
    tag = "Dashboard",
    responses((status = 200, description = "Últimas 4 semanas", body = Vec<WeeklySalesEntry>)),
    security(("api_jwt" = []))
)]
pub async fn get_weekly_sales(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .dashboard_service
        .weekly_sales()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(entries))
}

// GET /api/dashboard/sales/monthly/
#[utoipa::path(
    get,
    path = "/api/dashboard/sales/monthly/",
    tag = "Dashboard",
    responses((status = 200, description = "Últimos 6 meses", body = Vec<MonthlySalesEntry>)),
    security(("api_jwt" = []))
)]
pub async fn get_monthly_sales(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .dashboard_service
        .monthly_sales()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(entries))
}
