// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// 1. Cards do topo
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub today_sales_count: i64,
    pub today_sales_amount: Decimal,
    pub total_products: i64,
    pub total_categories: i64,
    pub total_customers: i64,
    pub low_stock: i64,
    pub top_products: Vec<TopProductEntry>,
}

// Contagens simples do catálogo (uma query só)
#[derive(Debug, FromRow)]
pub struct CatalogCounts {
    pub total_products: i64,
    pub total_categories: i64,
    pub total_customers: i64,
    pub low_stock: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TopProductEntry {
    #[schema(example = "Coca-Cola 350ml")]
    pub product_name: String,
    #[schema(example = 128)]
    pub sold: i64,
}

// Linha bruta vinda do GROUP BY por dia (só vendas COMPLETED)
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DailyTotal {
    pub day: NaiveDate,
    pub count: i64,
    pub amount: Decimal,
}

// 2. Gráficos
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailySalesEntry {
    #[schema(example = "2026-10-19")]
    pub date: String,
    #[schema(example = "Mon")]
    pub day: String,
    pub amount: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WeeklySalesEntry {
    #[schema(example = "Week 1")]
    pub week: String,
    pub start_date: String,
    pub end_date: String,
    pub amount: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlySalesEntry {
    #[schema(example = "October 2026")]
    pub month: String,
    pub amount: Decimal,
    pub count: i64,
}
