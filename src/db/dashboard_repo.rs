// src/db/dashboard_repo.rs

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::dashboard::{CatalogCounts, DailyTotal, TopProductEntry},
};

// Somente leitura: nenhuma query aqui trava linhas.
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Quantidade e soma das vendas COMPLETED por dia (UTC), no intervalo fechado.
    /// Dias sem venda simplesmente não aparecem.
    pub async fn daily_totals(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailyTotal>, AppError> {
        let rows = sqlx::query_as::<_, DailyTotal>(
            r#"
            SELECT
                (created_at AT TIME ZONE 'UTC')::date AS day,
                COUNT(*) AS count,
                COALESCE(SUM(total_amount), 0) AS amount
            FROM sales
            WHERE status = 'COMPLETED'
              AND (created_at AT TIME ZONE 'UTC')::date BETWEEN $1 AND $2
            GROUP BY 1
            ORDER BY 1 ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn catalog_counts(&self, low_stock_threshold: i32) -> Result<CatalogCounts, AppError> {
        let counts = sqlx::query_as::<_, CatalogCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM products) AS total_products,
                (SELECT COUNT(*) FROM categories) AS total_categories,
                (SELECT COUNT(*) FROM customers) AS total_customers,
                (SELECT COUNT(*) FROM products WHERE stock < $1) AS low_stock
            "#,
        )
        .bind(low_stock_threshold)
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    // Ranking por quantidade vendida (empate resolvido pelo nome)
    pub async fn top_products(&self, limit: i64) -> Result<Vec<TopProductEntry>, AppError> {
        let rows = sqlx::query_as::<_, TopProductEntry>(
            r#"
            SELECT
                p.name AS product_name,
                SUM(si.quantity)::bigint AS sold
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            JOIN products p ON p.id = si.product_id
            WHERE s.status = 'COMPLETED'
            GROUP BY p.id, p.name
            ORDER BY sold DESC, p.name ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
