// src/db/sale_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError},
    models::sale::{PaymentMethod, Sale, SaleItem, SaleStatus},
};

const SALE_SELECT: &str = r#"
    SELECT
        s.id, s.reference_no, s.customer_id, c.name AS customer_name,
        s.user_id, u.username AS user_name, s.status,
        s.total_amount, s.paid_amount, s.change_amount, s.payment_method,
        s.notes, s.created_at, s.updated_at
    FROM sales s
    LEFT JOIN customers c ON c.id = s.customer_id
    LEFT JOIN users u ON u.id = s.user_id
"#;

// Datas sempre comparadas em UTC, independente do timezone da sessão
const SALE_FILTERS: &str = r#"
    WHERE ($1::date IS NULL OR (s.created_at AT TIME ZONE 'UTC')::date >= $1)
      AND ($2::date IS NULL OR (s.created_at AT TIME ZONE 'UTC')::date <= $2)
      AND ($3::sale_status IS NULL OR s.status = $3)
"#;

// Cabeçalho inicial da venda (totais são gravados depois dos itens)
pub struct NewSale<'a> {
    pub reference_no: &'a str,
    pub customer_id: Option<Uuid>,
    pub user_id: Uuid,
    pub status: SaleStatus,
    pub payment_method: PaymentMethod,
    pub notes: Option<&'a str>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SaleFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<SaleStatus>,
}

#[derive(Clone)]
pub struct SaleRepository {
    pool: PgPool,
}

impl SaleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  ESCRITA (dentro da transação do SaleService)
    // =========================================================================

    pub async fn create_header<'e, E>(&self, executor: E, sale: &NewSale<'_>) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO sales (reference_no, customer_id, user_id, status, payment_method, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(sale.reference_no)
        .bind(sale.customer_id)
        .bind(sale.user_id)
        .bind(sale.status)
        .bind(sale.payment_method)
        .bind(sale.notes)
        .fetch_one(executor)
        .await
        .map_err(map_constraint_error)?;
        Ok(id)
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        product_id: Uuid,
        position: i32,
        quantity: i32,
        price: Decimal,
        total: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO sale_items (sale_id, product_id, position, quantity, price, total)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(sale_id)
        .bind(product_id)
        .bind(position)
        .bind(quantity)
        .bind(price)
        .bind(total)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn set_totals<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        total_amount: Decimal,
        paid_amount: Decimal,
        change_amount: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE sales
            SET total_amount = $2, paid_amount = $3, change_amount = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(sale_id)
        .bind(total_amount)
        .bind(paid_amount)
        .bind(change_amount)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Trava a linha da venda (SELECT ... FOR UPDATE) e devolve
    /// (status, total, pago) para decidir a transição.
    pub async fn lock_for_update<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Option<(SaleStatus, Decimal, Decimal)>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, (SaleStatus, Decimal, Decimal)>(
            "SELECT status, total_amount, paid_amount FROM sales WHERE id = $1 FOR UPDATE",
        )
        .bind(sale_id)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        status: SaleStatus,
        change_amount: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE sales SET status = $2, change_amount = $3, updated_at = NOW() WHERE id = $1")
            .bind(sale_id)
            .bind(status)
            .bind(change_amount)
            .execute(executor)
            .await?;
        Ok(())
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn find_by_id<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(&format!("{SALE_SELECT} WHERE s.id = $1"))
            .bind(sale_id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    /// Itens de várias vendas de uma vez (evita N+1 na listagem)
    pub async fn list_items<'e, E>(&self, executor: E, sale_ids: &[Uuid]) -> Result<Vec<SaleItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT
                si.id, si.sale_id, si.product_id, p.name AS product_name,
                si.quantity, si.price, si.total, si.created_at
            FROM sale_items si
            JOIN products p ON p.id = si.product_id
            WHERE si.sale_id = ANY($1)
            ORDER BY si.sale_id, si.position ASC
            "#,
        )
        .bind(sale_ids)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn count(&self, filter: &SaleFilter) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM sales s {SALE_FILTERS}"))
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // Mais recentes primeiro
    pub async fn list(&self, filter: &SaleFilter, limit: i64, offset: i64) -> Result<Vec<Sale>, AppError> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "{SALE_SELECT} {SALE_FILTERS} ORDER BY s.created_at DESC, s.id DESC LIMIT $4 OFFSET $5"
        ))
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }
}
