// src/db/product_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError},
    models::{catalog::Product, sale::StockDeduction},
};

// Todas as leituras devolvem o nome da categoria junto
const PRODUCT_SELECT: &str = r#"
    SELECT
        p.id, p.name, p.category_id, c.name AS category_name, p.description,
        p.price, p.stock, p.barcode, p.image_url, p.created_at, p.updated_at
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
"#;

// Campos graváveis de um produto (POST e PUT)
pub struct ProductFields<'a> {
    pub name: &'a str,
    pub category_id: Option<Uuid>,
    pub description: Option<&'a str>,
    pub price: Decimal,
    pub stock: i32,
    pub barcode: Option<&'a str>,
    pub image_url: Option<&'a str>,
}

/// Monta o padrão do ILIKE escapando os curingas do próprio termo (`%`, `_`, `\`).
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.trim().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    pub async fn list(&self) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(&format!("{PRODUCT_SELECT} ORDER BY p.name ASC"))
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(&format!("{PRODUCT_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "{PRODUCT_SELECT} WHERE p.category_id = $1 ORDER BY p.name ASC"
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    /// Busca por trecho do nome OU do código de barras, sem diferenciar maiúsculas.
    pub async fn search(&self, term: &str, category_id: Option<Uuid>) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            {PRODUCT_SELECT}
            WHERE (p.name ILIKE $1 OR p.barcode ILIKE $1)
              AND ($2::uuid IS NULL OR p.category_id = $2)
            ORDER BY p.name ASC
            "#
        ))
        .bind(like_pattern(term))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    // ---
    // Escrita
    // ---

    pub async fn create(&self, fields: &ProductFields<'_>) -> Result<Uuid, AppError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO products (name, category_id, description, price, stock, barcode, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(fields.name)
        .bind(fields.category_id)
        .bind(fields.description)
        .bind(fields.price)
        .bind(fields.stock)
        .bind(fields.barcode)
        .bind(fields.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(map_constraint_error)?;
        Ok(id)
    }

    /// Retorna `false` se o produto não existia.
    pub async fn update(&self, id: Uuid, fields: &ProductFields<'_>) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = $2, category_id = $3, description = $4, price = $5,
                stock = $6, barcode = $7, image_url = $8, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(fields.name)
        .bind(fields.category_id)
        .bind(fields.description)
        .bind(fields.price)
        .bind(fields.stock)
        .bind(fields.barcode)
        .bind(fields.image_url)
        .execute(&self.pool)
        .await
        .map_err(map_constraint_error)?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_constraint_error)?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Estoque (sempre dentro da transação da venda)
    // ---

    /// Trava as linhas dos produtos do carrinho sempre na ordem do id.
    /// Com a ordem fixa, dois carrinhos com os mesmos produtos em ordens
    /// diferentes esperam um pelo outro em vez de entrar em deadlock.
    pub async fn lock_for_sale<'e, E>(&self, executor: E, product_ids: &[Uuid]) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let locked = sqlx::query_scalar(
            "SELECT id FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(product_ids)
        .fetch_all(executor)
        .await?;
        Ok(locked)
    }

    /// Baixa atômica com piso: só atualiza se houver saldo suficiente.
    /// O lock de linha do UPDATE serializa vendas concorrentes do mesmo produto.
    /// `None` = produto inexistente ou estoque insuficiente.
    pub async fn deduct_stock<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Option<StockDeduction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, StockDeduction>(
            r#"
            UPDATE products
            SET stock = stock - $2, updated_at = NOW()
            WHERE id = $1 AND stock >= $2
            RETURNING id, name, price, stock
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    pub async fn current_stock<'e, E>(&self, executor: E, product_id: Uuid) -> Result<Option<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stock = sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(executor)
            .await?;
        Ok(stock)
    }

    /// Devolve ao estoque tudo o que foi vendido em uma venda (cancelamento).
    pub async fn restore_stock_for_sale<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE products p
            SET stock = p.stock + si.quantity, updated_at = NOW()
            FROM (
                SELECT product_id, SUM(quantity)::int AS quantity
                FROM sale_items
                WHERE sale_id = $1
                GROUP BY product_id
            ) si
            WHERE p.id = si.product_id
            "#,
        )
        .bind(sale_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern("coca"), "%coca%");
        assert_eq!(like_pattern("  789 "), "%789%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern(""), "%%");
    }
}
