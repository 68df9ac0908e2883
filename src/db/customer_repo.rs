// src/db/customer_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError},
    db::product_repo::like_pattern,
    models::customer::{Customer, CustomerPayload},
};

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(customers)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    // Nome, e-mail ou telefone (ILIKE)
    pub async fn search(&self, term: &str) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM customers
            WHERE name ILIKE $1 OR email ILIKE $1 OR phone ILIKE $1
            ORDER BY name ASC
            "#,
        )
        .bind(like_pattern(term))
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    pub async fn create(&self, payload: &CustomerPayload) -> Result<Customer, AppError> {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, email, phone, address)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(payload.email.as_deref())
        .bind(payload.phone.as_deref())
        .bind(payload.address.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(map_constraint_error)
    }

    pub async fn update(&self, id: Uuid, payload: &CustomerPayload) -> Result<Option<Customer>, AppError> {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = $2, email = $3, phone = $4, address = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(payload.email.as_deref())
        .bind(payload.phone.as_deref())
        .bind(payload.address.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_constraint_error)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_constraint_error)?;
        Ok(result.rows_affected() > 0)
    }
}
