// src/services/customer_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CustomerRepository,
    models::customer::{Customer, CustomerPayload},
};

#[derive(Clone)]
pub struct CustomerService {
    customer_repo: CustomerRepository,
    pool: PgPool,
}

impl CustomerService {
    pub fn new(customer_repo: CustomerRepository, pool: PgPool) -> Self {
        Self { customer_repo, pool }
    }

    pub async fn list(&self) -> Result<Vec<Customer>, AppError> {
        self.customer_repo.list().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Customer, AppError> {
        self.customer_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("Customer"))
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Customer>, AppError> {
        self.customer_repo.search(term).await
    }

    pub async fn create(&self, payload: &CustomerPayload) -> Result<Customer, AppError> {
        let customer = self.customer_repo.create(payload).await?;
        tracing::info!(customer_id = %customer.id, "Cliente criado");
        Ok(customer)
    }

    pub async fn update(&self, id: Uuid, payload: &CustomerPayload) -> Result<Customer, AppError> {
        self.customer_repo
            .update(id, payload)
            .await?
            .ok_or(AppError::NotFound("Customer"))
    }

    // As vendas do cliente ficam (customer_id vira NULL)
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.customer_repo.delete(id).await? {
            return Err(AppError::NotFound("Customer"));
        }
        Ok(())
    }
}
