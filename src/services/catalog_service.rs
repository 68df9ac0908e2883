// src/services/catalog_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CategoryRepository, ProductFields, ProductRepository},
    models::catalog::{Category, CategoryPayload, Product, ProductPayload},
};

#[derive(Clone)]
pub struct CatalogService {
    category_repo: CategoryRepository,
    product_repo: ProductRepository,
    pool: PgPool,
}

// Strings vazias do formulário viram NULL (barcode é UNIQUE quando presente)
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn product_fields(payload: &ProductPayload) -> ProductFields<'_> {
    ProductFields {
        name: payload.name.trim(),
        category_id: payload.category_id,
        description: non_blank(&payload.description),
        price: payload.price,
        stock: payload.stock,
        barcode: non_blank(&payload.barcode),
        image_url: non_blank(&payload.image_url),
    }
}

impl CatalogService {
    pub fn new(category_repo: CategoryRepository, product_repo: ProductRepository, pool: PgPool) -> Self {
        Self { category_repo, product_repo, pool }
    }

    // ---
    // Categorias
    // ---

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.category_repo.list().await
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Category, AppError> {
        self.category_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("Category"))
    }

    pub async fn create_category(&self, payload: &CategoryPayload) -> Result<Category, AppError> {
        self.category_repo
            .create(payload.name.trim(), non_blank(&payload.description))
            .await
    }

    pub async fn update_category(&self, id: Uuid, payload: &CategoryPayload) -> Result<Category, AppError> {
        self.category_repo
            .update(id, payload.name.trim(), non_blank(&payload.description))
            .await?
            .ok_or(AppError::NotFound("Category"))
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), AppError> {
        if !self.category_repo.delete(id).await? {
            return Err(AppError::NotFound("Category"));
        }
        tracing::info!(category_id = %id, "Categoria removida");
        Ok(())
    }

    // ---
    // Produtos
    // ---

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.product_repo.list().await
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, AppError> {
        self.product_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("Product"))
    }

    pub async fn products_by_category(&self, category_id: Uuid) -> Result<Vec<Product>, AppError> {
        // 404 para categoria inexistente, lista vazia para categoria sem produtos
        self.get_category(category_id).await?;
        self.product_repo.list_by_category(category_id).await
    }

    pub async fn search_products(&self, term: &str, category_id: Option<Uuid>) -> Result<Vec<Product>, AppError> {
        self.product_repo.search(term, category_id).await
    }

    pub async fn create_product(&self, payload: &ProductPayload) -> Result<Product, AppError> {
        let id = self.product_repo.create(&product_fields(payload)).await?;
        tracing::info!(product_id = %id, name = %payload.name, "Produto criado");
        self.get_product(id).await
    }

    pub async fn update_product(&self, id: Uuid, payload: &ProductPayload) -> Result<Product, AppError> {
        if !self.product_repo.update(id, &product_fields(payload)).await? {
            return Err(AppError::NotFound("Product"));
        }
        self.get_product(id).await
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), AppError> {
        if !self.product_repo.delete(id).await? {
            return Err(AppError::NotFound("Product"));
        }
        tracing::info!(product_id = %id, "Produto removido");
        Ok(())
    }
}
