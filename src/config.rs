// src/config.rs

use std::{env, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        CategoryRepository, CustomerRepository, DashboardRepository, ProductRepository,
        SaleRepository, UserRepository,
    },
    services::{auth::AuthService, CatalogService, CustomerService, DashboardService, SaleService},
};

// Configuração lida do ambiente (.env opcional)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub database_max_connections: u32,
    pub access_token_ttl: chrono::Duration,
    pub refresh_token_ttl: chrono::Duration,
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} inválida: '{raw}'")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 5)?,
            access_token_ttl: chrono::Duration::minutes(env_or("ACCESS_TOKEN_TTL_MINUTES", 60)?),
            refresh_token_ttl: chrono::Duration::days(env_or("REFRESH_TOKEN_TTL_DAYS", 7)?),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub customer_service: CustomerService,
    pub sale_service: SaleService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, config))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(db_pool: PgPool, config: &Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let category_repo = CategoryRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let sale_repo = SaleRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo,
            config.jwt_secret.clone(),
            config.access_token_ttl,
            config.refresh_token_ttl,
            db_pool.clone(),
        );
        let catalog_service = CatalogService::new(category_repo, product_repo.clone(), db_pool.clone());
        let customer_service = CustomerService::new(customer_repo.clone(), db_pool.clone());
        let sale_service = SaleService::new(sale_repo, product_repo, customer_repo, db_pool.clone());
        let dashboard_service = DashboardService::new(dashboard_repo);

        Self {
            db_pool,
            auth_service,
            catalog_service,
            customer_service,
            sale_service,
            dashboard_service,
        }
    }
}
