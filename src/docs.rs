// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,

        // --- Users ---
        handlers::auth::get_profile,
        handlers::auth::update_profile,

        // --- Catalog ---
        handlers::catalog::list_categories,
        handlers::catalog::create_category,
        handlers::catalog::get_category,
        handlers::catalog::update_category,
        handlers::catalog::delete_category,
        handlers::catalog::list_products,
        handlers::catalog::create_product,
        handlers::catalog::get_product,
        handlers::catalog::update_product,
        handlers::catalog::delete_product,
        handlers::catalog::products_by_category,
        handlers::catalog::search_products,

        // --- Customers ---
        handlers::customers::list_customers,
        handlers::customers::create_customer,
        handlers::customers::get_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,
        handlers::customers::search_customers,

        // --- Sales ---
        handlers::sales::list_sales,
        handlers::sales::get_sale,
        handlers::sales::create_sale,
        handlers::sales::update_sale_status,

        // --- Dashboard ---
        handlers::dashboard::get_stats,
        handlers::dashboard::get_daily_sales,
        handlers::dashboard::get_weekly_sales,
        handlers::dashboard::get_monthly_sales,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::RefreshTokenPayload,
            models::auth::UpdateProfilePayload,
            models::auth::TokenPair,
            models::auth::AccessToken,

            // --- Catalog ---
            models::catalog::Category,
            models::catalog::CategoryPayload,
            models::catalog::Product,
            models::catalog::ProductPayload,

            // --- Customers ---
            models::customer::Customer,
            models::customer::CustomerPayload,

            // --- Sales ---
            models::sale::SaleStatus,
            models::sale::PaymentMethod,
            models::sale::Sale,
            models::sale::SaleItem,
            models::sale::SaleDetail,
            models::sale::SaleItemPayload,
            models::sale::CreateSalePayload,
            models::sale::UpdateSaleStatusPayload,
            models::sale::PaginatedSales,

            // --- Dashboard ---
            models::dashboard::DashboardStats,
            models::dashboard::TopProductEntry,
            models::dashboard::DailySalesEntry,
            models::dashboard::WeeklySalesEntry,
            models::dashboard::MonthlySalesEntry,
        )
    ),
    tags(
        (name = "Auth", description = "Registro e emissão de tokens"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Catalog", description = "Categorias e Produtos"),
        (name = "Customers", description = "Cadastro de Clientes"),
        (name = "Sales", description = "Vendas (checkout e histórico)"),
        (name = "Dashboard", description = "Indicadores e Gráficos Gerenciais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
