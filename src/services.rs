pub mod auth;
pub mod catalog_service;
pub use catalog_service::CatalogService;
pub mod customer_service;
pub use customer_service::CustomerService;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
pub mod sale_service;
pub use sale_service::SaleService;
