pub mod category_repo;
pub use category_repo::CategoryRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod product_repo;
pub use product_repo::{ProductFields, ProductRepository};
pub mod sale_repo;
pub use sale_repo::{NewSale, SaleFilter, SaleRepository};
pub mod user_repo;
pub use user_repo::UserRepository;
