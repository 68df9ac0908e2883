// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas
    let auth_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/register/", post(handlers::auth::register))
        .route("/token/", post(handlers::auth::login))
        .route("/token/refresh/", post(handlers::auth::refresh));

    let catalog_routes = Router::new()
        .route(
            "/categories/",
            get(handlers::catalog::list_categories).post(handlers::catalog::create_category),
        )
        .route(
            "/categories/{id}/",
            get(handlers::catalog::get_category)
                .put(handlers::catalog::update_category)
                .delete(handlers::catalog::delete_category),
        )
        .route(
            "/products/",
            get(handlers::catalog::list_products).post(handlers::catalog::create_product),
        )
        .route("/products/search/", get(handlers::catalog::search_products))
        .route(
            "/products/category/{category_id}/",
            get(handlers::catalog::products_by_category),
        )
        .route(
            "/products/{id}/",
            get(handlers::catalog::get_product)
                .put(handlers::catalog::update_product)
                .delete(handlers::catalog::delete_product),
        );

    let customer_routes = Router::new()
        .route(
            "/customers/",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route("/customers/search/", get(handlers::customers::search_customers))
        .route(
            "/customers/{id}/",
            get(handlers::customers::get_customer)
                .put(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        );

    let sale_routes = Router::new()
        .route("/sales/", get(handlers::sales::list_sales))
        .route("/sales/create/", post(handlers::sales::create_sale))
        .route("/sales/{id}/", get(handlers::sales::get_sale))
        .route("/sales/{id}/status/", put(handlers::sales::update_sale_status));

    let dashboard_routes = Router::new()
        .route("/dashboard/stats/", get(handlers::dashboard::get_stats))
        .route("/dashboard/sales/daily/", get(handlers::dashboard::get_daily_sales))
        .route("/dashboard/sales/weekly/", get(handlers::dashboard::get_weekly_sales))
        .route("/dashboard/sales/monthly/", get(handlers::dashboard::get_monthly_sales));

    // Tudo que não é público passa pelo auth_guard.
    // route_layer: rota inexistente continua sendo 404, não 401.
    let protected_routes = Router::new()
        .route(
            "/profile/",
            get(handlers::auth::get_profile).put(handlers::auth::update_profile),
        )
        .merge(catalog_routes)
        .merge(customer_routes)
        .merge(sale_routes)
        .merge(dashboard_routes)
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let api = Router::new().merge(auth_routes).merge(protected_routes);

    Router::new()
        .nest("/api", api)
        .with_state(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api/docs/openapi.json", ApiDoc::openapi()))
}
