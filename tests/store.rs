// tests/store.rs
//
// Fluxos completos contra um Postgres real. Ficam fora do `cargo test` padrão:
//   TEST_DATABASE_URL=postgres://... cargo test --test store -- --ignored

mod support;

use axum::{
    http::{Method, StatusCode},
    Router,
};
use serde_json::{json, Value};
use support::{app, db_state, send, unique};

struct Session {
    app: Router,
    token: String,
}

async fn session() -> Session {
    let app = app(db_state().await);
    let username = unique("caixa");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/register/",
        None,
        Some(json!({ "username": username, "password": "segredo123", "email": "caixa@loja.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, tokens) = send(
        &app,
        Method::POST,
        "/api/token/",
        None,
        Some(json!({ "username": username, "password": "segredo123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let token = tokens["access"].as_str().unwrap().to_string();
    Session { app, token }
}

impl Session {
    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        send(&self.app, Method::GET, uri, Some(&self.token), None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        send(&self.app, Method::POST, uri, Some(&self.token), Some(body)).await
    }

    async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        send(&self.app, Method::PUT, uri, Some(&self.token), Some(body)).await
    }

    async fn product(&self, name: &str, price: f64, stock: i32) -> Value {
        let (status, product) = self
            .post(
                "/api/products/",
                json!({ "name": name, "price": price, "stock": stock, "barcode": unique("789") }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{product}");
        product
    }

    async fn stock_of(&self, product: &Value) -> i64 {
        let (_, current) = self.get(&format!("/api/products/{}/", product["id"].as_str().unwrap())).await;
        current["stock"].as_i64().unwrap()
    }
}

#[tokio::test]
#[ignore = "precisa de Postgres (TEST_DATABASE_URL)"]
async fn sale_decrements_stock_and_persists_items() {
    let s = session().await;
    let coffee = s.product(&unique("Café"), 12.5, 10).await;
    let bread = s.product(&unique("Pão"), 0.75, 100).await;

    let (status, sale) = s
        .post(
            "/api/sales/create/",
            json!({
                "payment_method": "CASH",
                "paid_amount": 30.0,
                "total_amount": 28.0,
                "items": [
                    { "product": coffee["id"], "quantity": 2, "price": 12.5 },
                    { "product": bread["id"], "quantity": 4 }
                ]
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{sale}");
    assert_eq!(sale["status"], "COMPLETED");
    assert_eq!(sale["total_amount"].as_f64().unwrap(), 28.0);
    assert_eq!(sale["change_amount"].as_f64().unwrap(), 2.0);
    assert!(sale["reference_no"].as_str().unwrap().starts_with("SALE-"));

    let items = sale["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["product"], coffee["id"]);
    assert_eq!(items[1]["total"].as_f64().unwrap(), 3.0);
    let sum: f64 = items.iter().map(|i| i["total"].as_f64().unwrap()).sum();
    assert_eq!(sum, 28.0);

    assert_eq!(s.stock_of(&coffee).await, 8);
    assert_eq!(s.stock_of(&bread).await, 96);
}

#[tokio::test]
#[ignore = "precisa de Postgres (TEST_DATABASE_URL)"]
async fn insufficient_stock_rolls_back_the_whole_sale() {
    let s = session().await;
    let water = s.product(&unique("Água"), 2.0, 5).await;
    let soda = s.product(&unique("Refrigerante"), 6.0, 1).await;

    let (status, body) = s
        .post(
            "/api/sales/create/",
            json!({
                "items": [
                    { "product": water["id"], "quantity": 3 },
                    { "product": soda["id"], "quantity": 2 }
                ]
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["items[1].quantity"].is_array(), "{body}");
    assert_eq!(s.stock_of(&water).await, 5);
    assert_eq!(s.stock_of(&soda).await, 1);
}

#[tokio::test]
#[ignore = "precisa de Postgres (TEST_DATABASE_URL)"]
async fn duplicate_lines_share_the_stock_floor() {
    let s = session().await;
    let gum = s.product(&unique("Chiclete"), 0.5, 3).await;

    let (status, body) = s
        .post(
            "/api/sales/create/",
            json!({ "items": [
                { "product": gum["id"], "quantity": 2 },
                { "product": gum["id"], "quantity": 2 }
            ]}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["items[1].quantity"].is_array(), "{body}");
    assert_eq!(s.stock_of(&gum).await, 3);
}

#[tokio::test]
#[ignore = "precisa de Postgres (TEST_DATABASE_URL)"]
async fn unknown_product_and_bad_totals_are_rejected() {
    let s = session().await;
    let milk = s.product(&unique("Leite"), 4.0, 10).await;

    let (status, body) = s
        .post(
            "/api/sales/create/",
            json!({ "items": [{ "product": uuid::Uuid::new_v4(), "quantity": 1 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["items[0].product"].is_array(), "{body}");

    let (status, body) = s
        .post(
            "/api/sales/create/",
            json!({ "total_amount": 7.0, "items": [{ "product": milk["id"], "quantity": 2 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["total_amount"].is_array(), "{body}");

    let (status, body) = s
        .post(
            "/api/sales/create/",
            json!({ "paid_amount": 5.0, "items": [{ "product": milk["id"], "quantity": 2 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["paid_amount"].is_array(), "{body}");

    let (status, body) = s.post("/api/sales/create/", json!({ "items": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["items"].is_array(), "{body}");

    assert_eq!(s.stock_of(&milk).await, 10);
}

#[tokio::test]
#[ignore = "precisa de Postgres (TEST_DATABASE_URL)"]
async fn cancelling_restores_stock_and_is_terminal() {
    let s = session().await;
    let rice = s.product(&unique("Arroz"), 20.0, 4).await;

    let (status, sale) = s
        .post(
            "/api/sales/create/",
            json!({ "status": "PENDING", "paid_amount": 0, "items": [{ "product": rice["id"], "quantity": 3 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{sale}");
    assert_eq!(s.stock_of(&rice).await, 1);

    let uri = format!("/api/sales/{}/status/", sale["id"].as_str().unwrap());

    // Pendente sem pagamento não pode ser concluída
    let (status, _) = s.put(&uri, json!({ "status": "COMPLETED" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, cancelled) = s.put(&uri, json!({ "status": "CANCELLED" })).await;
    assert_eq!(status, StatusCode::OK, "{cancelled}");
    assert_eq!(cancelled["status"], "CANCELLED");
    assert_eq!(s.stock_of(&rice).await, 4);

    let (status, _) = s.put(&uri, json!({ "status": "COMPLETED" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "precisa de Postgres (TEST_DATABASE_URL)"]
async fn duplicate_username_creates_no_user() {
    let s = session().await;
    let username = unique("repetido");
    let payload = json!({ "username": username, "password": "segredo123", "email": "r@loja.com" });

    let (status, _) = send(&s.app, Method::POST, "/api/register/", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&s.app, Method::POST, "/api/register/", None, Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["username"].is_array());

    // O primeiro cadastro continua válido
    let (status, _) = send(
        &s.app,
        Method::POST,
        "/api/token/",
        None,
        Some(json!({ "username": username, "password": "segredo123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "precisa de Postgres (TEST_DATABASE_URL)"]
async fn product_search_matches_name_or_barcode() {
    let s = session().await;
    let marker = unique("Bolacha");
    let (status, product) = s
        .post(
            "/api/products/",
            json!({ "name": marker, "price": 3.2, "stock": 5, "barcode": format!("BC{}", &marker[8..]) }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{product}");

    let (_, by_name) = s.get(&format!("/api/products/search/?q={}", marker.to_uppercase())).await;
    assert_eq!(by_name.as_array().unwrap().len(), 1);

    let barcode = product["barcode"].as_str().unwrap().to_lowercase();
    let (_, by_barcode) = s.get(&format!("/api/products/search/?q={barcode}")).await;
    assert_eq!(by_barcode[0]["id"], product["id"]);
}

#[tokio::test]
#[ignore = "precisa de Postgres (TEST_DATABASE_URL)"]
async fn category_delete_keeps_products() {
    let s = session().await;
    let (status, category) = s.post("/api/categories/", json!({ "name": unique("Bebidas") })).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, dup) = s.post("/api/categories/", json!({ "name": category["name"] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{dup}");

    let (status, product) = s
        .post(
            "/api/products/",
            json!({ "name": unique("Suco"), "price": 7.0, "stock": 2, "category": category["id"] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(product["category_name"], category["name"]);

    let category_id = category["id"].as_str().unwrap();
    let (_, listed) = s.get(&format!("/api/products/category/{category_id}/")).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &s.app,
        Method::DELETE,
        &format!("/api/categories/{category_id}/"),
        Some(&s.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, product) = s.get(&format!("/api/products/{}/", product["id"].as_str().unwrap())).await;
    assert!(product["category"].is_null());
}

#[tokio::test]
#[ignore = "precisa de Postgres (TEST_DATABASE_URL)"]
async fn dashboard_series_have_fixed_lengths() {
    let s = session().await;
    let today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();

    let (status, daily) = s.get("/api/dashboard/sales/daily/").await;
    assert_eq!(status, StatusCode::OK);
    let daily = daily.as_array().unwrap();
    assert_eq!(daily.len(), 7);
    assert_eq!(daily[6]["date"], today.as_str());

    let (_, weekly) = s.get("/api/dashboard/sales/weekly/").await;
    let weekly = weekly.as_array().unwrap();
    assert_eq!(weekly.len(), 4);
    assert_eq!(weekly[3]["end_date"], today.as_str());

    let (_, monthly) = s.get("/api/dashboard/sales/monthly/").await;
    assert_eq!(monthly.as_array().unwrap().len(), 6);

    let (status, stats) = s.get("/api/dashboard/stats/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(stats["top_products"].as_array().unwrap().len() <= 5);
}

#[tokio::test]
#[ignore = "precisa de Postgres (TEST_DATABASE_URL)"]
async fn sales_listing_is_paginated() {
    let s = session().await;
    let (status, page) = s.get("/api/sales/?page=1&page_size=2").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page["count"].is_i64());
    assert!(page["results"].as_array().unwrap().len() <= 2);

    let (status, _) = s.get("/api/sales/?page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "precisa de Postgres (TEST_DATABASE_URL)"]
async fn amounts_beyond_the_money_column_are_field_errors() {
    let s = session().await;

    let (status, body) = s
        .post("/api/products/", json!({ "name": unique("Ouro"), "price": 1e11, "stock": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["price"].is_array(), "{body}");

    let item = s.product(&unique("Lote"), 1.0, 10).await;
    let (status, body) = s
        .post(
            "/api/sales/create/",
            json!({ "items": [{ "product": item["id"], "quantity": 3, "price": 5e9 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["total_amount"].is_array(), "{body}");
    assert_eq!(s.stock_of(&item).await, 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "precisa de Postgres (TEST_DATABASE_URL)"]
async fn concurrent_carts_in_opposite_order_all_complete() {
    let s = session().await;
    let a = s.product(&unique("Produto A"), 1.0, 1000).await;
    let b = s.product(&unique("Produto B"), 2.0, 1000).await;

    let mut tasks = Vec::new();
    for round in 0..12 {
        let (first, second) = if round % 2 == 0 { (&a, &b) } else { (&b, &a) };
        let body = json!({ "items": [
            { "product": first["id"], "quantity": 1 },
            { "product": second["id"], "quantity": 1 }
        ]});
        let app = s.app.clone();
        let token = s.token.clone();
        tasks.push(tokio::spawn(async move {
            send(&app, Method::POST, "/api/sales/create/", Some(&token), Some(body)).await
        }));
    }

    for task in tasks {
        let (status, body) = task.await.unwrap();
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }
    assert_eq!(s.stock_of(&a).await, 988);
    assert_eq!(s.stock_of(&b).await, 988);
}
