use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use stocksmith_api::app::{build_app, AppConfig};

const JWT_SECRET: &str = "test-secret";
const ADMIN_EMAIL: &str = "admin@test.local";
const ADMIN_PASSWORD: &str = "letmein";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = build_app(AppConfig {
            jwt_secret: JWT_SECRET.to_string(),
            admin_email: ADMIN_EMAIL.to_string(),
            admin_password: ADMIN_PASSWORD.to_string(),
        })
        .await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let res = reqwest::Client::new()
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "login failed for {email}");
        let body: serde_json::Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create_product(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    body: serde_json::Value,
) -> serde_json::Value {
    let res = client
        .post(format!("{}/products", base_url))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_can_login_and_inspect_identity() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["role"].as_str().unwrap(), "admin");
    assert!(body["permissions"].as_array().unwrap().iter().any(|p| p == "*"));
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let srv = TestServer::spawn().await;

    let res = reqwest::Client::new()
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": ADMIN_EMAIL, "password": "not-the-password" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn minted_token_for_unknown_user_is_rejected() {
    let srv = TestServer::spawn().await;

    // Structurally valid token, correct secret, but no such user.
    let now = chrono::Utc::now();
    let claims = json!({
        "sub": uuid::Uuid::now_v7(),
        "role": "admin",
        "issued_at": now,
        "expires_at": now + chrono::Duration::minutes(10),
    });
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let res = reqwest::Client::new()
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn product_lifecycle_with_price_history() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;
    let client = reqwest::Client::new();

    let created = create_product(
        &client,
        &srv.base_url,
        &token,
        json!({
            "sku": "SKU-001",
            "name": "Espresso Beans 1kg",
            "low_stock_threshold": 5,
            "purchase_price_cents": 850,
            "sale_price_cents": 1490,
        }),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["quantity"].as_i64().unwrap(), 0);
    assert!(created["low_stock"].as_bool().unwrap());

    // Price change appends a history snapshot.
    let res = client
        .put(format!("{}/products/{}", srv.base_url, id))
        .bearer_auth(&token)
        .json(&json!({ "sale_price_cents": 1590 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["sale_price_cents"].as_i64().unwrap(), 1590);

    let res = client
        .get(format!("{}/products/{}/prices", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let history: serde_json::Value = res.json().await.unwrap();
    let items = history["items"].as_array().unwrap();
    assert_eq!(items.len(), 2); // creation snapshot + price change
    assert_eq!(items[1]["sale_price_cents"].as_i64().unwrap(), 1590);

    // Name-only update adds nothing to the history.
    let res = client
        .put(format!("{}/products/{}", srv.base_url, id))
        .bearer_auth(&token)
        .json(&json!({ "name": "Espresso Beans 1kg (dark)" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res = client
        .get(format!("{}/products/{}/prices", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let history: serde_json::Value = res.json().await.unwrap();
    assert_eq!(history["items"].as_array().unwrap().len(), 2);

    let res = client
        .delete(format!("{}/products/{}", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!("{}/products/{}", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_sku_is_a_conflict() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;
    let client = reqwest::Client::new();

    create_product(
        &client,
        &srv.base_url,
        &token,
        json!({ "sku": "SKU-001", "name": "Beans" }),
    )
    .await;

    let res = client
        .post(format!("{}/products", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "sku": "SKU-001", "name": "Other Beans" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn keyword_search_filters_the_product_list() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;
    let client = reqwest::Client::new();

    create_product(
        &client,
        &srv.base_url,
        &token,
        json!({ "sku": "SKU-001", "name": "Espresso Beans" }),
    )
    .await;
    create_product(
        &client,
        &srv.base_url,
        &token,
        json!({ "sku": "SKU-002", "name": "Paper Filters" }),
    )
    .await;

    let res = client
        .get(format!("{}/products?q=espresso", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"].as_str().unwrap(), "Espresso Beans");
}

#[tokio::test]
async fn deleting_category_and_location_detaches_them_from_products() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/categories", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Coffee" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let category: serde_json::Value = res.json().await.unwrap();

    let res = client
        .post(format!("{}/locations", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Back room" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let location: serde_json::Value = res.json().await.unwrap();

    let product = create_product(
        &client,
        &srv.base_url,
        &token,
        json!({
            "sku": "SKU-001",
            "name": "Beans",
            "category_id": category["id"],
            "location_id": location["id"],
        }),
    )
    .await;
    assert_eq!(product["category_id"], category["id"]);
    assert_eq!(product["location_id"], location["id"]);

    let res = client
        .delete(format!(
            "{}/categories/{}",
            srv.base_url,
            category["id"].as_str().unwrap()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .delete(format!(
            "{}/locations/{}",
            srv.base_url,
            location["id"].as_str().unwrap()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!(
            "{}/products/{}",
            srv.base_url,
            product["id"].as_str().unwrap()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert!(fetched["category_id"].is_null());
    assert!(fetched["location_id"].is_null());
}

#[tokio::test]
async fn movements_enforce_the_non_negative_stock_invariant() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;
    let client = reqwest::Client::new();

    let product = create_product(
        &client,
        &srv.base_url,
        &token,
        json!({ "sku": "SKU-001", "name": "Beans", "purchase_price_cents": 100, "sale_price_cents": 200 }),
    )
    .await;
    let product_id = product["id"].as_str().unwrap().to_string();

    // Outbound from empty stock is rejected.
    let res = client
        .post(format!("{}/movements", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "product_id": product_id, "direction": "out", "quantity": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = client
        .post(format!("{}/movements", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "product_id": product_id, "direction": "in", "quantity": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let inbound: serde_json::Value = res.json().await.unwrap();
    // Unit price defaults to the product's purchase price for inbound.
    assert_eq!(inbound["unit_price_cents"].as_i64().unwrap(), 100);

    let res = client
        .post(format!("{}/movements", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "product_id": product_id, "direction": "out", "quantity": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let outbound: serde_json::Value = res.json().await.unwrap();

    let res = client
        .get(format!("{}/products/{}", srv.base_url, product_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched["quantity"].as_i64().unwrap(), 6);

    // Deleting the inbound movement would reverse -10 from 6: rejected.
    let res = client
        .delete(format!(
            "{}/movements/{}",
            srv.base_url,
            inbound["id"].as_str().unwrap()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Deleting the outbound movement restores its quantity.
    let res = client
        .delete(format!(
            "{}/movements/{}",
            srv.base_url,
            outbound["id"].as_str().unwrap()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!("{}/products/{}", srv.base_url, product_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched["quantity"].as_i64().unwrap(), 10);
}

#[tokio::test]
async fn product_with_movements_cannot_be_deleted() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;
    let client = reqwest::Client::new();

    let product = create_product(
        &client,
        &srv.base_url,
        &token,
        json!({ "sku": "SKU-001", "name": "Beans" }),
    )
    .await;
    let product_id = product["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/movements", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "product_id": product_id, "direction": "in", "quantity": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .delete(format!("{}/products/{}", srv.base_url, product_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn non_admin_is_denied_catalog_writes_but_can_read() {
    let srv = TestServer::spawn().await;
    let admin_token = srv.admin_token().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/admin/users", srv.base_url))
        .bearer_auth(&admin_token)
        .json(&json!({
            "email": "clerk@test.local",
            "display_name": "Clerk",
            "password": "hunter2",
            "role": "user",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let clerk_token = srv.login("clerk@test.local", "hunter2").await;

    let res = client
        .post(format!("{}/products", srv.base_url))
        .bearer_auth(&clerk_token)
        .json(&json!({ "sku": "SKU-001", "name": "Beans" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(format!("{}/products", srv.base_url))
        .bearer_auth(&clerk_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Movements are day-to-day work and stay open to the user role.
    let product = create_product(
        &client,
        &srv.base_url,
        &admin_token,
        json!({ "sku": "SKU-002", "name": "Filters" }),
    )
    .await;
    let res = client
        .post(format!("{}/movements", srv.base_url))
        .bearer_auth(&clerk_token)
        .json(&json!({ "product_id": product["id"], "direction": "in", "quantity": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn admins_cannot_change_their_own_role() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let whoami: serde_json::Value = res.json().await.unwrap();
    let my_id = whoami["user_id"].as_str().unwrap();

    let res = client
        .post(format!("{}/admin/users/{}/role", srv.base_url, my_id))
        .bearer_auth(&token)
        .json(&json!({ "role": "user" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn built_in_roles_are_protected() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/admin/roles", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let roles: serde_json::Value = res.json().await.unwrap();
    let admin_role = roles["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == "admin")
        .expect("admin role must be seeded")
        .clone();

    let res = client
        .delete(format!(
            "{}/admin/roles/{}",
            srv.base_url,
            admin_role["id"].as_str().unwrap()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn built_in_role_claims_can_be_updated_under_its_own_name() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/admin/roles", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let roles: serde_json::Value = res.json().await.unwrap();
    let user_role = roles["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == "user")
        .expect("user role must be seeded")
        .clone();

    // Echoing the current name alongside new claims must not be treated as
    // a rename of the built-in role.
    let res = client
        .put(format!(
            "{}/admin/roles/{}",
            srv.base_url,
            user_role["id"].as_str().unwrap()
        ))
        .bearer_auth(&token)
        .json(&json!({ "name": "user", "claims": ["products.read", "todos.read"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["name"], "user");
    let claims = updated["claims"].as_array().unwrap();
    assert_eq!(claims.len(), 2);
    assert!(claims.iter().any(|c| c == "todos.read"));
}

#[tokio::test]
async fn suspended_users_lose_access() {
    let srv = TestServer::spawn().await;
    let admin_token = srv.admin_token().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/admin/users", srv.base_url))
        .bearer_auth(&admin_token)
        .json(&json!({
            "email": "clerk@test.local",
            "display_name": "Clerk",
            "password": "hunter2",
            "role": "user",
        }))
        .send()
        .await
        .unwrap();
    let clerk: serde_json::Value = res.json().await.unwrap();
    let clerk_token = srv.login("clerk@test.local", "hunter2").await;

    let res = client
        .post(format!(
            "{}/admin/users/{}/suspend",
            srv.base_url,
            clerk["id"].as_str().unwrap()
        ))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Existing token is dead immediately, not at expiry.
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&clerk_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn dashboard_stats_reflect_recorded_movements() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;
    let client = reqwest::Client::new();

    let product = create_product(
        &client,
        &srv.base_url,
        &token,
        json!({
            "sku": "SKU-001",
            "name": "Beans",
            "purchase_price_cents": 100,
            "sale_price_cents": 250,
        }),
    )
    .await;

    let res = client
        .post(format!("{}/movements", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "product_id": product["id"], "direction": "in", "quantity": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .get(format!("{}/dashboard/stats", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let stats: serde_json::Value = res.json().await.unwrap();
    assert_eq!(stats["total_products"].as_i64().unwrap(), 1);
    assert_eq!(stats["total_stock_units"].as_i64().unwrap(), 10);
    assert_eq!(stats["inventory_purchase_value_cents"].as_i64().unwrap(), 1000);
    assert_eq!(stats["inventory_sale_value_cents"].as_i64().unwrap(), 2500);
    assert_eq!(stats["inbound_units_30d"].as_i64().unwrap(), 10);
}

#[tokio::test]
async fn chat_answers_stock_questions() {
    let srv = TestServer::spawn().await;
    let token = srv.admin_token().await;
    let client = reqwest::Client::new();

    let product = create_product(
        &client,
        &srv.base_url,
        &token,
        json!({ "sku": "SKU-001", "name": "Espresso Beans" }),
    )
    .await;
    let res = client
        .post(format!("{}/movements", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "product_id": product["id"], "direction": "in", "quantity": 7 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/chat", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "message": "how much espresso beans do we have?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let reply: serde_json::Value = res.json().await.unwrap();
    assert_eq!(reply["intent"]["kind"].as_str().unwrap(), "stock_of");
    assert_eq!(reply["data"]["quantity"].as_i64().unwrap(), 7);
    assert!(reply["text"].as_str().unwrap().contains("Espresso Beans"));
}
