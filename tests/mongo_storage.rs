//! Integration tests for the MongoDB store backends.
//!
//! # Requirements
//!
//! - Docker must be running (testcontainers launches a MongoDB container)
//! - Feature flag `container-tests` must be enabled
//!
//! # Running
//!
//! ```sh
//! cargo test --features container-tests --test mongo_storage -- --test-threads=1
//! ```
//!
//! # Test isolation
//!
//! All tests share a single MongoDB container (via `OnceLock`); each test
//! gets its own database so suites cannot interfere with each other.

#![cfg(feature = "container-tests")]

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use mongodb::Client;
use serde_json::json;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::mongo::Mongo;
use uuid::Uuid;

use aquarota::domain::order::{CreateOrderRequest, Order, OrderStatus};
use aquarota::domain::route::{CreateRouteRequest, DeliveryRoute, RouteStatus};
use aquarota::domain::user::{CreateUserRequest, User};
use aquarota::storage::{
    MongoOrderStore, MongoRouteStore, MongoUserStore, OrderStore, RouteStore, UserStore,
};

// ---------------------------------------------------------------------------
// Shared test environment (single container, fresh database per test)
// ---------------------------------------------------------------------------

/// Holds the testcontainer handle (keeps it alive) and the connection URL.
struct MongoTestEnv {
    /// Container handle — dropping this stops the MongoDB container.
    _container: testcontainers::ContainerAsync<Mongo>,
    /// Connection URL for creating per-test clients.
    connection_url: String,
}

static TEST_ENV: OnceLock<MongoTestEnv> = OnceLock::new();

async fn init_mongo_env() -> &'static MongoTestEnv {
    if let Some(env) = TEST_ENV.get() {
        return env;
    }

    let container = Mongo::default()
        .start()
        .await
        .expect("Failed to start MongoDB container — is Docker running?");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(27017).await.unwrap();
    let url = format!("mongodb://{}:{}", host, port);

    let env = MongoTestEnv {
        _container: container,
        connection_url: url,
    };

    let _ = TEST_ENV.set(env);
    TEST_ENV.get().unwrap()
}

/// Atomic counter to generate unique database names per test.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Create a fresh client with a unique database for test isolation.
async fn mongo_database() -> mongodb::Database {
    let env = init_mongo_env().await;
    let client = Client::with_uri_str(&env.connection_url)
        .await
        .expect("Failed to connect to MongoDB");
    let db_num = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    client.database(&format!("aquarota_test_{}", db_num))
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn order(customer: &str, total: f64) -> Order {
    Order::new(
        serde_json::from_value::<CreateOrderRequest>(json!({
            "customerName": customer,
            "phone": "(11) 91234-5678",
            "address": "Rua das Flores, 123",
            "items": 2,
            "paymentMethod": "pix",
            "total": total
        }))
        .unwrap(),
    )
}

fn route(name: &str) -> DeliveryRoute {
    DeliveryRoute::new(CreateRouteRequest {
        name: name.to_string(),
        delivery_man: "João".to_string(),
        orders: vec![],
    })
}

fn user(email: &str) -> User {
    User::new(CreateUserRequest {
        name: "Carlos".to_string(),
        email: email.to_string(),
        password: "secret-pw".to_string(),
        role: None,
    })
    .unwrap()
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[tokio::test]
async fn order_crud_roundtrip() {
    let store = MongoOrderStore::new(mongo_database().await);

    let created = store.create(order("Maria", 24.0)).await.unwrap();
    let fetched = store.get(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.status, OrderStatus::Pending);
    assert_eq!(fetched.customer_name, "Maria");

    let mut updated = fetched.clone();
    updated.set_status(OrderStatus::Delivered);
    let stored = store.update(&created.id, updated).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Delivered);

    assert!(store.delete(&created.id).await.unwrap());
    assert!(!store.delete(&created.id).await.unwrap());
    assert!(store.get(&created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn order_update_missing_returns_none() {
    let store = MongoOrderStore::new(mongo_database().await);
    let result = store.update(&Uuid::new_v4(), order("X", 1.0)).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn order_list_is_newest_first() {
    let store = MongoOrderStore::new(mongo_database().await);
    let first = store.create(order("First", 10.0)).await.unwrap();
    let second = store.create(order("Second", 20.0)).await.unwrap();

    let all = store.list().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, second.id);
    assert_eq!(all[1].id, first.id);
}

#[tokio::test]
async fn order_stats_pipeline_groups_and_sums() {
    let store = MongoOrderStore::new(mongo_database().await);
    store.create(order("A", 10.0)).await.unwrap();
    store.create(order("B", 15.0)).await.unwrap();
    let mut delivered = order("C", 30.0);
    delivered.set_status(OrderStatus::Delivered);
    store.create(delivered).await.unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.len(), 2);

    let pending = stats
        .iter()
        .find(|s| s.status == OrderStatus::Pending)
        .unwrap();
    assert_eq!(pending.count, 2);
    assert!((pending.total_value - 25.0).abs() < f64::EPSILON);
}

// ---------------------------------------------------------------------------
// Delivery routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn route_list_mutations_are_atomic_updates() {
    let store = MongoRouteStore::new(mongo_database().await);
    let created = store.create(route("Centro")).await.unwrap();
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    store.add_order(&created.id, &a).await.unwrap().unwrap();
    store.add_order(&created.id, &b).await.unwrap().unwrap();
    let after_add = store.add_order(&created.id, &c).await.unwrap().unwrap();
    assert_eq!(after_add.orders, vec![a, b, c]);

    let after_remove = store.remove_order(&created.id, &b).await.unwrap().unwrap();
    assert_eq!(after_remove.orders, vec![a, c]);

    let after_reorder = store.reorder(&created.id, &[c, a]).await.unwrap().unwrap();
    assert_eq!(after_reorder.orders, vec![c, a]);

    // Survives a read back
    let fetched = store.get(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched.orders, vec![c, a]);
}

#[tokio::test]
async fn route_mutations_on_missing_route_return_none() {
    let store = MongoRouteStore::new(mongo_database().await);
    let id = Uuid::new_v4();
    assert!(store.add_order(&id, &Uuid::new_v4()).await.unwrap().is_none());
    assert!(store.remove_order(&id, &Uuid::new_v4()).await.unwrap().is_none());
    assert!(store.reorder(&id, &[]).await.unwrap().is_none());
}

#[tokio::test]
async fn route_stats_pipeline_sums_order_list_sizes() {
    let store = MongoRouteStore::new(mongo_database().await);

    let first = store.create(route("Centro")).await.unwrap();
    store.add_order(&first.id, &Uuid::new_v4()).await.unwrap();
    store.add_order(&first.id, &Uuid::new_v4()).await.unwrap();
    store.create(route("Zona Sul")).await.unwrap();

    let mut completed = route("Zona Norte");
    completed.set_status(RouteStatus::Completed);
    completed.orders.push(Uuid::new_v4());
    store.create(completed).await.unwrap();

    let stats = store.stats().await.unwrap();

    let pending = stats
        .iter()
        .find(|s| s.status == RouteStatus::Pending)
        .unwrap();
    assert_eq!(pending.count, 2);
    assert_eq!(pending.total_orders, 2);

    let completed = stats
        .iter()
        .find(|s| s.status == RouteStatus::Completed)
        .unwrap();
    assert_eq!(completed.count, 1);
    assert_eq!(completed.total_orders, 1);
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn user_unique_email_index_rejects_duplicates() {
    let store = MongoUserStore::new(mongo_database().await);
    store.ensure_indexes().await.unwrap();

    store.create(user("ana@example.com")).await.unwrap();
    let err = store.create(user("ana@example.com")).await.unwrap_err();

    // The duplicate surfaces as a typed error handlers map to 400.
    use aquarota::core::error::ApiError;
    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::Duplicate { field: "email" })
    ));
}

#[tokio::test]
async fn user_find_by_email_and_password_survive_storage() {
    let store = MongoUserStore::new(mongo_database().await);
    store.ensure_indexes().await.unwrap();

    let created = store.create(user("carlos@example.com")).await.unwrap();

    let found = store
        .find_by_email("carlos@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, created.id);
    assert!(found.verify_password("secret-pw"));
    assert!(store.find_by_email("nobody@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn ensure_indexes_is_idempotent() {
    let store = MongoUserStore::new(mongo_database().await);
    store.ensure_indexes().await.unwrap();
    store.ensure_indexes().await.unwrap();
}
