//! Store traits and backends
//!
//! Handlers talk to the stores through these traits; the backend is chosen
//! at startup. [`mongo`] is the production backend, [`in_memory`] backs the
//! integration tests and local development without a database.

pub mod in_memory;
pub mod mongo;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::order::{Order, OrderStats};
use crate::domain::route::{DeliveryRoute, RouteStats};
use crate::domain::user::User;

pub use in_memory::{InMemoryOrderStore, InMemoryRouteStore, InMemoryUserStore};
pub use mongo::{MongoOrderStore, MongoRouteStore, MongoUserStore};

/// Persistence operations for orders.
///
/// `update` returns `Ok(None)` when no document matched, so handlers can map
/// a missing entity to 404 without inspecting error strings. Listings come
/// back newest first.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create(&self, order: Order) -> Result<Order>;

    async fn list(&self) -> Result<Vec<Order>>;

    async fn get(&self, id: &Uuid) -> Result<Option<Order>>;

    async fn update(&self, id: &Uuid, order: Order) -> Result<Option<Order>>;

    /// Delete an order. Returns `false` when nothing matched.
    async fn delete(&self, id: &Uuid) -> Result<bool>;

    /// Group orders by status with a count and the sum of their totals.
    async fn stats(&self) -> Result<Vec<OrderStats>>;
}

/// Persistence operations for delivery routes.
///
/// The order list is mutated through dedicated operations so the backends
/// can apply them atomically; each returns the updated route, or `Ok(None)`
/// when the route does not exist.
#[async_trait]
pub trait RouteStore: Send + Sync {
    async fn create(&self, route: DeliveryRoute) -> Result<DeliveryRoute>;

    async fn list(&self) -> Result<Vec<DeliveryRoute>>;

    async fn get(&self, id: &Uuid) -> Result<Option<DeliveryRoute>>;

    async fn update(&self, id: &Uuid, route: DeliveryRoute) -> Result<Option<DeliveryRoute>>;

    async fn delete(&self, id: &Uuid) -> Result<bool>;

    /// Append an order reference to the route's list.
    async fn add_order(&self, id: &Uuid, order_id: &Uuid) -> Result<Option<DeliveryRoute>>;

    /// Remove every occurrence of an order reference from the route's list.
    async fn remove_order(&self, id: &Uuid, order_id: &Uuid) -> Result<Option<DeliveryRoute>>;

    /// Replace the route's order list verbatim with the given sequence.
    async fn reorder(&self, id: &Uuid, order_ids: &[Uuid]) -> Result<Option<DeliveryRoute>>;

    /// Group routes by status with a count and the sum of order-list lengths.
    async fn stats(&self) -> Result<Vec<RouteStats>>;
}

/// Persistence operations for staff accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: User) -> Result<User>;

    async fn list(&self) -> Result<Vec<User>>;

    async fn get(&self, id: &Uuid) -> Result<Option<User>>;

    /// Look up an account by its (unique) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn update(&self, id: &Uuid, user: User) -> Result<Option<User>>;

    async fn delete(&self, id: &Uuid) -> Result<bool>;
}
