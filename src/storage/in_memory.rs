//! In-memory store implementations for testing and development

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::core::error::ApiError;
use crate::domain::order::{Order, OrderStats, OrderStatus};
use crate::domain::route::{DeliveryRoute, RouteStats, RouteStatus};
use crate::domain::user::User;
use crate::storage::{OrderStore, RouteStore, UserStore};

// ---------------------------------------------------------------------------
// InMemoryOrderStore
// ---------------------------------------------------------------------------

/// Order store backed by a `RwLock<HashMap>`. Thread-safe, not persistent.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sort newest first, matching the Mongo backends' listing order.
fn sort_newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>) {
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: Order) -> Result<Order> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let orders = self
            .orders
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        let mut all: Vec<Order> = orders.values().cloned().collect();
        sort_newest_first(&mut all, |o| o.created_at);
        Ok(all)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Order>> {
        let orders = self
            .orders
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(orders.get(id).cloned())
    }

    async fn update(&self, id: &Uuid, order: Order) -> Result<Option<Order>> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        if !orders.contains_key(id) {
            return Ok(None);
        }
        orders.insert(*id, order.clone());
        Ok(Some(order))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        Ok(orders.remove(id).is_some())
    }

    async fn stats(&self) -> Result<Vec<OrderStats>> {
        let orders = self
            .orders
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        // Statuses with no orders are omitted, matching the $group pipeline.
        const STATUSES: [OrderStatus; 5] = [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::InDelivery,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ];

        Ok(STATUSES
            .into_iter()
            .filter_map(|status| {
                let group: Vec<&Order> =
                    orders.values().filter(|o| o.status == status).collect();
                if group.is_empty() {
                    return None;
                }
                Some(OrderStats {
                    status,
                    count: group.len() as u64,
                    total_value: group.iter().map(|o| o.total).sum(),
                })
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// InMemoryRouteStore
// ---------------------------------------------------------------------------

/// Delivery-route store backed by a `RwLock<HashMap>`.
#[derive(Clone, Default)]
pub struct InMemoryRouteStore {
    routes: Arc<RwLock<HashMap<Uuid, DeliveryRoute>>>,
}

impl InMemoryRouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutate a route in place, stamping `updated_at`.
    fn mutate(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut DeliveryRoute),
    ) -> Result<Option<DeliveryRoute>> {
        let mut routes = self
            .routes
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        let Some(route) = routes.get_mut(id) else {
            return Ok(None);
        };
        f(route);
        route.updated_at = chrono::Utc::now();
        Ok(Some(route.clone()))
    }
}

#[async_trait]
impl RouteStore for InMemoryRouteStore {
    async fn create(&self, route: DeliveryRoute) -> Result<DeliveryRoute> {
        let mut routes = self
            .routes
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        routes.insert(route.id, route.clone());
        Ok(route)
    }

    async fn list(&self) -> Result<Vec<DeliveryRoute>> {
        let routes = self
            .routes
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        let mut all: Vec<DeliveryRoute> = routes.values().cloned().collect();
        sort_newest_first(&mut all, |r| r.created_at);
        Ok(all)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<DeliveryRoute>> {
        let routes = self
            .routes
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(routes.get(id).cloned())
    }

    async fn update(&self, id: &Uuid, route: DeliveryRoute) -> Result<Option<DeliveryRoute>> {
        let mut routes = self
            .routes
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        if !routes.contains_key(id) {
            return Ok(None);
        }
        routes.insert(*id, route.clone());
        Ok(Some(route))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool> {
        let mut routes = self
            .routes
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        Ok(routes.remove(id).is_some())
    }

    async fn add_order(&self, id: &Uuid, order_id: &Uuid) -> Result<Option<DeliveryRoute>> {
        self.mutate(id, |route| route.orders.push(*order_id))
    }

    async fn remove_order(&self, id: &Uuid, order_id: &Uuid) -> Result<Option<DeliveryRoute>> {
        self.mutate(id, |route| route.orders.retain(|o| o != order_id))
    }

    async fn reorder(&self, id: &Uuid, order_ids: &[Uuid]) -> Result<Option<DeliveryRoute>> {
        self.mutate(id, |route| route.orders = order_ids.to_vec())
    }

    async fn stats(&self) -> Result<Vec<RouteStats>> {
        let routes = self
            .routes
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        const STATUSES: [RouteStatus; 3] = [
            RouteStatus::Pending,
            RouteStatus::InProgress,
            RouteStatus::Completed,
        ];

        Ok(STATUSES
            .into_iter()
            .filter_map(|status| {
                let group: Vec<&DeliveryRoute> =
                    routes.values().filter(|r| r.status == status).collect();
                if group.is_empty() {
                    return None;
                }
                Some(RouteStats {
                    status,
                    count: group.len() as u64,
                    total_orders: group.iter().map(|r| r.orders.len() as u64).sum(),
                })
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// InMemoryUserStore
// ---------------------------------------------------------------------------

/// User store backed by a `RwLock<HashMap>`. Enforces email uniqueness the
/// way the Mongo backend's unique index does.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: User) -> Result<User> {
        let mut users = self
            .users
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        if users.values().any(|u| u.email == user.email) {
            return Err(anyhow::Error::new(ApiError::Duplicate { field: "email" }));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>> {
        let users = self
            .users
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        let mut all: Vec<User> = users.values().cloned().collect();
        sort_newest_first(&mut all, |u| u.created_at);
        Ok(all)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn update(&self, id: &Uuid, user: User) -> Result<Option<User>> {
        let mut users = self
            .users
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        if !users.contains_key(id) {
            return Ok(None);
        }
        if users.values().any(|u| u.email == user.email && u.id != *id) {
            return Err(anyhow::Error::new(ApiError::Duplicate { field: "email" }));
        }
        users.insert(*id, user.clone());
        Ok(Some(user))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool> {
        let mut users = self
            .users
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        Ok(users.remove(id).is_some())
    }
}
