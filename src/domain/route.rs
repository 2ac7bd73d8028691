//! Delivery routes: ordered groupings of orders assigned to a delivery person

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Lifecycle stage of a delivery route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    Pending,
    InProgress,
    Completed,
}

/// An ordered grouping of orders assigned to one delivery person for a
/// single run. The `orders` list carries order references in delivery
/// sequence; nothing prevents one order from appearing in several routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRoute {
    pub id: Uuid,
    pub name: String,
    pub delivery_man: String,
    pub status: RouteStatus,
    #[serde(default)]
    pub orders: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DeliveryRoute {
    /// Create a new route from a validated request. Routes start `Pending`.
    pub fn new(req: CreateRouteRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: req.name,
            delivery_man: req.delivery_man,
            status: RouteStatus::Pending,
            orders: req.orders,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a full update. `id`, `created_at` and the order list are
    /// preserved; the list is only mutated through the dedicated
    /// add/remove/reorder operations.
    pub fn apply(&mut self, req: UpdateRouteRequest) {
        self.name = req.name;
        self.delivery_man = req.delivery_man;
        if let Some(status) = req.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }

    /// Overwrite the status field. No transition checks.
    pub fn set_status(&mut self, status: RouteStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

/// Payload for `POST /api/delivery-routes`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRouteRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "deliveryMan is required"))]
    pub delivery_man: String,

    #[serde(default)]
    pub orders: Vec<Uuid>,
}

/// Payload for `PUT /api/delivery-routes/{id}`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRouteRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "deliveryMan is required"))]
    pub delivery_man: String,

    #[serde(default)]
    pub status: Option<RouteStatus>,
}

/// Payload for `PATCH /api/delivery-routes/{id}/status`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRouteStatusRequest {
    pub status: RouteStatus,
}

/// Payload for add-order and remove-order operations.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RouteOrderRequest {
    pub order_id: Uuid,
}

/// Payload for `PATCH /api/delivery-routes/{id}/reorder`.
///
/// The route's order list is replaced verbatim with this sequence. There is
/// no check that it is a permutation of the existing set.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub order_ids: Vec<Uuid>,
}

/// One row of the route statistics aggregation: routes grouped by status
/// with a count and the sum of their order-list lengths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteStats {
    pub status: RouteStatus,
    pub count: u64,
    pub total_orders: u64,
}
