//! Customer orders and their lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::validation::validate_phone;

/// Lifecycle stage of an order.
///
/// Orders are created `Pending`. Transitions are unrestricted field writes:
/// any status may be set to any other via the update endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    InDelivery,
    Delivered,
    Cancelled,
}

/// How the customer pays on delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Money,
    Card,
    Pix,
}

/// A customer's request for bottled-water delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    /// Number of bottles in the order.
    pub items: u32,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order from a validated request. Orders start `Pending`.
    pub fn new(req: CreateOrderRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_name: req.customer_name,
            phone: req.phone,
            address: req.address,
            items: req.items,
            status: OrderStatus::Pending,
            payment_method: req.payment_method,
            total: req.total,
            notes: req.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a full update to this order.
    ///
    /// `id` and `created_at` are preserved; `status` changes only when the
    /// request carries one. No transition checks.
    pub fn apply(&mut self, req: UpdateOrderRequest) {
        self.customer_name = req.customer_name;
        self.phone = req.phone;
        self.address = req.address;
        self.items = req.items;
        self.payment_method = req.payment_method;
        self.total = req.total;
        self.notes = req.notes;
        if let Some(status) = req.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }

    /// Overwrite the status field. No transition checks.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

/// Payload for `POST /api/orders`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "customerName is required"))]
    pub customer_name: String,

    #[validate(custom(function = validate_phone))]
    pub phone: String,

    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,

    #[validate(range(min = 1, message = "items must be at least 1"))]
    pub items: u32,

    pub payment_method: PaymentMethod,

    #[serde(default)]
    pub total: f64,

    #[serde(default)]
    pub notes: Option<String>,
}

/// Payload for `PUT /api/orders/{id}`.
///
/// Same required fields as creation, plus an optional status overwrite.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    #[validate(length(min = 1, message = "customerName is required"))]
    pub customer_name: String,

    #[validate(custom(function = validate_phone))]
    pub phone: String,

    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,

    #[validate(range(min = 1, message = "items must be at least 1"))]
    pub items: u32,

    pub payment_method: PaymentMethod,

    #[serde(default)]
    pub total: f64,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub status: Option<OrderStatus>,
}

/// Payload for `PATCH /api/orders/{id}/status`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// One row of the order statistics aggregation: orders grouped by status
/// with a count and the sum of their totals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub status: OrderStatus,
    pub count: u64,
    pub total_value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_request() -> CreateOrderRequest {
        serde_json::from_value(json!({
            "customerName": "Maria Silva",
            "phone": "(11) 91234-5678",
            "address": "Rua das Flores, 123",
            "items": 2,
            "paymentMethod": "pix",
            "total": 24.0
        }))
        .unwrap()
    }

    #[test]
    fn new_order_starts_pending() {
        let order = Order::new(create_request());
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.created_at, order.updated_at);
        assert_eq!(order.items, 2);
    }

    #[test]
    fn status_serializes_screaming_snake() {
        let order = Order::new(create_request());
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["status"], "PENDING");
        assert_eq!(value["paymentMethod"], "pix");
        assert_eq!(value["customerName"], "Maria Silva");
        // notes is omitted when absent
        assert!(value.get("notes").is_none());
    }

    #[test]
    fn in_delivery_spelling() {
        let status: OrderStatus = serde_json::from_value(json!("IN_DELIVERY")).unwrap();
        assert_eq!(status, OrderStatus::InDelivery);
    }

    #[test]
    fn unknown_status_rejected() {
        let result: Result<OrderStatus, _> = serde_json::from_value(json!("SHIPPED"));
        assert!(result.is_err());
    }

    #[test]
    fn apply_preserves_id_and_created_at() {
        let mut order = Order::new(create_request());
        let id = order.id;
        let created_at = order.created_at;

        let update: UpdateOrderRequest = serde_json::from_value(json!({
            "customerName": "Maria Silva",
            "phone": "(11) 91234-5678",
            "address": "Av. Central, 9",
            "items": 3,
            "paymentMethod": "card",
            "total": 36.0,
            "status": "CONFIRMED"
        }))
        .unwrap();
        order.apply(update);

        assert_eq!(order.id, id);
        assert_eq!(order.created_at, created_at);
        assert_eq!(order.address, "Av. Central, 9");
        assert_eq!(order.status, OrderStatus::Confirmed);
    }

    #[test]
    fn apply_without_status_keeps_current() {
        let mut order = Order::new(create_request());
        order.set_status(OrderStatus::InDelivery);

        let update: UpdateOrderRequest = serde_json::from_value(json!({
            "customerName": "Maria Silva",
            "phone": "(11) 91234-5678",
            "address": "Rua das Flores, 123",
            "items": 2,
            "paymentMethod": "pix",
            "total": 24.0
        }))
        .unwrap();
        order.apply(update);

        assert_eq!(order.status, OrderStatus::InDelivery);
    }

    #[test]
    fn create_request_validation() {
        let mut req = create_request();
        assert!(req.validate().is_ok());

        req.phone = "11912345678".to_string();
        assert!(req.validate().is_err());

        let mut req = create_request();
        req.items = 0;
        assert!(req.validate().is_err());

        let mut req = create_request();
        req.customer_name = String::new();
        assert!(req.validate().is_err());
    }
}
