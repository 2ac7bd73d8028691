//! MongoDB storage backend using the official MongoDB async driver.
//!
//! # Storage model
//!
//! Collection-per-entity: `orders`, `delivery_routes`, and `users`. Route
//! order-list mutations use atomic `$push` / `$pull` / `$set` updates with
//! `find_one_and_update`, and the statistics endpoints run single-stage
//! `$group` aggregation pipelines.
//!
//! # Serialization strategy
//!
//! Entities are serialized via `serde_json::Value` as an intermediate
//! format, then converted to BSON documents. This ensures consistent
//! handling of UUID (stored as strings) and DateTime (stored as ISO 8601
//! strings) types. The `id` field is mapped to MongoDB's `_id` convention.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Database, IndexModel};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::core::error::ApiError;
use crate::domain::order::{Order, OrderStats};
use crate::domain::route::{DeliveryRoute, RouteStats};
use crate::domain::user::User;
use crate::storage::{OrderStore, RouteStore, UserStore};

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a serde_json::Value (expected to be an Object) into a BSON
/// Document, renaming `id` → `_id` for MongoDB convention.
fn json_to_document(json: serde_json::Value) -> Result<Document> {
    let bson_val = mongodb::bson::to_bson(&json)
        .map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))?;

    let mut doc = match bson_val {
        Bson::Document(d) => d,
        _ => return Err(anyhow!("Expected BSON document, got non-object")),
    };

    if let Some(id) = doc.remove("id") {
        doc.insert("_id", id);
    }

    Ok(doc)
}

/// Convert a BSON Document back into a serde_json::Value,
/// renaming `_id` → `id` for domain entity convention.
fn document_to_json(mut doc: Document) -> serde_json::Value {
    if let Some(id) = doc.remove("_id") {
        doc.insert("id", id);
    }

    Bson::Document(doc).into_relaxed_extjson()
}

/// Serialize a domain entity into a MongoDB document.
fn to_document<T: Serialize>(entity: &T) -> Result<Document> {
    let json =
        serde_json::to_value(entity).map_err(|e| anyhow!("Failed to serialize entity: {}", e))?;
    json_to_document(json)
}

/// Deserialize a MongoDB document back into a domain entity.
fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T> {
    let json = document_to_json(doc);
    serde_json::from_value(json)
        .map_err(|e| anyhow!("Failed to deserialize entity from document: {}", e))
}

/// Convert a UUID to its BSON string representation for queries.
fn uuid_bson(id: &Uuid) -> Bson {
    Bson::String(id.to_string())
}

/// Serialize a timestamp the same way serde does on the entity structs, so
/// atomic `$set` updates stay consistent with full-document writes.
fn datetime_bson(dt: DateTime<Utc>) -> Result<Bson> {
    mongodb::bson::to_bson(&dt).map_err(|e| anyhow!("Failed to convert timestamp: {}", e))
}

/// Read a numeric BSON value as u64, tolerating the integer widths the
/// aggregation framework may produce.
fn bson_as_u64(value: Option<&Bson>) -> u64 {
    match value {
        Some(Bson::Int32(v)) => *v as u64,
        Some(Bson::Int64(v)) => *v as u64,
        Some(Bson::Double(v)) => *v as u64,
        _ => 0,
    }
}

/// Read a numeric BSON value as f64.
fn bson_as_f64(value: Option<&Bson>) -> f64 {
    match value {
        Some(Bson::Int32(v)) => *v as f64,
        Some(Bson::Int64(v)) => *v as f64,
        Some(Bson::Double(v)) => *v,
        _ => 0.0,
    }
}

/// Parse a `$group` result row's `_id` back into a status enum.
fn group_status<T: DeserializeOwned>(doc: &Document) -> Result<T> {
    let raw = doc
        .get_str("_id")
        .map_err(|e| anyhow!("Malformed aggregation row: {}", e))?;
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|e| anyhow!("Unknown status '{}' in aggregation row: {}", raw, e))
}

/// Check for a unique-index violation (MongoDB error code 11000).
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == 11000,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// MongoOrderStore
// ---------------------------------------------------------------------------

/// Order storage backed by the `orders` collection.
#[derive(Clone, Debug)]
pub struct MongoOrderStore {
    database: Database,
}

impl MongoOrderStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self) -> mongodb::Collection<Document> {
        self.database.collection("orders")
    }
}

#[async_trait]
impl OrderStore for MongoOrderStore {
    /// Insert a new order and read it back to return the stored version.
    async fn create(&self, order: Order) -> Result<Order> {
        let doc = to_document(&order)?;
        let id_bson = uuid_bson(&order.id);

        self.collection()
            .insert_one(doc)
            .await
            .map_err(|e| anyhow!("Failed to create order: {}", e))?;

        let result = self
            .collection()
            .find_one(doc! { "_id": id_bson })
            .await
            .map_err(|e| anyhow!("Failed to read back created order: {}", e))?
            .ok_or_else(|| anyhow!("Order not found after insert"))?;

        from_document(result)
    }

    /// List all orders, newest first.
    async fn list(&self) -> Result<Vec<Order>> {
        let cursor = self
            .collection()
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(|e| anyhow!("Failed to list orders: {}", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect orders: {}", e))?;

        docs.into_iter().map(from_document).collect()
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Order>> {
        let doc = self
            .collection()
            .find_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to get order: {}", e))?;

        doc.map(from_document).transpose()
    }

    /// Replace an order. Returns `Ok(None)` if no document matched.
    async fn update(&self, id: &Uuid, order: Order) -> Result<Option<Order>> {
        let doc = to_document(&order)?;
        let id_bson = uuid_bson(id);

        let result = self
            .collection()
            .replace_one(doc! { "_id": &id_bson }, doc)
            .await
            .map_err(|e| anyhow!("Failed to update order: {}", e))?;

        if result.matched_count == 0 {
            return Ok(None);
        }

        let updated = self
            .collection()
            .find_one(doc! { "_id": id_bson })
            .await
            .map_err(|e| anyhow!("Failed to read back updated order: {}", e))?
            .ok_or_else(|| anyhow!("Order not found after update"))?;

        from_document(updated).map(Some)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool> {
        let result = self
            .collection()
            .delete_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to delete order: {}", e))?;

        Ok(result.deleted_count > 0)
    }

    /// Group orders by status, counting them and summing their totals.
    async fn stats(&self) -> Result<Vec<OrderStats>> {
        let pipeline = vec![doc! {
            "$group": {
                "_id": "$status",
                "count": { "$sum": 1 },
                "totalValue": { "$sum": "$total" }
            }
        }];

        let cursor = self
            .collection()
            .aggregate(pipeline)
            .await
            .map_err(|e| anyhow!("Failed to aggregate order stats: {}", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect order stats: {}", e))?;

        docs.into_iter()
            .map(|doc| {
                Ok(OrderStats {
                    status: group_status(&doc)?,
                    count: bson_as_u64(doc.get("count")),
                    total_value: bson_as_f64(doc.get("totalValue")),
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// MongoRouteStore
// ---------------------------------------------------------------------------

/// Delivery-route storage backed by the `delivery_routes` collection.
#[derive(Clone, Debug)]
pub struct MongoRouteStore {
    database: Database,
}

impl MongoRouteStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self) -> mongodb::Collection<Document> {
        self.database.collection("delivery_routes")
    }

    /// Apply an atomic update to one route and return the updated document.
    async fn find_and_update(&self, id: &Uuid, update: Document) -> Result<Option<DeliveryRoute>> {
        let updated = self
            .collection()
            .find_one_and_update(doc! { "_id": uuid_bson(id) }, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| anyhow!("Failed to update route: {}", e))?;

        updated.map(from_document).transpose()
    }
}

#[async_trait]
impl RouteStore for MongoRouteStore {
    async fn create(&self, route: DeliveryRoute) -> Result<DeliveryRoute> {
        let doc = to_document(&route)?;
        let id_bson = uuid_bson(&route.id);

        self.collection()
            .insert_one(doc)
            .await
            .map_err(|e| anyhow!("Failed to create route: {}", e))?;

        let result = self
            .collection()
            .find_one(doc! { "_id": id_bson })
            .await
            .map_err(|e| anyhow!("Failed to read back created route: {}", e))?
            .ok_or_else(|| anyhow!("Route not found after insert"))?;

        from_document(result)
    }

    async fn list(&self) -> Result<Vec<DeliveryRoute>> {
        let cursor = self
            .collection()
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(|e| anyhow!("Failed to list routes: {}", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect routes: {}", e))?;

        docs.into_iter().map(from_document).collect()
    }

    async fn get(&self, id: &Uuid) -> Result<Option<DeliveryRoute>> {
        let doc = self
            .collection()
            .find_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to get route: {}", e))?;

        doc.map(from_document).transpose()
    }

    async fn update(&self, id: &Uuid, route: DeliveryRoute) -> Result<Option<DeliveryRoute>> {
        let doc = to_document(&route)?;
        let id_bson = uuid_bson(id);

        let result = self
            .collection()
            .replace_one(doc! { "_id": &id_bson }, doc)
            .await
            .map_err(|e| anyhow!("Failed to update route: {}", e))?;

        if result.matched_count == 0 {
            return Ok(None);
        }

        let updated = self
            .collection()
            .find_one(doc! { "_id": id_bson })
            .await
            .map_err(|e| anyhow!("Failed to read back updated route: {}", e))?
            .ok_or_else(|| anyhow!("Route not found after update"))?;

        from_document(updated).map(Some)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool> {
        let result = self
            .collection()
            .delete_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to delete route: {}", e))?;

        Ok(result.deleted_count > 0)
    }

    async fn add_order(&self, id: &Uuid, order_id: &Uuid) -> Result<Option<DeliveryRoute>> {
        self.find_and_update(
            id,
            doc! {
                "$push": { "orders": uuid_bson(order_id) },
                "$set": { "updatedAt": datetime_bson(Utc::now())? }
            },
        )
        .await
    }

    async fn remove_order(&self, id: &Uuid, order_id: &Uuid) -> Result<Option<DeliveryRoute>> {
        self.find_and_update(
            id,
            doc! {
                "$pull": { "orders": uuid_bson(order_id) },
                "$set": { "updatedAt": datetime_bson(Utc::now())? }
            },
        )
        .await
    }

    /// Replace the order list verbatim. No check that the new sequence is a
    /// permutation of the old one.
    async fn reorder(&self, id: &Uuid, order_ids: &[Uuid]) -> Result<Option<DeliveryRoute>> {
        let orders = Bson::Array(order_ids.iter().map(uuid_bson).collect());
        self.find_and_update(
            id,
            doc! {
                "$set": {
                    "orders": orders,
                    "updatedAt": datetime_bson(Utc::now())?
                }
            },
        )
        .await
    }

    /// Group routes by status, counting them and summing order-list sizes.
    async fn stats(&self) -> Result<Vec<RouteStats>> {
        let pipeline = vec![doc! {
            "$group": {
                "_id": "$status",
                "count": { "$sum": 1 },
                "totalOrders": { "$sum": { "$size": "$orders" } }
            }
        }];

        let cursor = self
            .collection()
            .aggregate(pipeline)
            .await
            .map_err(|e| anyhow!("Failed to aggregate route stats: {}", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect route stats: {}", e))?;

        docs.into_iter()
            .map(|doc| {
                Ok(RouteStats {
                    status: group_status(&doc)?,
                    count: bson_as_u64(doc.get("count")),
                    total_orders: bson_as_u64(doc.get("totalOrders")),
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// MongoUserStore
// ---------------------------------------------------------------------------

/// User storage backed by the `users` collection, with a unique index on
/// `email`.
#[derive(Clone, Debug)]
pub struct MongoUserStore {
    database: Database,
}

impl MongoUserStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self) -> mongodb::Collection<Document> {
        self.database.collection("users")
    }

    /// Create the unique email index. Idempotent, called on every startup.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection()
            .create_index(index)
            .await
            .map_err(|e| anyhow!("Failed to create index on users collection: {}", e))?;

        Ok(())
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    /// Insert a new account. A unique-index hit on `email` surfaces as
    /// [`ApiError::Duplicate`] wrapped in anyhow.
    async fn create(&self, user: User) -> Result<User> {
        let doc = to_document(&user)?;
        let id_bson = uuid_bson(&user.id);

        self.collection().insert_one(doc).await.map_err(|e| {
            if is_duplicate_key(&e) {
                anyhow::Error::new(ApiError::Duplicate { field: "email" })
            } else {
                anyhow!("Failed to create user: {}", e)
            }
        })?;

        let result = self
            .collection()
            .find_one(doc! { "_id": id_bson })
            .await
            .map_err(|e| anyhow!("Failed to read back created user: {}", e))?
            .ok_or_else(|| anyhow!("User not found after insert"))?;

        from_document(result)
    }

    async fn list(&self) -> Result<Vec<User>> {
        let cursor = self
            .collection()
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(|e| anyhow!("Failed to list users: {}", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect users: {}", e))?;

        docs.into_iter().map(from_document).collect()
    }

    async fn get(&self, id: &Uuid) -> Result<Option<User>> {
        let doc = self
            .collection()
            .find_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to get user: {}", e))?;

        doc.map(from_document).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let doc = self
            .collection()
            .find_one(doc! { "email": email })
            .await
            .map_err(|e| anyhow!("Failed to find user by email: {}", e))?;

        doc.map(from_document).transpose()
    }

    async fn update(&self, id: &Uuid, user: User) -> Result<Option<User>> {
        let doc = to_document(&user)?;
        let id_bson = uuid_bson(id);

        let result = self
            .collection()
            .replace_one(doc! { "_id": &id_bson }, doc)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    anyhow::Error::new(ApiError::Duplicate { field: "email" })
                } else {
                    anyhow!("Failed to update user: {}", e)
                }
            })?;

        if result.matched_count == 0 {
            return Ok(None);
        }

        let updated = self
            .collection()
            .find_one(doc! { "_id": id_bson })
            .await
            .map_err(|e| anyhow!("Failed to read back updated user: {}", e))?
            .ok_or_else(|| anyhow!("User not found after update"))?;

        from_document(updated).map(Some)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool> {
        let result = self
            .collection()
            .delete_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to delete user: {}", e))?;

        Ok(result.deleted_count > 0)
    }
}
