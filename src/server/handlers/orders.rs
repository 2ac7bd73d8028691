//! HTTP handlers for orders

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::core::auth::AuthUser;
use crate::core::error::ApiError;
use crate::core::extractors::ValidatedJson;
use crate::domain::order::{
    CreateOrderRequest, Order, OrderStats, UpdateOrderRequest, UpdateOrderStatusRequest,
};
use crate::server::AppState;
use crate::storage::OrderStore;

/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = Order::new(payload);
    let created = state.orders.create(order).await.map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/orders
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state.orders.list().await.map_err(ApiError::from)?;
    Ok(Json(orders))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, ApiError> {
    let order = state
        .orders
        .get(&id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("order", id))?;
    Ok(Json(order))
}

/// PUT /api/orders/{id}
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderRequest>,
) -> Result<Json<Order>, ApiError> {
    let mut order = state
        .orders
        .get(&id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("order", id))?;
    order.apply(payload);

    let updated = state
        .orders
        .update(&id, order)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("order", id))?;
    Ok(Json(updated))
}

/// PATCH /api/orders/{id}/status
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    let mut order = state
        .orders
        .get(&id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("order", id))?;
    order.set_status(payload.status);

    let updated = state
        .orders
        .update(&id, order)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("order", id))?;
    Ok(Json(updated))
}

/// DELETE /api/orders/{id} — admin only
pub async fn delete_order(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;

    if state.orders.delete(&id).await.map_err(ApiError::from)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("order", id))
    }
}

/// GET /api/orders/stats
pub async fn order_stats(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderStats>>, ApiError> {
    let stats = state.orders.stats().await.map_err(ApiError::from)?;
    Ok(Json(stats))
}
