//! HTTP handlers for delivery routes

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::core::auth::AuthUser;
use crate::core::error::ApiError;
use crate::core::extractors::ValidatedJson;
use crate::domain::route::{
    CreateRouteRequest, DeliveryRoute, ReorderRequest, RouteOrderRequest, RouteStats,
    UpdateRouteRequest, UpdateRouteStatusRequest,
};
use crate::server::AppState;
use crate::storage::RouteStore;

/// POST /api/delivery-routes
pub async fn create_route(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateRouteRequest>,
) -> Result<(StatusCode, Json<DeliveryRoute>), ApiError> {
    let route = DeliveryRoute::new(payload);
    let created = state.routes.create(route).await.map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/delivery-routes
pub async fn list_routes(
    State(state): State<AppState>,
) -> Result<Json<Vec<DeliveryRoute>>, ApiError> {
    let routes = state.routes.list().await.map_err(ApiError::from)?;
    Ok(Json(routes))
}

/// GET /api/delivery-routes/{id}
pub async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeliveryRoute>, ApiError> {
    let route = state
        .routes
        .get(&id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("route", id))?;
    Ok(Json(route))
}

/// PUT /api/delivery-routes/{id}
pub async fn update_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateRouteRequest>,
) -> Result<Json<DeliveryRoute>, ApiError> {
    let mut route = state
        .routes
        .get(&id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("route", id))?;
    route.apply(payload);

    let updated = state
        .routes
        .update(&id, route)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("route", id))?;
    Ok(Json(updated))
}

/// PATCH /api/delivery-routes/{id}/status
pub async fn update_route_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateRouteStatusRequest>,
) -> Result<Json<DeliveryRoute>, ApiError> {
    let mut route = state
        .routes
        .get(&id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("route", id))?;
    route.set_status(payload.status);

    let updated = state
        .routes
        .update(&id, route)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("route", id))?;
    Ok(Json(updated))
}

/// PATCH /api/delivery-routes/{id}/add-order
pub async fn add_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<RouteOrderRequest>,
) -> Result<Json<DeliveryRoute>, ApiError> {
    let route = state
        .routes
        .add_order(&id, &payload.order_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("route", id))?;
    Ok(Json(route))
}

/// PATCH /api/delivery-routes/{id}/remove-order
pub async fn remove_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<RouteOrderRequest>,
) -> Result<Json<DeliveryRoute>, ApiError> {
    let route = state
        .routes
        .remove_order(&id, &payload.order_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("route", id))?;
    Ok(Json(route))
}

/// PATCH /api/delivery-routes/{id}/reorder
///
/// Replaces the route's stop sequence verbatim with the supplied list.
pub async fn reorder_deliveries(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ReorderRequest>,
) -> Result<Json<DeliveryRoute>, ApiError> {
    let route = state
        .routes
        .reorder(&id, &payload.order_ids)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("route", id))?;
    Ok(Json(route))
}

/// DELETE /api/delivery-routes/{id} — admin only
pub async fn delete_route(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;

    if state.routes.delete(&id).await.map_err(ApiError::from)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("route", id))
    }
}

/// GET /api/delivery-routes/stats
pub async fn route_stats(
    State(state): State<AppState>,
) -> Result<Json<Vec<RouteStats>>, ApiError> {
    let stats = state.routes.stats().await.map_err(ApiError::from)?;
    Ok(Json(stats))
}
