//! Router assembly for the `/api` surface

use axum::Router;
use axum::routing::{get, patch, post};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::server::AppState;
use crate::server::handlers::{delivery_routes, health, orders, users};

/// Build the full application router.
///
/// - `/api/orders` — order CRUD, status updates, statistics
/// - `/api/delivery-routes` — route CRUD, order-list mutations, statistics
/// - `/api/users` — login, profile self-service, admin account management
/// - `/api/health` — liveness probe
pub fn api_router(state: AppState) -> Router {
    let orders = Router::new()
        .route("/", get(orders::list_orders).post(orders::create_order))
        .route("/stats", get(orders::order_stats))
        .route(
            "/{id}",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
        .route("/{id}/status", patch(orders::update_order_status));

    let routes = Router::new()
        .route(
            "/",
            get(delivery_routes::list_routes).post(delivery_routes::create_route),
        )
        .route("/stats", get(delivery_routes::route_stats))
        .route(
            "/{id}",
            get(delivery_routes::get_route)
                .put(delivery_routes::update_route)
                .delete(delivery_routes::delete_route),
        )
        .route("/{id}/status", patch(delivery_routes::update_route_status))
        .route("/{id}/add-order", patch(delivery_routes::add_order))
        .route("/{id}/remove-order", patch(delivery_routes::remove_order))
        .route("/{id}/reorder", patch(delivery_routes::reorder_deliveries));

    let users = Router::new()
        .route("/login", post(users::login))
        .route("/profile", get(users::get_profile).put(users::update_profile))
        .route("/profile/password", patch(users::change_password))
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/{id}/toggle-active", patch(users::toggle_active));

    Router::new()
        .nest("/api/orders", orders)
        .nest("/api/delivery-routes", routes)
        .nest("/api/users", users)
        .route("/api/health", get(health::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
