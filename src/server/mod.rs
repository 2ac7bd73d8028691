//! HTTP server: shared state, router assembly, and request handlers

pub mod handlers;
pub mod router;

use std::sync::Arc;

use crate::core::auth::TokenManager;
use crate::storage::{
    InMemoryOrderStore, InMemoryRouteStore, InMemoryUserStore, OrderStore, RouteStore, UserStore,
};

pub use router::api_router;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<dyn OrderStore>,
    pub routes: Arc<dyn RouteStore>,
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<TokenManager>,
}

impl AppState {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        routes: Arc<dyn RouteStore>,
        users: Arc<dyn UserStore>,
        tokens: TokenManager,
    ) -> Self {
        Self {
            orders,
            routes,
            users,
            tokens: Arc::new(tokens),
        }
    }

    /// State backed entirely by in-memory stores, for tests and local
    /// development without a database.
    pub fn in_memory(tokens: TokenManager) -> Self {
        Self::new(
            Arc::new(InMemoryOrderStore::new()),
            Arc::new(InMemoryRouteStore::new()),
            Arc::new(InMemoryUserStore::new()),
            tokens,
        )
    }
}
