//! # Aquarota
//!
//! Order and delivery-route management backend for a small bottled-water
//! delivery business.
//!
//! ## Features
//!
//! - **Orders**: CRUD with a free-form status lifecycle
//!   (PENDING → CONFIRMED → IN_DELIVERY → DELIVERED/CANCELLED)
//! - **Delivery routes**: orders grouped per delivery person, with
//!   add/remove/reorder operations on the stop sequence
//! - **Staff accounts**: bcrypt-hashed passwords, JWT login, admin and
//!   deliveryman roles, soft disable via an active flag
//! - **Statistics**: per-status aggregation for orders and routes
//! - **Storage**: MongoDB in production, in-memory stores for tests and
//!   local development
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aquarota::core::auth::TokenManager;
//! use aquarota::server::{AppState, api_router};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let state = AppState::in_memory(TokenManager::new("dev-secret", 24));
//! let app = api_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod storage;
