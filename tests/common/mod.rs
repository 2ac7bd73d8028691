//! Shared helpers for the HTTP integration suites
//!
//! Each suite drives the full router through `axum_test::TestServer`,
//! backed by the in-memory stores.

use axum_test::TestServer;
use chrono::Utc;
use uuid::Uuid;

use aquarota::core::auth::TokenManager;
use aquarota::domain::user::{Role, User};
use aquarota::server::{AppState, api_router};
use aquarota::storage::UserStore;

pub fn test_state() -> AppState {
    AppState::in_memory(TokenManager::new("test-secret", 24))
}

pub fn server(state: &AppState) -> TestServer {
    TestServer::new(api_router(state.clone()))
}

/// Insert a user directly into the store and mint a token for it.
///
/// Uses a low bcrypt cost to keep the suites fast; production hashing goes
/// through `User::new`.
pub async fn seed_user(
    state: &AppState,
    email: &str,
    password: &str,
    role: Role,
    active: bool,
) -> (User, String) {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name: "Seeded User".to_string(),
        email: email.to_string(),
        password_hash: bcrypt::hash(password, 4).unwrap(),
        role,
        active,
        created_at: now,
        updated_at: now,
    };
    state.users.create(user.clone()).await.unwrap();
    let token = state.tokens.issue(&user).unwrap();
    (user, token)
}

pub async fn seed_admin(state: &AppState) -> (User, String) {
    seed_user(state, "admin@example.com", "admin-pw", Role::Admin, true).await
}

pub async fn seed_deliveryman(state: &AppState) -> (User, String) {
    seed_user(
        state,
        "deliveryman@example.com",
        "delivery-pw",
        Role::Deliveryman,
        true,
    )
    .await
}
