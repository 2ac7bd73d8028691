//! Request handlers, one module per resource

pub mod delivery_routes;
pub mod health;
pub mod orders;
pub mod users;
