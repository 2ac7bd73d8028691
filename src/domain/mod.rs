//! Domain entities: orders, delivery routes, and staff accounts

pub mod order;
pub mod route;
pub mod user;

pub use order::{
    CreateOrderRequest, Order, OrderStats, OrderStatus, PaymentMethod, UpdateOrderRequest,
    UpdateOrderStatusRequest,
};
pub use route::{
    CreateRouteRequest, DeliveryRoute, ReorderRequest, RouteOrderRequest, RouteStats, RouteStatus,
    UpdateRouteRequest, UpdateRouteStatusRequest,
};
pub use user::{
    ChangePasswordRequest, CreateUserRequest, LoginRequest, LoginResponse, Role,
    UpdateProfileRequest, UpdateUserRequest, User, UserView,
};
