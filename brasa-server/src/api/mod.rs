//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`inventory`] - 库存管理接口
//! - [`products`] - 商品管理接口
//! - [`cart`] - 购物车接口
//! - [`sales`] - 销售确认和账本接口
//! - [`orders`] - 厨房订单接口
//! - [`expenses`] - 支出管理接口
//! - [`cash`] - 收银台接口
//! - [`sync`] - 同步订阅接口 (SSE)

pub mod cart;
pub mod cash;
pub mod expenses;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod sales;
pub mod sync;

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(inventory::router())
        .merge(products::router())
        .merge(cart::router())
        .merge(sales::router())
        .merge(orders::router())
        .merge(expenses::router())
        .merge(cash::router())
        .merge(sync::router())
}

/// Build a fully configured application with all middleware
pub fn build_app() -> Router<ServerState> {
    build_router()
        // ========== Tower HTTP Middleware ==========
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // Request ID - Generate unique ID for each request
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
}
