mod coupons;
mod deals;
mod product;
mod search;

use std::sync::Arc;

use axum::{
    handler::Handler,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, MethodRouter},
    Json, Router,
};
use gundeals_scraper::Pipeline;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id;

const BANNER: &str = "Gun Tuah. Sale on that thang.";
const METHOD_NOT_ALLOWED: &str = "Method not allowed. Only GET requests are supported.";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// Structured error body: `{error, message, status}` where `error` is the
/// reason phrase of `status`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: &'static str,
    pub message: String,
    pub status: u16,
    #[serde(skip)]
    code: StatusCode,
}

impl ApiError {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            error: code.canonical_reason().unwrap_or("Unknown"),
            message: message.into(),
            status: code.as_u16(),
            code,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.code, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
        .expose_headers([HeaderName::from_static("x-request-id")])
}

/// A GET route whose other methods answer 405 with a plain-text body.
///
/// `get` would also serve HEAD through the GET handler (and fetch upstream),
/// so HEAD is routed to the 405 handler explicitly.
fn get_only<H, T>(handler: H) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    get(handler)
        .head(method_not_allowed)
        .fallback(method_not_allowed)
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get_only(root))
        .route("/relevant", get_only(deals::relevant))
        .route("/today", get_only(deals::today))
        .route("/category", get_only(deals::missing_category))
        .route("/category/", get_only(deals::missing_category))
        .route("/category/{*slug}", get_only(deals::category))
        .route("/search", get_only(search::search))
        .route("/product", get_only(product::missing_upc))
        .route("/product/", get_only(product::missing_upc))
        .route("/product/{upc}", get_only(product::product))
        .route("/coupons", get_only(coupons::coupons))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(build_cors()),
        )
        .with_state(state)
}

async fn root() -> &'static str {
    BANNER
}

async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED)
}

async fn not_found() -> ApiError {
    ApiError::not_found("No such route")
}
