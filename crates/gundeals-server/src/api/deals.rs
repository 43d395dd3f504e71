use axum::{
    extract::{Path, State},
    response::Response,
    Extension,
};
use gundeals_scraper::PageType;
use reqwest::Url;

use crate::middleware::RequestId;
use crate::policy::Policy;

use super::{ApiError, AppState};

const FAILED_DEALS: &str = "Failed to fetch deals";
const FAILED_CATEGORY: &str = "Failed to fetch category deals";

/// Deal tiles from the site's home page.
pub(super) async fn relevant(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Response {
    let url = state.pipeline.site().home();
    tiles(&state, url, FAILED_DEALS, &req_id).await
}

pub(super) async fn today(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Response {
    let url = state.pipeline.site().today();
    tiles(&state, url, FAILED_DEALS, &req_id).await
}

pub(super) async fn category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
) -> Result<Response, ApiError> {
    // Nested slugs (`hand-guns/pistols`) are forwarded as-is.
    if slug.split('/').all(|part| part.trim().is_empty()) {
        return Err(missing_category_error());
    }
    let url = state.pipeline.site().category(&slug);
    Ok(tiles(&state, url, FAILED_CATEGORY, &req_id).await)
}

pub(super) async fn missing_category() -> ApiError {
    missing_category_error()
}

fn missing_category_error() -> ApiError {
    ApiError::bad_request(
        "Missing category. Use /category/<category-slug> (e.g., /category/hand-guns)",
    )
}

async fn tiles(state: &AppState, url: Url, action: &'static str, req_id: &RequestId) -> Response {
    let result = state.pipeline.scrape(PageType::Deals, url, None).await;
    Policy::Tiles { action }.render(result, &req_id.0)
}
