use axum::{
    extract::{Path, State},
    response::Response,
    Extension,
};
use gundeals_scraper::PageType;

use crate::middleware::RequestId;
use crate::policy::Policy;

use super::{ApiError, AppState};

/// Full product page for a UPC: details plus every store listing.
pub(super) async fn product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(upc): Path<String>,
) -> Result<Response, ApiError> {
    let upc = upc.trim();
    if upc.is_empty() {
        return Err(missing_upc_error());
    }
    let url = state.pipeline.site().product(upc);
    let result = state.pipeline.scrape(PageType::Product, url, None).await;
    Ok(Policy::Product.render(result, &req_id.0))
}

pub(super) async fn missing_upc() -> ApiError {
    missing_upc_error()
}

fn missing_upc_error() -> ApiError {
    ApiError::bad_request("Missing product UPC. Use /product/product-upc")
}
