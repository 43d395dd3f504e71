use axum::{
    extract::{Query, State},
    response::Response,
    Extension,
};
use gundeals_scraper::{upstream_page, PageType};
use serde::Deserialize;

use crate::middleware::RequestId;
use crate::policy::Policy;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub q: Option<String>,
    /// One-based page number.
    pub page: Option<String>,
}

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    let query = params.q.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::bad_request(
            "Missing search query. Use ?q=your-search-term",
        ));
    }
    let page = upstream_page(params.page.as_deref()).ok_or_else(|| {
        ApiError::bad_request("Invalid page number. Use ?page=<positive integer>")
    })?;

    let url = state.pipeline.site().search(query, page);
    let result = state.pipeline.scrape(PageType::Search, url, None).await;
    Ok(Policy::Search { query }.render(result, &req_id.0))
}
