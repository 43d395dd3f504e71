use axum::{
    extract::{Query, State},
    response::Response,
    Extension,
};
use gundeals_scraper::{FieldFilter, PageType};
use serde::Deserialize;

use crate::middleware::RequestId;
use crate::policy::Policy;

use super::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct CouponQuery {
    /// Exact store name, compared case-insensitively.
    pub store: Option<String>,
}

pub(super) async fn coupons(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<CouponQuery>,
) -> Response {
    let store = params.store.unwrap_or_default();
    let filter = FieldFilter::new("store", store.as_str());
    let url = state.pipeline.site().coupons();
    let result = state
        .pipeline
        .scrape(PageType::Coupons, url, Some(&filter))
        .await;
    Policy::Coupons { store: &store }.render(result, &req_id.0)
}
