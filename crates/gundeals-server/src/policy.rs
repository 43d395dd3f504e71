//! Maps a scrape outcome onto the status code and body each route promises.
//!
//! Every route distinguishes three outcomes: records found, the page fetched
//! but nothing matched, and the fetch itself failed. What "nothing matched"
//! means differs per route, and the product page treats a record with an
//! empty title as not found.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gundeals_scraper::{FetchError, Record};
use serde::Serialize;

use crate::api::ApiError;

const BLOCKED_HINT: &str = "no products found - site may be blocking scraping";

#[derive(Debug, Clone, Copy)]
pub(crate) enum Policy<'a> {
    /// Deal tile listings. An empty page is reported as the site being
    /// unavailable, with `action` naming what was attempted.
    Tiles { action: &'static str },
    Search { query: &'a str },
    Product,
    Coupons { store: &'a str },
}

#[derive(Debug)]
enum Outcome {
    Found(Vec<Record>),
    Empty,
    Failed(FetchError),
}

#[derive(Debug, Serialize)]
struct EmptySearch<'a> {
    message: &'static str,
    query: &'a str,
}

#[derive(Debug, Serialize)]
struct EmptyCoupons<'a> {
    status: u16,
    message: String,
    store: &'a str,
}

impl Policy<'_> {
    /// Renders `result` for this route. Failures and empty outcomes are
    /// logged with `request_id`.
    pub(crate) fn render(
        &self,
        result: Result<Vec<Record>, FetchError>,
        request_id: &str,
    ) -> Response {
        match self.classify(result) {
            Outcome::Found(records) => self.found(records, request_id),
            Outcome::Empty => self.empty(request_id),
            Outcome::Failed(err) => self.failed(&err, request_id).into_response(),
        }
    }

    fn classify(&self, result: Result<Vec<Record>, FetchError>) -> Outcome {
        match result {
            Err(err) => Outcome::Failed(err),
            Ok(records) if records.is_empty() => Outcome::Empty,
            Ok(records)
                if matches!(self, Policy::Product)
                    && records.iter().all(|r| r.text("title").is_empty()) =>
            {
                Outcome::Empty
            }
            Ok(records) => Outcome::Found(records),
        }
    }

    fn found(&self, records: Vec<Record>, request_id: &str) -> Response {
        if let Policy::Product = self {
            return match records.into_iter().find(|r| !r.text("title").is_empty()) {
                Some(product) => Json(product).into_response(),
                None => self.empty(request_id),
            };
        }
        Json(records).into_response()
    }

    fn empty(&self, request_id: &str) -> Response {
        tracing::info!(request_id, policy = ?self, "scrape matched nothing");
        match *self {
            Policy::Tiles { action } => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                format!("{action}: {BLOCKED_HINT}"),
            )
            .into_response(),
            Policy::Search { query } => Json(EmptySearch {
                message: "No products found for your search query",
                query,
            })
            .into_response(),
            Policy::Product => ApiError::not_found("Product not found").into_response(),
            Policy::Coupons { store } => {
                let mut message = String::from("No coupons found");
                if !store.is_empty() {
                    message.push_str(" for store: ");
                    message.push_str(store);
                }
                (
                    StatusCode::NOT_FOUND,
                    Json(EmptyCoupons {
                        status: StatusCode::NOT_FOUND.as_u16(),
                        message,
                        store,
                    }),
                )
                    .into_response()
            }
        }
    }

    fn failed(&self, err: &FetchError, request_id: &str) -> ApiError {
        let api_error = match *self {
            Policy::Tiles { action } => {
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, format!("{action}: {err}"))
            }
            Policy::Search { .. } => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to search deals: {err}"),
            ),
            Policy::Product => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to fetch product details: {err}"),
            ),
            Policy::Coupons { .. } => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch coupons. The site may be blocking scraping.",
            ),
        };
        tracing::error!(
            request_id,
            status = api_error.status,
            upstream_status = err.status(),
            error = %err,
            "scrape failed"
        );
        api_error
    }
}
