//! Rule sets for each page type of the deals site.
//!
//! Selectors mirror the live site's markup and are the part of this crate
//! most likely to need updating when the site changes. When a page starts
//! coming back empty, capture its HTML, adjust the selectors here and refresh
//! the matching fixture in `catalog_test.rs`.

use crate::error::RuleError;
use crate::rules::{ExtractSpec, RuleSet, RuleSetSpec, RuleSpec, ScopeSpec};

/// Home, today and category pages: one record per product tile.
pub static DEAL_TILES: RuleSetSpec = RuleSetSpec {
    name: "deal-tiles",
    scope: ScopeSpec::Each(".tile-container"),
    skip_class: None,
    rules: &[
        RuleSpec::new(
            "image",
            ExtractSpec::Attr {
                selector: ".tile__image",
                attr: "src",
            },
        ),
        RuleSpec::new(
            "title",
            ExtractSpec::Text {
                selector: ".tile__title span span",
            },
        ),
        RuleSpec::new(
            "price",
            ExtractSpec::Text {
                selector: ".tile__price",
            },
        ),
        RuleSpec::new(
            "price_addition",
            ExtractSpec::Text {
                selector: ".tile__price-addition",
            },
        )
        .optional(),
        RuleSpec::new(
            "merchant",
            ExtractSpec::Text {
                selector: ".tile__go-to-store a span",
            },
        )
        .optional(),
        RuleSpec::new(
            "link",
            ExtractSpec::Link {
                selector: ".tile__go-to-store a",
                attr: "href",
            },
        ),
    ],
};

/// Search results: one record per result tile. The `link` points at this
/// service's own `/product/{upc}` route.
pub static SEARCH_RESULTS: RuleSetSpec = RuleSetSpec {
    name: "search-results",
    scope: ScopeSpec::Each(".product-details-tile"),
    skip_class: None,
    rules: &[
        RuleSpec::new(
            "image",
            ExtractSpec::Attr {
                selector: ".product-details-tile__image-container__image",
                attr: "src",
            },
        ),
        RuleSpec::new(
            "title",
            ExtractSpec::Attr {
                selector: ".product-details-tile__title__link",
                attr: "title",
            },
        ),
        RuleSpec::new(
            "details",
            ExtractSpec::Details {
                rows: ".product-details-tile__info__specs",
                label: "span:first-child",
                value: "span:last-child",
                strip_suffix: Some(":"),
            },
        )
        .optional(),
        RuleSpec::new("price", ExtractSpec::Text { selector: ".price-tag" }),
        RuleSpec::new(
            "link",
            ExtractSpec::DetailsLink {
                details: "details",
                key: "UPC",
            },
        ),
    ],
};

/// Rows of the price comparison table on a product page.
pub static INVENTORY_LISTINGS: RuleSetSpec = RuleSetSpec {
    name: "inventory-listings",
    scope: ScopeSpec::Each(".price-compare-table tbody tr"),
    skip_class: Some("header"),
    rules: &[
        RuleSpec::new(
            "store_name",
            ExtractSpec::Text {
                selector: "td.price-compare-table__store-column div a span",
            },
        ),
        RuleSpec::new(
            "link",
            ExtractSpec::Link {
                selector: "td.price-compare-table__store-column div a",
                attr: "href",
            },
        ),
        RuleSpec::new(
            "price",
            ExtractSpec::Text {
                selector: "td.price-compare-table__price-column",
            },
        ),
        RuleSpec::new(
            "shipping",
            ExtractSpec::Text {
                selector: "td.price-compare-table__shipping-column",
            },
        ),
        RuleSpec::new("out_of_stock", ExtractSpec::ClassToken { token: "is-oos" }),
    ],
};

/// Product detail page: a single record for the whole document. The site
/// marks specification labels with `dd` and values with `dt`.
pub static PRODUCT_PAGE: RuleSetSpec = RuleSetSpec {
    name: "product-page",
    scope: ScopeSpec::Document,
    skip_class: None,
    rules: &[
        RuleSpec::new(
            "image",
            ExtractSpec::Attr {
                selector: ".product-basic-info-card__image img",
                attr: "src",
            },
        ),
        RuleSpec::new(
            "title",
            ExtractSpec::Text {
                selector: ".product-basic-info-card__main-content__title h1",
            },
        ),
        RuleSpec::new(
            "details",
            ExtractSpec::Details {
                rows: ".specifications div",
                label: "dd",
                value: "dt",
                strip_suffix: None,
            },
        )
        .optional(),
        RuleSpec::new(
            "all_listings",
            ExtractSpec::Nested {
                rules: &INVENTORY_LISTINGS,
            },
        ),
    ],
};

/// Latest coupons: one record per coupon entry.
pub static COUPONS: RuleSetSpec = RuleSetSpec {
    name: "coupons",
    scope: ScopeSpec::Each("div.coupons div.coupon"),
    skip_class: None,
    rules: &[
        RuleSpec::new(
            "title",
            ExtractSpec::Text {
                selector: ".coupon__title a",
            },
        ),
        RuleSpec::new(
            "link",
            ExtractSpec::Link {
                selector: ".coupon__title a",
                attr: "href",
            },
        ),
        RuleSpec::new(
            "coupon_code",
            ExtractSpec::Text {
                selector: ".coupon__code",
            },
        ),
        RuleSpec::new(
            "expiry_date",
            ExtractSpec::Text {
                selector: ".coupon__pills span:first-child span:nth-child(2)",
            },
        ),
        RuleSpec::new(
            "store",
            ExtractSpec::Text {
                selector: ".coupon__pills span:nth-child(2) span:nth-child(2)",
            },
        ),
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    Deals,
    Search,
    Product,
    Coupons,
}

/// The four compiled rule sets, built once at startup.
#[derive(Debug)]
pub struct RuleCatalog {
    deals: RuleSet,
    search: RuleSet,
    product: RuleSet,
    coupons: RuleSet,
}

impl RuleCatalog {
    /// Compiles every page-type rule set.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] if any built-in selector fails to parse.
    pub fn new() -> Result<Self, RuleError> {
        Ok(Self {
            deals: RuleSet::compile(&DEAL_TILES)?,
            search: RuleSet::compile(&SEARCH_RESULTS)?,
            product: RuleSet::compile(&PRODUCT_PAGE)?,
            coupons: RuleSet::compile(&COUPONS)?,
        })
    }

    #[must_use]
    pub fn get(&self, page: PageType) -> &RuleSet {
        match page {
            PageType::Deals => &self.deals,
            PageType::Search => &self.search,
            PageType::Product => &self.product,
            PageType::Coupons => &self.coupons,
        }
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
