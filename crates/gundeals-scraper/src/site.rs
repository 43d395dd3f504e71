//! Upstream URLs for each page type.

use reqwest::Url;

/// Builds page URLs against the configured site base.
///
/// Any path on the base is kept as a prefix, so a mock server mounted under
/// a sub-path works the same as the real site root.
#[derive(Debug, Clone)]
pub struct SiteRoutes {
    base: Url,
}

impl SiteRoutes {
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    /// Base URL that relative links in fetched pages resolve against.
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Home page, which carries the "relevant" deal tiles.
    #[must_use]
    pub fn home(&self) -> Url {
        self.at(&[""])
    }

    #[must_use]
    pub fn today(&self) -> Url {
        self.at(&["today"])
    }

    /// Each `/`-separated part of `slug` becomes its own encoded path
    /// segment; blank parts are dropped.
    #[must_use]
    pub fn category(&self, slug: &str) -> Url {
        let mut segments = vec!["category"];
        segments.extend(slug.split('/').map(str::trim).filter(|s| !s.is_empty()));
        self.at(&segments)
    }

    /// Product search. `page` is the upstream zero-based index; see
    /// [`upstream_page`].
    #[must_use]
    pub fn search(&self, query: &str, page: u32) -> Url {
        let mut url = self.at(&["search", "apachesolr_search", query]);
        url.query_pairs_mut()
            .append_pair("result_type", "product")
            .append_pair("page", &page.to_string());
        url
    }

    /// Product detail lookup. The site serves it from the search endpoint,
    /// keyed by UPC.
    #[must_use]
    pub fn product(&self, upc: &str) -> Url {
        self.at(&["search", "apachesolr_search", upc])
    }

    #[must_use]
    pub fn coupons(&self) -> Url {
        self.at(&["coupons", "latest"])
    }

    fn at(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        // Bases are validated http(s) URLs, which always have a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Converts a caller's one-based `page` parameter into the site's
/// zero-based index.
///
/// Absent, empty, `0` and `1` all select the first page. Returns `None` when
/// the value is not a non-negative integer.
#[must_use]
pub fn upstream_page(raw: Option<&str>) -> Option<u32> {
    match raw.map(str::trim) {
        None | Some("") => Some(0),
        Some(value) => value.parse::<u32>().ok().map(|n| n.saturating_sub(1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes() -> SiteRoutes {
        SiteRoutes::new(Url::parse("https://gun.deals").unwrap())
    }

    #[test]
    fn fixed_pages() {
        let site = routes();
        assert_eq!(site.home().as_str(), "https://gun.deals/");
        assert_eq!(site.today().as_str(), "https://gun.deals/today");
        assert_eq!(site.coupons().as_str(), "https://gun.deals/coupons/latest");
    }

    #[test]
    fn category_and_product_encode_their_segment() {
        let site = routes();
        assert_eq!(
            site.category("rifles").as_str(),
            "https://gun.deals/category/rifles"
        );
        assert_eq!(
            site.category("hand-guns/pistols").as_str(),
            "https://gun.deals/category/hand-guns/pistols"
        );
        assert_eq!(
            site.category("a//b c/").as_str(),
            "https://gun.deals/category/a/b%20c"
        );
        assert_eq!(
            site.category("50%").as_str(),
            "https://gun.deals/category/50%25"
        );
        assert_eq!(
            site.product("764503037108").as_str(),
            "https://gun.deals/search/apachesolr_search/764503037108"
        );
    }

    #[test]
    fn search_carries_result_type_and_page() {
        let url = routes().search("9mm ammo", 2);
        assert_eq!(url.path(), "/search/apachesolr_search/9mm%20ammo");
        assert_eq!(url.query(), Some("result_type=product&page=2"));
    }

    #[test]
    fn base_path_is_kept_as_prefix() {
        let site = SiteRoutes::new(Url::parse("http://127.0.0.1:9000/mirror/?x=1").unwrap());
        assert_eq!(site.today().as_str(), "http://127.0.0.1:9000/mirror/today");
        assert_eq!(site.home().as_str(), "http://127.0.0.1:9000/mirror/");
    }

    #[test]
    fn upstream_page_is_zero_based() {
        assert_eq!(upstream_page(None), Some(0));
        assert_eq!(upstream_page(Some("")), Some(0));
        assert_eq!(upstream_page(Some("0")), Some(0));
        assert_eq!(upstream_page(Some("1")), Some(0));
        assert_eq!(upstream_page(Some("2")), Some(1));
        assert_eq!(upstream_page(Some(" 10 ")), Some(9));
    }

    #[test]
    fn upstream_page_rejects_non_numbers() {
        assert_eq!(upstream_page(Some("two")), None);
        assert_eq!(upstream_page(Some("-1")), None);
        assert_eq!(upstream_page(Some("1.5")), None);
    }
}
