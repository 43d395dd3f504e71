use gundeals_core::AppConfig;
use reqwest::Url;

use crate::assemble::{assemble, AssembleContext, FieldFilter};
use crate::catalog::{PageType, RuleCatalog};
use crate::error::{BuildError, FetchError};
use crate::fetcher::{FetchRequest, FetcherConfig, FetcherFactory};
use crate::record::Record;
use crate::site::SiteRoutes;

/// Fetch one page and run the rule set for its page type over it.
///
/// Everything in here is immutable after construction and safe to share
/// between concurrent requests; each [`Pipeline::scrape`] call draws its own
/// [`crate::Fetcher`] from the factory.
#[derive(Debug)]
pub struct Pipeline {
    factory: FetcherFactory,
    catalog: RuleCatalog,
    site: SiteRoutes,
    link_domain: String,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        factory: FetcherFactory,
        catalog: RuleCatalog,
        site: SiteRoutes,
        link_domain: impl Into<String>,
    ) -> Self {
        Self {
            factory,
            catalog,
            site,
            link_domain: link_domain.into(),
        }
    }

    /// Wires the fetcher, rule catalog and site routes from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the HTTP client cannot be built or a
    /// built-in rule set fails to compile.
    pub fn from_config(config: &AppConfig) -> Result<Self, BuildError> {
        let factory = FetcherFactory::new(FetcherConfig::from_app_config(config))?;
        let catalog = RuleCatalog::new()?;
        Ok(Self::new(
            factory,
            catalog,
            SiteRoutes::new(config.site_url.clone()),
            config.link_domain.clone(),
        ))
    }

    #[must_use]
    pub fn site(&self) -> &SiteRoutes {
        &self.site
    }

    /// Fetches `url` and assembles its records with the `page` rule set.
    ///
    /// An empty `Vec` means the page was fetched but nothing matched; it is
    /// up to the caller to decide what that means for its route.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the page could not be obtained. No
    /// extraction is attempted in that case.
    pub async fn scrape(
        &self,
        page: PageType,
        url: Url,
        filter: Option<&FieldFilter>,
    ) -> Result<Vec<Record>, FetchError> {
        let request = FetchRequest::from_url(url)?;
        let response = self.factory.fetcher().fetch(request).await?;

        let rules = self.catalog.get(page);
        let ctx = AssembleContext {
            base_url: &response.url,
            link_domain: &self.link_domain,
        };
        let records = assemble(&response.body, rules, &ctx, filter);

        tracing::debug!(
            url = %response.url,
            rule_set = rules.name(),
            records = records.len(),
            "page assembled"
        );
        Ok(records)
    }
}
