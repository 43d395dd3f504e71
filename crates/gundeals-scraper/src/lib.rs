pub mod assemble;
pub mod catalog;
pub mod error;
pub mod fetcher;
pub mod pipeline;
pub mod record;
pub mod rules;
pub mod site;

pub use assemble::{assemble, AssembleContext, FieldFilter};
pub use catalog::{PageType, RuleCatalog};
pub use error::{BuildError, FetchError, RuleError};
pub use fetcher::{FetchRequest, FetchResponse, Fetcher, FetcherConfig, FetcherFactory};
pub use pipeline::Pipeline;
pub use record::{FieldValue, Record};
pub use rules::{ExtractSpec, RuleSet, RuleSetSpec, RuleSpec, ScopeSpec};
pub use site::{upstream_page, SiteRoutes};
