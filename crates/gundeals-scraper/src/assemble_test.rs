use reqwest::Url;

use super::*;
use crate::rules::{ExtractSpec, RuleSetSpec, RuleSpec, ScopeSpec};

static ROWS: RuleSetSpec = RuleSetSpec {
    name: "rows",
    scope: ScopeSpec::Each("li.row"),
    skip_class: Some("skip"),
    rules: &[
        RuleSpec::new("name", ExtractSpec::Text { selector: ".name" }),
        RuleSpec::new("raw", ExtractSpec::Text { selector: ".name" }).untrimmed(),
        RuleSpec::new(
            "href",
            ExtractSpec::Link {
                selector: "a",
                attr: "href",
            },
        ),
        RuleSpec::new("hot", ExtractSpec::ClassToken { token: "HOT" }),
    ],
};

static PAGE: RuleSetSpec = RuleSetSpec {
    name: "page",
    scope: ScopeSpec::Document,
    skip_class: None,
    rules: &[
        RuleSpec::new("heading", ExtractSpec::Text { selector: "h1" }),
        RuleSpec::new("rows", ExtractSpec::Nested { rules: &ROWS }),
    ],
};

const LIST_HTML: &str = r#"
<ul>
  <li class="row hot"><span class="name">  Alpha </span><a href="/a">a</a></li>
  <li class="row skip"><span class="name">Hidden</span></li>
  <li class="row"><span class="name">Beta</span><span class="name">Two</span></li>
</ul>
"#;

fn with_ctx<T>(f: impl FnOnce(&AssembleContext<'_>) -> T) -> T {
    let base = Url::parse("https://gun.deals/").unwrap();
    let ctx = AssembleContext {
        base_url: &base,
        link_domain: "localhost:8080",
    };
    f(&ctx)
}

#[test]
fn zero_scope_matches_yield_empty_sequence() {
    let rules = RuleSet::compile(&ROWS).unwrap();
    let records = with_ctx(|ctx| assemble("<p>nothing here</p>", &rules, ctx, None));
    assert!(records.is_empty());
}

#[test]
fn unparseable_markup_degrades_to_empty_values() {
    let rules = RuleSet::compile(&PAGE).unwrap();
    let records = with_ctx(|ctx| assemble("<<<>>>", &rules, ctx, None));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text("heading"), "");
    assert_eq!(records[0].get("rows"), Some(&FieldValue::Records(vec![])));
}

#[test]
fn every_declared_field_is_present_even_when_unmatched() {
    let rules = RuleSet::compile(&ROWS).unwrap();
    let records = with_ctx(|ctx| assemble(LIST_HTML, &rules, ctx, None));
    assert_eq!(records.len(), 2, "skip-class row is dropped");
    let beta = &records[1];
    assert_eq!(
        beta.field_names().collect::<Vec<_>>(),
        vec!["name", "raw", "href", "hot"]
    );
    assert_eq!(beta.text("href"), "");
    assert_eq!(beta.get("hot"), Some(&FieldValue::Flag(false)));
}

#[test]
fn text_concatenates_all_matches_and_trims_on_request() {
    let rules = RuleSet::compile(&ROWS).unwrap();
    let records = with_ctx(|ctx| assemble(LIST_HTML, &rules, ctx, None));
    assert_eq!(records[0].text("name"), "Alpha");
    assert_eq!(records[0].text("raw"), "  Alpha ");
    assert_eq!(records[1].text("name"), "BetaTwo");
}

#[test]
fn links_resolve_against_site_base_and_class_tokens_ignore_case() {
    let rules = RuleSet::compile(&ROWS).unwrap();
    let records = with_ctx(|ctx| assemble(LIST_HTML, &rules, ctx, None));
    assert_eq!(records[0].text("href"), "https://gun.deals/a");
    assert_eq!(records[0].get("hot"), Some(&FieldValue::Flag(true)));
}

#[test]
fn nested_rule_set_runs_inside_scope() {
    let rules = RuleSet::compile(&PAGE).unwrap();
    let html = format!("<h1> Listing </h1>{LIST_HTML}");
    let records = with_ctx(|ctx| assemble(&html, &rules, ctx, None));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text("heading"), "Listing");
    let rows = records[0]
        .get("rows")
        .and_then(FieldValue::as_records)
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].text("name"), "BetaTwo");
}

#[test]
fn assembling_twice_is_identical() {
    let rules = RuleSet::compile(&PAGE).unwrap();
    let html = format!("<h1>Listing</h1>{LIST_HTML}");
    let (first, second) = with_ctx(|ctx| {
        (
            assemble(&html, &rules, ctx, None),
            assemble(&html, &rules, ctx, None),
        )
    });
    assert_eq!(first, second);
}

#[test]
fn filter_keeps_only_case_insensitive_matches() {
    let rules = RuleSet::compile(&ROWS).unwrap();
    let filter = FieldFilter::new("name", "ALPHA");
    let records = with_ctx(|ctx| assemble(LIST_HTML, &rules, ctx, Some(&filter)));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text("name"), "Alpha");
    assert_eq!(
        records[0].field_names().collect::<Vec<_>>(),
        vec!["name", "raw", "href", "hot"],
        "prefetched filter field keeps its declared position"
    );
}

#[test]
fn filter_is_exact_not_substring() {
    let rules = RuleSet::compile(&ROWS).unwrap();
    let filter = FieldFilter::new("name", "alp");
    let records = with_ctx(|ctx| assemble(LIST_HTML, &rules, ctx, Some(&filter)));
    assert!(records.is_empty());
}

#[test]
fn empty_filter_keeps_everything() {
    let rules = RuleSet::compile(&ROWS).unwrap();
    let filter = FieldFilter::new("name", "");
    let records = with_ctx(|ctx| assemble(LIST_HTML, &rules, ctx, Some(&filter)));
    assert_eq!(records.len(), 2);
}

#[test]
fn filter_on_undeclared_field_matches_nothing() {
    let rules = RuleSet::compile(&ROWS).unwrap();
    let filter = FieldFilter::new("store", "acme");
    let records = with_ctx(|ctx| assemble(LIST_HTML, &rules, ctx, Some(&filter)));
    assert!(records.is_empty());
}
