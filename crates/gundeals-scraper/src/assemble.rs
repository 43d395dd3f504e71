//! Drives a compiled [`RuleSet`] over fetched HTML.
//!
//! The document is parsed once. Every scope match becomes one [`Record`]
//! holding every field the rule set declares; a rule that matches nothing
//! produces an empty value. A page with no scope matches produces an empty
//! `Vec`, never an error.

use std::collections::BTreeMap;

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::record::{FieldValue, Record};
use crate::rules::{Extract, Rule, RuleSet, Scope};

/// Per-request values the rules need but do not own.
#[derive(Debug, Clone, Copy)]
pub struct AssembleContext<'a> {
    /// Relative links are resolved against this URL.
    pub base_url: &'a Url,
    /// Host used for details-derived product links.
    pub link_domain: &'a str,
}

/// Keeps a record only when the text of `field` equals `value`, ignoring case.
/// An empty `value` keeps every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: &'static str,
    pub value: String,
}

impl FieldFilter {
    #[must_use]
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    fn is_active(&self) -> bool {
        !self.value.is_empty()
    }

    fn matches(&self, candidate: &str) -> bool {
        candidate.to_lowercase() == self.value.to_lowercase()
    }
}

/// Applies `rules` to `html` and returns the records in document order.
///
/// When `filter` is active, the filtered field is evaluated first and a
/// non-matching scope element is skipped before any other rule (including
/// nested listings) runs. Filtering a document-scoped rule set can therefore
/// yield zero records.
#[must_use]
pub fn assemble(
    html: &str,
    rules: &RuleSet,
    ctx: &AssembleContext<'_>,
    filter: Option<&FieldFilter>,
) -> Vec<Record> {
    let document = Html::parse_document(html);
    let filter = filter.filter(|f| f.is_active());

    match &rules.scope {
        Scope::Document => build_record(document.root_element(), rules, ctx, filter)
            .into_iter()
            .collect(),
        Scope::Each(selector) => scoped_records(document.root_element(), selector, rules, ctx, filter),
    }
}

fn scoped_records(
    root: ElementRef<'_>,
    selector: &Selector,
    rules: &RuleSet,
    ctx: &AssembleContext<'_>,
    filter: Option<&FieldFilter>,
) -> Vec<Record> {
    root.select(selector)
        .filter(|el| !rules.skip_class.is_some_and(|class| has_class(*el, class)))
        .filter_map(|el| build_record(el, rules, ctx, filter))
        .collect()
}

fn build_record(
    scope: ElementRef<'_>,
    rules: &RuleSet,
    ctx: &AssembleContext<'_>,
    filter: Option<&FieldFilter>,
) -> Option<Record> {
    let mut record = Record::with_capacity(rules.rules.len());

    let mut prefetched = None;
    if let Some(filter) = filter {
        let Some(index) = rules.rules.iter().position(|r| r.field == filter.field) else {
            // A filter on an undeclared field compares against "".
            return None;
        };
        let value = extract(scope, &rules.rules[index], ctx, &record);
        if !filter.matches(value.as_text().unwrap_or("")) {
            return None;
        }
        prefetched = Some((index, value));
    }

    for (index, rule) in rules.rules.iter().enumerate() {
        let value = match prefetched.take() {
            Some((i, value)) if i == index => value,
            other => {
                prefetched = other;
                extract(scope, rule, ctx, &record)
            }
        };
        record.push(rule.field, value, rule.optional);
    }

    Some(record)
}

fn extract(
    scope: ElementRef<'_>,
    rule: &Rule,
    ctx: &AssembleContext<'_>,
    earlier: &Record,
) -> FieldValue {
    match &rule.extract {
        Extract::Text(selector) => FieldValue::Text(finish(child_text(scope, selector), rule.trim)),
        Extract::Attr { selector, attr } => {
            FieldValue::Text(finish(child_attr(scope, selector, attr), rule.trim))
        }
        Extract::Link { selector, attr } => {
            let href = child_attr(scope, selector, attr);
            FieldValue::Text(absolute_link(ctx.base_url, href.trim()))
        }
        Extract::Details {
            rows,
            label,
            value,
            strip_suffix,
        } => FieldValue::Details(details(scope, rows, label, value, *strip_suffix)),
        Extract::ClassToken(token) => FieldValue::Flag(has_class(scope, token)),
        Extract::Nested(nested) => {
            let records = match &nested.scope {
                Scope::Each(selector) => scoped_records(scope, selector, nested, ctx, None),
                Scope::Document => build_record(scope, nested, ctx, None).into_iter().collect(),
            };
            FieldValue::Records(records)
        }
        Extract::DetailsLink { details, key } => {
            let link = earlier
                .get(details)
                .and_then(FieldValue::as_details)
                .and_then(|map| map.get(*key))
                .map(|upc| format!("http://{}/product/{upc}", ctx.link_domain))
                .unwrap_or_default();
            FieldValue::Text(link)
        }
    }
}

fn finish(raw: String, trim: bool) -> String {
    if trim {
        raw.trim().to_owned()
    } else {
        raw
    }
}

fn child_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope.select(selector).flat_map(|el| el.text()).collect()
}

fn child_attr(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> String {
    scope
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .unwrap_or_default()
        .to_owned()
}

fn absolute_link(base: &Url, href: &str) -> String {
    if href.is_empty() {
        return String::new();
    }
    match base.join(href) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::debug!(href, error = %e, "could not resolve link against site base");
            String::new()
        }
    }
}

fn details(
    scope: ElementRef<'_>,
    rows: &Selector,
    label: &Selector,
    value: &Selector,
    strip_suffix: Option<&str>,
) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for row in scope.select(rows) {
        let raw_label = child_text(row, label);
        let mut name = raw_label.trim();
        if let Some(suffix) = strip_suffix {
            name = name.strip_suffix(suffix).unwrap_or(name).trim_end();
        }
        let text = child_text(row, value);
        let text = text.trim();
        if !name.is_empty() && !text.is_empty() {
            map.insert(name.to_owned(), text.to_owned());
        }
    }
    map
}

fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value()
        .classes()
        .any(|c| c.eq_ignore_ascii_case(class))
}

#[cfg(test)]
#[path = "assemble_test.rs"]
mod tests;
