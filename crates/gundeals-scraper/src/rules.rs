//! Declarative extraction rules.
//!
//! Rule sets are written as plain data ([`RuleSetSpec`]) and compiled once
//! into a [`RuleSet`] with parsed selectors. A selector that matches nothing
//! yields an empty value; it never aborts extraction.

use scraper::Selector;

use crate::error::RuleError;

/// Which elements anchor one record.
#[derive(Debug, Clone, Copy)]
pub enum ScopeSpec {
    /// One record per element matching the selector.
    Each(&'static str),
    /// Exactly one record for the whole document.
    Document,
}

/// How a field's value is read from its scope element.
#[derive(Debug, Clone, Copy)]
pub enum ExtractSpec {
    /// Concatenated text of every element matching `selector`.
    Text { selector: &'static str },
    /// Attribute of the first element matching `selector`.
    Attr {
        selector: &'static str,
        attr: &'static str,
    },
    /// Like [`ExtractSpec::Attr`], resolved against the site base URL.
    Link {
        selector: &'static str,
        attr: &'static str,
    },
    /// Label/value pairs, one per element matching `rows`. Pairs with an
    /// empty label or value are skipped.
    Details {
        rows: &'static str,
        label: &'static str,
        value: &'static str,
        strip_suffix: Option<&'static str>,
    },
    /// `true` when the scope element carries the class `token`.
    ClassToken { token: &'static str },
    /// Ordered sub-records, one per scope match of the nested rule set.
    Nested { rules: &'static RuleSetSpec },
    /// `http://{link_domain}/product/{value}` when the earlier details field
    /// `details` contains `key`, otherwise empty.
    DetailsLink {
        details: &'static str,
        key: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub field: &'static str,
    pub extract: ExtractSpec,
    /// Trim surrounding whitespace from text and attribute values.
    pub trim: bool,
    /// Leave the field out of serialized output when it is empty.
    pub optional: bool,
}

impl RuleSpec {
    #[must_use]
    pub const fn new(field: &'static str, extract: ExtractSpec) -> Self {
        Self {
            field,
            extract,
            trim: true,
            optional: false,
        }
    }

    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub const fn untrimmed(mut self) -> Self {
        self.trim = false;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RuleSetSpec {
    pub name: &'static str,
    pub scope: ScopeSpec,
    /// Scope elements carrying this class are skipped (e.g. table header rows).
    pub skip_class: Option<&'static str>,
    pub rules: &'static [RuleSpec],
}

#[derive(Debug)]
pub(crate) enum Scope {
    Each(Selector),
    Document,
}

#[derive(Debug)]
pub(crate) enum Extract {
    Text(Selector),
    Attr {
        selector: Selector,
        attr: &'static str,
    },
    Link {
        selector: Selector,
        attr: &'static str,
    },
    Details {
        rows: Selector,
        label: Selector,
        value: Selector,
        strip_suffix: Option<&'static str>,
    },
    ClassToken(&'static str),
    Nested(Box<RuleSet>),
    DetailsLink {
        details: &'static str,
        key: &'static str,
    },
}

#[derive(Debug)]
pub(crate) struct Rule {
    pub(crate) field: &'static str,
    pub(crate) extract: Extract,
    pub(crate) trim: bool,
    pub(crate) optional: bool,
}

/// A compiled rule set, ready for [`crate::assemble`].
#[derive(Debug)]
pub struct RuleSet {
    name: &'static str,
    pub(crate) scope: Scope,
    pub(crate) skip_class: Option<&'static str>,
    pub(crate) rules: Vec<Rule>,
}

impl RuleSet {
    /// Parses every selector in `spec`.
    ///
    /// # Errors
    ///
    /// - [`RuleError::InvalidSelector`] — a selector does not parse.
    /// - [`RuleError::UnknownDetailsField`] — a details-derived link refers to
    ///   a field that is not an earlier details rule.
    pub fn compile(spec: &RuleSetSpec) -> Result<Self, RuleError> {
        let parse = |selector: &'static str| {
            Selector::parse(selector).map_err(|e| RuleError::InvalidSelector {
                rule_set: spec.name,
                selector,
                reason: e.to_string(),
            })
        };

        let scope = match spec.scope {
            ScopeSpec::Each(selector) => Scope::Each(parse(selector)?),
            ScopeSpec::Document => Scope::Document,
        };

        let mut rules: Vec<Rule> = Vec::with_capacity(spec.rules.len());
        for rule in spec.rules {
            let extract = match rule.extract {
                ExtractSpec::Text { selector } => Extract::Text(parse(selector)?),
                ExtractSpec::Attr { selector, attr } => Extract::Attr {
                    selector: parse(selector)?,
                    attr,
                },
                ExtractSpec::Link { selector, attr } => Extract::Link {
                    selector: parse(selector)?,
                    attr,
                },
                ExtractSpec::Details {
                    rows,
                    label,
                    value,
                    strip_suffix,
                } => Extract::Details {
                    rows: parse(rows)?,
                    label: parse(label)?,
                    value: parse(value)?,
                    strip_suffix,
                },
                ExtractSpec::ClassToken { token } => Extract::ClassToken(token),
                ExtractSpec::Nested { rules: nested } => {
                    Extract::Nested(Box::new(RuleSet::compile(nested)?))
                }
                ExtractSpec::DetailsLink { details, key } => {
                    let known = rules
                        .iter()
                        .any(|r| r.field == details && matches!(r.extract, Extract::Details { .. }));
                    if !known {
                        return Err(RuleError::UnknownDetailsField {
                            rule_set: spec.name,
                            field: rule.field,
                            details,
                        });
                    }
                    Extract::DetailsLink { details, key }
                }
            };
            rules.push(Rule {
                field: rule.field,
                extract,
                trim: rule.trim,
                optional: rule.optional,
            });
        }

        Ok(Self {
            name: spec.name,
            scope,
            skip_class: spec.skip_class,
            rules,
        })
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared field names in order.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.field)
    }

    /// `true` when the rule set yields one record for the whole document.
    #[must_use]
    pub fn is_document_scoped(&self) -> bool {
        matches!(self.scope, Scope::Document)
    }
}
