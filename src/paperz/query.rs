//! Query composition for the server's document list endpoint.
//!
//! Criteria are collected as an ordered list of key/value pairs and only
//! joined into a query string at the end. Repeating a parameter is
//! load-bearing server behaviour: the server intersects repeated
//! `tags__id` values, so emitting one pair per tag is how "all of these
//! tags" is expressed on the wire.

use crate::model::{EntityKind, Identifier};
use crate::registry::Registry;

/// An ordered set of query parameters, percent-encoded on insertion.
#[derive(Debug, Default, Clone)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair, percent-encoding the value.
    pub fn push(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        self.pairs
            .push((key.to_string(), urlencoding::encode(&value).into_owned()));
    }

    /// Add a pair whose value is already encoded (used for the `query`
    /// parameter, whose terms are joined with a literal `%20`).
    pub fn push_preencoded(&mut self, key: &str, value: String) {
        self.pairs.push((key.to_string(), value));
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn render(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Compound criteria for one document query.
#[derive(Debug, Default, Clone)]
pub struct DocumentQuery {
    pub correspondent: Option<Identifier>,
    pub doc_type: Option<Identifier>,
    pub tags: Vec<Identifier>,
    /// Comma-separated free-text content terms.
    pub content_terms: Option<String>,
    /// Partial date, e.g. `2019`, `2019-07`, `20190715`.
    pub date: Option<String>,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn correspondent(mut self, ident: Identifier) -> Self {
        self.correspondent = Some(ident);
        self
    }

    pub fn doc_type(mut self, ident: Identifier) -> Self {
        self.doc_type = Some(ident);
        self
    }

    pub fn tags(mut self, tags: Vec<Identifier>) -> Self {
        self.tags = tags;
        self
    }

    pub fn content_terms(mut self, terms: impl Into<String>) -> Self {
        self.content_terms = Some(terms.into());
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.correspondent.is_none()
            && self.doc_type.is_none()
            && self.tags.is_empty()
            && self.content_terms.is_none()
            && self.date.is_none()
    }

    /// Build the query parameters, resolving names against the registry.
    ///
    /// A criterion that cannot be resolved is omitted and reported in the
    /// returned warnings; it never fails the query as a whole.
    pub fn to_params(&self, registry: &Registry) -> (QueryString, Vec<String>) {
        let mut params = QueryString::new();
        let mut warnings = Vec::new();

        if let Some(terms) = &self.content_terms {
            let joined = terms
                .split(',')
                .map(|t| urlencoding::encode(t).into_owned())
                .collect::<Vec<_>>()
                .join("%20");
            params.push_preencoded("query", joined);
        }

        if let Some(ident) = &self.correspondent {
            Self::criterion(
                registry,
                EntityKind::Correspondent,
                ident,
                "correspondent__id",
                &mut params,
                &mut warnings,
            );
        }
        if let Some(ident) = &self.doc_type {
            Self::criterion(
                registry,
                EntityKind::DocType,
                ident,
                "document_type__id",
                &mut params,
                &mut warnings,
            );
        }
        for ident in &self.tags {
            Self::criterion(
                registry,
                EntityKind::Tag,
                ident,
                "tags__id",
                &mut params,
                &mut warnings,
            );
        }

        if let Some(date) = &self.date {
            push_date_params(date, &mut params);
        }

        (params, warnings)
    }

    fn criterion(
        registry: &Registry,
        kind: EntityKind,
        ident: &Identifier,
        key: &str,
        params: &mut QueryString,
        warnings: &mut Vec<String>,
    ) {
        match registry.resolve(kind, ident) {
            Ok(id) => params.push(key, id),
            Err(err) => warnings.push(err.to_string()),
        }
    }
}

/// Split a partial date into year/month/day criteria.
///
/// `-` and `/` separators are stripped first; the first 4 digits select
/// the year, digits 5-6 the month, digits 7-8 the day. Shorter inputs
/// match on whatever prefix they provide.
fn push_date_params(date: &str, params: &mut QueryString) {
    let digits: String = date.chars().filter(|c| *c != '-' && *c != '/').collect();
    if digits.len() >= 4 && digits.is_char_boundary(4) {
        params.push("created__year", &digits[..4]);
    }
    if digits.len() >= 6 && digits.is_char_boundary(6) {
        params.push("created__month", &digits[4..6]);
    }
    if digits.len() >= 8 && digits.is_char_boundary(8) {
        params.push("created__day", &digits[6..8]);
    }
}
