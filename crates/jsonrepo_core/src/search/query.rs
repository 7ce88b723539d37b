//! Parameter parsing and the filter-then-sort query engine.
//!
//! # Responsibility
//! - Split request parameters into sort keys and search keys.
//! - Apply search keys sequentially, then sort with the chained comparator.
//!
//! # Invariants
//! - A parameter named `sort` (any case) only ever contributes sort keys.
//! - Sort key precedence follows caller token order.
//! - Keys naming unrecognized fields are dropped silently.

use crate::model::record::Record;
use crate::search::compare::{compare_records, SortKey};
use crate::search::matcher::WildcardMatcher;
use crate::search::params::QueryParams;
use log::debug;

/// Reserved parameter name carrying sort tokens.
pub const SORT_PARAM: &str = "sort";
/// Separator between field name and direction inside a sort token.
pub const SORT_TOKEN_DELIMITER: char = ',';
/// Direction keyword selecting descending order.
pub const DESCENDING_KEYWORD: &str = "desc";

/// One field filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchKey {
    pub field: String,
    pub pattern: String,
}

/// Sort and search keys extracted from request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    pub sort_keys: Vec<SortKey>,
    pub search_keys: Vec<SearchKey>,
}

/// Parses request parameters against a field-membership test.
///
/// Every value of a multi-valued filter parameter becomes its own search key.
pub fn parse_query(params: &QueryParams, has_field: &dyn Fn(&str) -> bool) -> ParsedQuery {
    let mut parsed = ParsedQuery::default();
    for (name, value) in params.iter() {
        if name.eq_ignore_ascii_case(SORT_PARAM) {
            for token in value.values() {
                if let Some(key) = parse_sort_token(token, has_field) {
                    parsed.sort_keys.push(key);
                }
            }
        } else if has_field(name) {
            for pattern in value.values() {
                parsed.search_keys.push(SearchKey {
                    field: name.to_string(),
                    pattern: pattern.to_string(),
                });
            }
        } else {
            debug!("event=query_parse module=search status=skipped param={name}");
        }
    }
    parsed
}

/// Parses a `field[,direction]` token.
pub fn parse_sort_token(token: &str, has_field: &dyn Fn(&str) -> bool) -> Option<SortKey> {
    let mut parts = token.split(SORT_TOKEN_DELIMITER);
    let field = parts.next().unwrap_or_default().trim();
    if !has_field(field) {
        debug!("event=query_parse module=search status=skipped sort_field={field}");
        return None;
    }
    let descending = parts
        .next()
        .is_some_and(|direction| direction.trim().eq_ignore_ascii_case(DESCENDING_KEYWORD));
    Some(SortKey {
        field: field.to_string(),
        ascending: !descending,
    })
}

/// Stateless filter/sort executor.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEngine;

impl QueryEngine {
    /// Filters with every search key (AND), then stable-sorts the survivors.
    pub fn apply(records: Vec<Record>, query: &ParsedQuery) -> Vec<Record> {
        let mut results = Self::filter(records, &query.search_keys);
        Self::sort(&mut results, &query.sort_keys);
        results
    }

    /// Narrows `records` by each search key in turn.
    pub fn filter(records: Vec<Record>, search_keys: &[SearchKey]) -> Vec<Record> {
        search_keys.iter().fold(records, |current, key| {
            let matcher = WildcardMatcher::new(&key.pattern);
            current
                .into_iter()
                .filter(|record| matcher.matches(record.get(&key.field)))
                .collect()
        })
    }

    /// Sorts in place; records tying on every key keep their relative order.
    pub fn sort(records: &mut [Record], sort_keys: &[SortKey]) {
        if sort_keys.is_empty() {
            return;
        }
        records.sort_by(|a, b| compare_records(a, b, sort_keys));
    }
}
