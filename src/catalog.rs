// src/catalog.rs
//! Language tabs, search box and newest/oldest ordering as the pages apply
//! them to a fetched collection. The HTTP endpoints never filter.
//!
//! Rows are read as stored, so a hand-edited row missing a field is kept and
//! simply matches nothing on that field.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{AudioLecture, Book, Poem, Quote, ReformSession};
use crate::repository::row_id;

/// Which row fields the list views look at.
pub trait Listing {
    /// Language tag field, if the collection has one.
    const LANG: Option<&'static str>;

    /// Fields the search box matches against.
    const SEARCH: &'static [&'static str];

    /// Publication date used for ordering, when the record carries one.
    const DATE: Option<&'static str> = None;
}

impl Listing for AudioLecture {
    const LANG: Option<&'static str> = Some("lang");
    const SEARCH: &'static [&'static str] = &["title", "scholar"];
    const DATE: Option<&'static str> = Some("date");
}

impl Listing for ReformSession {
    const LANG: Option<&'static str> = Some("lang");
    const SEARCH: &'static [&'static str] = &["title", "scholar"];
}

impl Listing for Poem {
    const LANG: Option<&'static str> = Some("lang");
    const SEARCH: &'static [&'static str] = &["title", "poet"];
}

impl Listing for Quote {
    const LANG: Option<&'static str> = Some("lang");
    const SEARCH: &'static [&'static str] = &["quote", "author"];
}

impl Listing for Book {
    const LANG: Option<&'static str> = None;
    const SEARCH: &'static [&'static str] = &["title", "author"];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" | "desc" => Ok(SortOrder::Newest),
            "oldest" | "asc" => Ok(SortOrder::Oldest),
            other => Err(format!("unknown sort order '{}', expected newest or oldest", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    pub lang: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

fn field<'a>(row: &'a Value, name: Option<&str>) -> Option<&'a str> {
    row.get(name?)?.as_str()
}

/// Filter and order a collection the way the list pages do.
pub fn arrange<T: Listing>(rows: Vec<Value>, query: &CatalogQuery) -> Vec<Value> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut rows: Vec<_> = rows
        .into_iter()
        .filter(|row| match (&query.lang, field(row, T::LANG)) {
            (Some(wanted), Some(lang)) => lang.eq_ignore_ascii_case(wanted),
            _ => true,
        })
        .filter(|row| match &needle {
            Some(needle) => T::SEARCH
                .iter()
                .filter_map(|name| field(row, Some(name)))
                .any(|text| text.to_lowercase().contains(needle.as_str())),
            None => true,
        })
        .collect();

    rows.sort_by(|a, b| {
        let oldest_first = compare_age::<T>(a, b);
        match query.sort {
            SortOrder::Oldest => oldest_first,
            SortOrder::Newest => oldest_first.reverse(),
        }
    });

    rows
}

fn compare_age<T: Listing>(a: &Value, b: &Value) -> Ordering {
    let by_id = row_id(a).cmp(&row_id(b));
    match (field(a, T::DATE), field(b, T::DATE)) {
        (Some(left), Some(right)) => left.cmp(right).then(by_id),
        _ => by_id,
    }
}
