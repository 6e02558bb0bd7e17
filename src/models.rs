// src/models.rs
//! Content records served by the site.
//!
//! Every collection stores flat records; the only thing shared between them is
//! the `lang` tag the pages filter on. Identifiers live on [`Stored`] so the
//! record types can be sent to a hosted table without one.

use serde::{Deserialize, Serialize};

/// A record together with the integer identifier its store assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<T> {
    pub id: i64,
    #[serde(flatten)]
    pub record: T,
}

impl<T> Stored<T> {
    pub fn new(id: i64, record: T) -> Self {
        Self { id, record }
    }
}

/// Audio bayan (lecture). Hamd, naat and kalaam recordings share the shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioLecture {
    pub title: String,
    pub scholar: String,
    pub duration: String,
    pub lang: String,
    pub url: String,
    /// `YYYY-MM-DD`, stamped when the record is created.
    pub date: String,
}

pub type HymnOrChant = AudioLecture;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poem {
    pub title: String,
    pub poet: String,
    pub lang: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub quote: String,
    pub author: String,
    pub source: String,
    pub lang: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    #[serde(default = "default_price")]
    pub price: String,
    pub link: String,
}

pub fn default_price() -> String {
    "Free".to_string()
}

/// Islahi majlis recording. Usually kept in the hosted table, which may add
/// its own timestamp column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReformSession {
    pub title: String,
    pub scholar: String,
    pub duration: String,
    pub lang: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
