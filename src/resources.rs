// src/resources.rs
//! The six content collections and their create-time validation.
//!
//! Each collection is a zero-sized marker implementing [`Resource`]. The marker
//! names the API path, hosted table and backing file, and turns a raw JSON body
//! into a record ready for the store.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::catalog::Listing;
use crate::models::{default_price, AudioLecture, Book, HymnOrChant, Poem, Quote, ReformSession};
use crate::repository::{Repositories, ResourceStore};

/// API path segments of every collection, in route order.
pub const PATHS: [&str; 6] = [
    AudioBayanat::PATH,
    HamdoNaat::PATH,
    Poems::PATH,
    Quotes::PATH,
    Books::PATH,
    IslahiMajalis::PATH,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Request body must be a JSON object")]
    NotAnObject,
}

/// A create-only content collection.
pub trait Resource: Send + Sync + 'static {
    type Record: Serialize + Listing + Send + Sync + 'static;

    /// Segment under `/api/`.
    const PATH: &'static str;
    /// Table name in the hosted store.
    const TABLE: &'static str;
    /// File name inside the data directory.
    const FILE: &'static str;
    /// Human readable name used in log lines and error bodies.
    const LABEL: &'static str;

    /// Validate a request body and build the record to append.
    fn prepare(body: &Value, today: NaiveDate) -> Result<Self::Record, ValidationError>;

    fn store(repositories: &Repositories) -> &Arc<dyn ResourceStore<Self::Record>>;
}

pub struct AudioBayanat;
pub struct HamdoNaat;
pub struct Poems;
pub struct Quotes;
pub struct Books;
pub struct IslahiMajalis;

impl Resource for AudioBayanat {
    type Record = AudioLecture;

    const PATH: &'static str = "audiobayanat";
    const TABLE: &'static str = "audiobayanat";
    const FILE: &'static str = "audiobayanat.json";
    const LABEL: &'static str = "audiobayanat";

    fn prepare(body: &Value, today: NaiveDate) -> Result<AudioLecture, ValidationError> {
        recording(body, today)
    }

    fn store(repositories: &Repositories) -> &Arc<dyn ResourceStore<AudioLecture>> {
        &repositories.audio_bayanat
    }
}

impl Resource for HamdoNaat {
    type Record = HymnOrChant;

    const PATH: &'static str = "hamdonaatokalaam";
    const TABLE: &'static str = "hamdonaatokalaam";
    const FILE: &'static str = "hamdonaatokalaam.json";
    const LABEL: &'static str = "hamdonaatokalaam";

    fn prepare(body: &Value, today: NaiveDate) -> Result<HymnOrChant, ValidationError> {
        recording(body, today)
    }

    fn store(repositories: &Repositories) -> &Arc<dyn ResourceStore<HymnOrChant>> {
        &repositories.hamdonaat
    }
}

impl Resource for Poems {
    type Record = Poem;

    const PATH: &'static str = "poems";
    const TABLE: &'static str = "poems";
    const FILE: &'static str = "poems.json";
    const LABEL: &'static str = "poem";

    fn prepare(body: &Value, _today: NaiveDate) -> Result<Poem, ValidationError> {
        let mut fields = Fields::new(body)?;
        let poem = Poem {
            title: fields.text("title"),
            poet: fields.text("poet"),
            lang: fields.text("lang"),
            lines: fields.lines("lines"),
        };
        fields.finish()?;
        Ok(poem)
    }

    fn store(repositories: &Repositories) -> &Arc<dyn ResourceStore<Poem>> {
        &repositories.poems
    }
}

impl Resource for Quotes {
    type Record = Quote;

    const PATH: &'static str = "quotes";
    const TABLE: &'static str = "quotes";
    const FILE: &'static str = "quotes.json";
    const LABEL: &'static str = "quote";

    fn prepare(body: &Value, _today: NaiveDate) -> Result<Quote, ValidationError> {
        let mut fields = Fields::new(body)?;
        let quote = Quote {
            quote: fields.text("quote"),
            author: fields.text("author"),
            source: fields.text("source"),
            lang: fields.text("lang"),
        };
        fields.finish()?;
        Ok(quote)
    }

    fn store(repositories: &Repositories) -> &Arc<dyn ResourceStore<Quote>> {
        &repositories.quotes
    }
}

impl Resource for Books {
    type Record = Book;

    const PATH: &'static str = "books";
    const TABLE: &'static str = "books";
    const FILE: &'static str = "books.json";
    const LABEL: &'static str = "book";

    fn prepare(body: &Value, _today: NaiveDate) -> Result<Book, ValidationError> {
        let mut fields = Fields::new(body)?;
        let book = Book {
            title: fields.text("title"),
            author: fields.text("author"),
            price: fields.optional_text("price").unwrap_or_else(default_price),
            link: fields.text("link"),
        };
        fields.finish()?;
        Ok(book)
    }

    fn store(repositories: &Repositories) -> &Arc<dyn ResourceStore<Book>> {
        &repositories.books
    }
}

impl Resource for IslahiMajalis {
    type Record = ReformSession;

    const PATH: &'static str = "islahimajalis";
    const TABLE: &'static str = "islahi_majalis";
    const FILE: &'static str = "islahimajalis.json";
    const LABEL: &'static str = "islahi majalis";

    fn prepare(body: &Value, _today: NaiveDate) -> Result<ReformSession, ValidationError> {
        let mut fields = Fields::new(body)?;
        let session = ReformSession {
            title: fields.text("title"),
            scholar: fields.text("scholar"),
            duration: fields.text("duration"),
            lang: fields.text("lang"),
            url: fields.text("url"),
            created_at: None,
        };
        fields.finish()?;
        Ok(session)
    }

    fn store(repositories: &Repositories) -> &Arc<dyn ResourceStore<ReformSession>> {
        &repositories.islahi_majalis
    }
}

fn recording(body: &Value, today: NaiveDate) -> Result<AudioLecture, ValidationError> {
    let mut fields = Fields::new(body)?;
    let lecture = AudioLecture {
        title: fields.text("title"),
        scholar: fields.text("scholar"),
        duration: fields.text("duration"),
        lang: fields.text("lang"),
        url: fields.text("url"),
        date: today.format("%Y-%m-%d").to_string(),
    };
    fields.finish()?;
    Ok(lecture)
}

/// Pulls required values out of a body object, remembering which were absent.
struct Fields<'a> {
    body: &'a Map<String, Value>,
    missing: Vec<&'static str>,
}

impl<'a> Fields<'a> {
    fn new(body: &'a Value) -> Result<Self, ValidationError> {
        let body = body.as_object().ok_or(ValidationError::NotAnObject)?;
        Ok(Self {
            body,
            missing: Vec::new(),
        })
    }

    fn text(&mut self, name: &'static str) -> String {
        self.optional_text(name).unwrap_or_else(|| {
            self.missing.push(name);
            String::new()
        })
    }

    /// Non-empty strings and non-zero numbers count as present.
    fn optional_text(&self, name: &str) -> Option<String> {
        match self.body.get(name)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            _ => None,
        }
    }

    /// A non-empty array of strings.
    fn lines(&mut self, name: &'static str) -> Vec<String> {
        let lines = match self.body.get(name) {
            Some(Value::Array(items)) if !items.is_empty() => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>(),
            _ => None,
        };

        lines.unwrap_or_else(|| {
            self.missing.push(name);
            Vec::new()
        })
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(self.missing))
        }
    }
}
