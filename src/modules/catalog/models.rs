use libris_db::Record;
use libris_db::rusqlite::{self, types::Value, Row};
use serde::{Deserialize, Serialize};

/// A book in the catalog. `author_id` is advisory: nothing checks that the
/// author exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(alias = "uuid")]
    pub id: String,
    pub title: String,
    #[serde(alias = "author_uuid")]
    pub author_id: String,
    pub description: String,
    pub pages: u32,
    pub language: String,
    pub genre: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(alias = "uuid")]
    pub id: String,
    pub name: String,
}

/// Optional constraints for listing books, combined with AND.
///
/// Empty text parameters are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookFilter {
    /// Case-sensitive substring of the title.
    pub title: Option<String>,
    #[serde(alias = "author_uuid")]
    pub author_id: Option<String>,
    pub language: Option<String>,
    /// Inclusive.
    pub min_pages: Option<i64>,
    /// Inclusive.
    pub max_pages: Option<i64>,
    pub genre: Option<String>,
}

/// Acknowledgement returned by a catalog reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSummary {
    pub message: String,
    pub authors: usize,
    pub books: usize,
}

impl ResetSummary {
    pub const MESSAGE: &'static str = "Data reset to provided values.";

    pub fn new(authors: usize, books: usize) -> Self {
        Self {
            message: Self::MESSAGE.to_string(),
            authors,
            books,
        }
    }
}

impl Record for Book {
    const KIND: &'static str = "books";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "author_id",
        "description",
        "pages",
        "language",
        "genre",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.id.clone()),
            Value::Text(self.title.clone()),
            Value::Text(self.author_id.clone()),
            Value::Text(self.description.clone()),
            Value::Integer(i64::from(self.pages)),
            Value::Text(self.language.clone()),
            Value::Text(self.genre.clone()),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            author_id: row.get(2)?,
            description: row.get(3)?,
            pages: row.get(4)?,
            language: row.get(5)?,
            genre: row.get(6)?,
        })
    }
}

impl Record for Author {
    const KIND: &'static str = "authors";
    const COLUMNS: &'static [&'static str] = &["id", "name"];

    fn id(&self) -> &str {
        &self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![Value::Text(self.id.clone()), Value::Text(self.name.clone())]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}
