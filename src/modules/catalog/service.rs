use std::sync::Arc;

use libris_db::{Predicate, RecordStore, StoreError};
use serde_json::Value;
use thiserror::Error;

use super::models::{Author, Book, BookFilter, ResetSummary};
use super::validation::{self, ValidationError};

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Stateless catalog operations over an injected record store.
///
/// Nothing is cached: every read goes to the store.
pub struct CatalogService<S> {
    store: Arc<S>,
}

impl<S> Clone for CatalogService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: RecordStore> CatalogService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate and upsert a book. Returns the validated input, not a re-read
    /// of the stored row.
    pub fn upsert_book(&self, input: &Value) -> CatalogResult<Book> {
        let book = validation::book_from_json(input)?;
        self.store.put(&book)?;
        tracing::info!(module = "catalog", id = %book.id, "book upserted");
        Ok(book)
    }

    /// Validate and upsert an author, echoing the validated input.
    pub fn upsert_author(&self, input: &Value) -> CatalogResult<Author> {
        let author = validation::author_from_json(input)?;
        self.store.put(&author)?;
        tracing::info!(module = "catalog", id = %author.id, "author upserted");
        Ok(author)
    }

    pub fn list_books(&self, filter: &BookFilter) -> CatalogResult<Vec<Book>> {
        let books = self.store.scan::<Book>(&filter.predicate())?;
        tracing::debug!(module = "catalog", ?filter, matched = books.len(), "books listed");
        Ok(books)
    }

    pub fn list_authors(&self) -> CatalogResult<Vec<Author>> {
        Ok(self.store.scan::<Author>(&Predicate::all())?)
    }

    pub fn get_book(&self, id: &str) -> CatalogResult<Book> {
        self.store
            .get::<Book>(id)?
            .ok_or_else(|| CatalogError::NotFound {
                kind: "book",
                id: id.to_string(),
            })
    }

    pub fn get_author(&self, id: &str) -> CatalogResult<Author> {
        self.store
            .get::<Author>(id)?
            .ok_or_else(|| CatalogError::NotFound {
                kind: "author",
                id: id.to_string(),
            })
    }

    /// Replace the whole catalog with the seed collections: delete all books
    /// and authors, then insert every author followed by every book.
    ///
    /// The phases are separate store calls. A concurrent reader may observe
    /// an empty or partially seeded catalog, and a failure part-way leaves
    /// whatever had been written so far.
    pub fn reset_all(&self, seed_books: &[Book], seed_authors: &[Author]) -> CatalogResult<ResetSummary> {
        let removed_books = self.store.delete_all::<Book>()?;
        let removed_authors = self.store.delete_all::<Author>()?;

        for author in seed_authors {
            self.store.put(author)?;
        }
        for book in seed_books {
            self.store.put(book)?;
        }

        tracing::info!(
            module = "catalog",
            removed_books,
            removed_authors,
            authors = seed_authors.len(),
            books = seed_books.len(),
            "catalog reset"
        );
        Ok(ResetSummary::new(seed_authors.len(), seed_books.len()))
    }
}

impl BookFilter {
    /// Store predicate for the provided constraints. Empty text is ignored.
    pub fn predicate(&self) -> Predicate {
        let mut predicate = Predicate::all();

        if let Some(title) = non_empty(&self.title) {
            predicate = predicate.contains("title", title);
        }
        if let Some(author_id) = non_empty(&self.author_id) {
            predicate = predicate.equals("author_id", author_id.to_string());
        }
        if let Some(language) = non_empty(&self.language) {
            predicate = predicate.equals("language", language.to_string());
        }
        if let Some(min_pages) = self.min_pages {
            predicate = predicate.at_least("pages", min_pages);
        }
        if let Some(max_pages) = self.max_pages {
            predicate = predicate.at_most("pages", max_pages);
        }
        if let Some(genre) = non_empty(&self.genre) {
            predicate = predicate.equals("genre", genre.to_string());
        }

        predicate
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_db::Condition;

    #[test]
    fn empty_filter_matches_everything() {
        assert!(BookFilter::default().predicate().is_empty());
    }

    #[test]
    fn blank_text_parameters_are_ignored() {
        let filter = BookFilter {
            title: Some(String::new()),
            genre: Some(String::new()),
            min_pages: Some(0),
            ..BookFilter::default()
        };
        assert_eq!(
            filter.predicate().conditions(),
            &[Condition::AtLeast {
                column: "pages",
                bound: 0
            }]
        );
    }

    #[test]
    fn every_field_maps_to_a_condition() {
        let filter = BookFilter {
            title: Some("Harry".to_string()),
            author_id: Some("a1".to_string()),
            language: Some("en".to_string()),
            min_pages: Some(100),
            max_pages: Some(300),
            genre: Some("fantasy".to_string()),
        };
        assert_eq!(filter.predicate().conditions().len(), 6);
        assert_eq!(
            filter.predicate().conditions()[0],
            Condition::Contains {
                column: "title",
                needle: "Harry".to_string()
            }
        );
    }
}
