//! Book (catalog title) model and reference data

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book_instance::LoanStatus;

/// Book genre (e.g. Science Fiction, Non-fiction)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// Language a book is written in
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Language {
    pub id: i32,
    pub name: String,
}

/// Author name as shown alongside a book
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuthorRef {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

/// Title-only reference to a book
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookRef {
    pub id: i32,
    pub title: String,
}

/// Internal row structure for book list queries (author columns flattened)
#[derive(Debug, Clone, FromRow)]
pub struct BookSummaryRow {
    id: i32,
    title: String,
    author_id: Option<i32>,
    author_first_name: Option<String>,
    author_last_name: Option<String>,
}

impl From<BookSummaryRow> for BookSummary {
    fn from(row: BookSummaryRow) -> Self {
        let author = match (row.author_id, row.author_first_name, row.author_last_name) {
            (Some(id), Some(first_name), Some(last_name)) => Some(AuthorRef {
                id,
                first_name,
                last_name,
            }),
            _ => None,
        };
        BookSummary {
            id: row.id,
            title: row.title,
            author,
        }
    }
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub author: Option<AuthorRef>,
}

/// Core book columns
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author_id: Option<i32>,
    pub language_id: Option<i32>,
}

/// Copy of a book as shown on the book page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CopySummary {
    pub id: uuid::Uuid,
    pub imprint: String,
    pub status: LoanStatus,
    pub due_back: Option<chrono::NaiveDate>,
}

/// Book with author, genres, language and copies
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author: Option<AuthorRef>,
    pub genres: Vec<Genre>,
    pub language: Option<Language>,
    pub copies: Vec<CopySummary>,
}

/// Create or replace book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    pub author_id: Option<i32>,
    #[validate(length(min = 1, max = 1000, message = "Summary must be 1-1000 characters"))]
    pub summary: String,
    /// 13 character ISBN
    #[validate(length(equal = 13, message = "ISBN must be exactly 13 characters"))]
    pub isbn: String,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    pub language_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(isbn: &str) -> BookInput {
        BookInput {
            title: "A Wizard of Earthsea".to_string(),
            author_id: Some(1),
            summary: "A young mage learns the price of power.".to_string(),
            isbn: isbn.to_string(),
            genre_ids: vec![1],
            language_id: None,
        }
    }

    #[test]
    fn isbn_must_be_thirteen_characters() {
        assert!(input("9780547773742").validate().is_ok());
        assert!(input("054777374").validate().is_err());
    }

    #[test]
    fn summary_row_without_author_has_no_author() {
        let row = BookSummaryRow {
            id: 3,
            title: "Anonymous".to_string(),
            author_id: None,
            author_first_name: None,
            author_last_name: None,
        };
        assert!(BookSummary::from(row).author.is_none());
    }
}
