//! Repository layer for database operations

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod users;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{BookDetails, BookInput, BookInstance, Capability, PageRequest},
};

/// Loan records touched by the renewal workflow
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookInstanceStore: Send + Sync {
    /// Look up a copy by its identifier
    async fn find(&self, id: Uuid) -> AppResult<Option<BookInstance>>;

    /// Set the due date of an existing copy; `NotFound` if it no longer exists
    async fn update_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()>;
}

/// Capability grants held by users, independent of what they have borrowed
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CapabilityGrants: Send + Sync {
    async fn has_capability(&self, user_id: i32, capability: Capability) -> AppResult<bool>;
}

/// Copies currently on loan, as listed to borrowers and librarians
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanLedger: Send + Sync {
    /// Count copies on loan, optionally restricted to one borrower
    async fn count_on_loan(&self, borrower_id: Option<i32>) -> AppResult<i64>;

    /// One page of copies on loan, optionally restricted to one borrower, soonest due first
    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        page: &PageRequest,
    ) -> AppResult<Vec<BookInstance>>;
}

/// Book records and the references a book may point at
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Book with its author, genres, language and copies; `NotFound` if absent
    async fn find_book(&self, id: i32) -> AppResult<BookDetails>;

    async fn book_exists(&self, id: i32) -> AppResult<bool>;

    async fn author_exists(&self, id: i32) -> AppResult<bool>;

    async fn language_exists(&self, id: i32) -> AppResult<bool>;

    /// How many of the given (distinct) genre ids exist
    async fn count_genres(&self, ids: &[i32]) -> AppResult<i64>;

    /// Whether a book other than `exclude_id` already uses this ISBN
    async fn isbn_taken(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool>;

    async fn has_copies(&self, book_id: i32) -> AppResult<bool>;

    async fn create_book(&self, book: &BookInput) -> AppResult<i32>;

    async fn update_book(&self, id: i32, book: &BookInput) -> AppResult<()>;

    async fn delete_book(&self, id: i32) -> AppResult<()>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub authors: authors::AuthorsRepository,
    pub books: books::BooksRepository,
    pub book_instances: book_instances::BookInstancesRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: authors::AuthorsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            book_instances: book_instances::BookInstancesRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl BookStore for Repository {
    async fn find_book(&self, id: i32) -> AppResult<BookDetails> {
        let row = self.books.get_by_id(id).await?;

        let author = match row.author_id {
            Some(author_id) => self.books.get_author_ref(author_id).await?,
            None => None,
        };
        let language = match row.language_id {
            Some(language_id) => self.books.get_language(language_id).await?,
            None => None,
        };

        Ok(BookDetails {
            id: row.id,
            title: row.title,
            summary: row.summary,
            isbn: row.isbn,
            author,
            genres: self.books.get_genres(id).await?,
            language,
            copies: self.book_instances.list_for_book(id).await?,
        })
    }

    async fn book_exists(&self, id: i32) -> AppResult<bool> {
        self.books.exists(id).await
    }

    async fn author_exists(&self, id: i32) -> AppResult<bool> {
        self.authors.exists(id).await
    }

    async fn language_exists(&self, id: i32) -> AppResult<bool> {
        Ok(self.books.get_language(id).await?.is_some())
    }

    async fn count_genres(&self, ids: &[i32]) -> AppResult<i64> {
        self.books.count_genres(ids).await
    }

    async fn isbn_taken(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        self.books.isbn_exists(isbn, exclude_id).await
    }

    async fn has_copies(&self, book_id: i32) -> AppResult<bool> {
        self.book_instances.book_has_copies(book_id).await
    }

    async fn create_book(&self, book: &BookInput) -> AppResult<i32> {
        self.books.create(book).await
    }

    async fn update_book(&self, id: i32, book: &BookInput) -> AppResult<()> {
        self.books.update(id, book).await
    }

    async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.books.delete(id).await
    }
}
