//! Book instance (loanable copy) model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

/// Loan status of a copy (single-character codes in the database)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    pub fn code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            _ => Err(format!("Invalid loan status code: {}", s)),
        }
    }
}

/// Internal row structure for book instance queries (status as its code)
#[derive(Debug, Clone, FromRow)]
pub struct BookInstanceRow {
    id: Uuid,
    book_id: i32,
    book_title: String,
    imprint: String,
    due_back: Option<NaiveDate>,
    status: String,
    borrower_id: Option<i32>,
    borrower_username: Option<String>,
}

impl TryFrom<BookInstanceRow> for BookInstance {
    type Error = AppError;

    fn try_from(row: BookInstanceRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|e| {
            tracing::error!("Book instance {} has an unreadable status: {}", row.id, e);
            AppError::Internal(e)
        })?;

        Ok(BookInstance {
            id: row.id,
            book_id: row.book_id,
            book_title: row.book_title,
            imprint: row.imprint,
            due_back: row.due_back,
            status,
            borrower: row
                .borrower_id
                .zip(row.borrower_username)
                .map(|(id, username)| Borrower { id, username }),
        })
    }
}

/// User holding a copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Borrower {
    pub id: i32,
    pub username: String,
}

/// A single loanable copy of a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: i32,
    pub book_title: String,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower: Option<Borrower>,
}

impl BookInstance {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_back.map(|due| due < today).unwrap_or(false)
    }

    #[cfg(test)]
    pub fn is_borrowed_by(&self, user_id: i32) -> bool {
        self.borrower.as_ref().map(|b| b.id == user_id).unwrap_or(false)
    }
}

/// Loan list entry
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanEntry {
    #[serde(flatten)]
    pub book_instance: BookInstance,
    pub is_overdue: bool,
}

impl LoanEntry {
    pub fn new(book_instance: BookInstance, today: NaiveDate) -> Self {
        let is_overdue = book_instance.is_overdue(today);
        Self {
            book_instance,
            is_overdue,
        }
    }
}
