//! Book instances repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::CopySummary,
        book_instance::{BookInstance, BookInstanceRow, LoanStatus},
        PageRequest,
    },
};

use super::{BookInstanceStore, LoanLedger};

const SELECT_INSTANCES: &str = r#"
    SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint, bi.due_back,
           bi.status, bi.borrower_id, u.username AS borrower_username
    FROM book_instances bi
    JOIN books b ON b.id = bi.book_id
    LEFT JOIN users u ON u.id = bi.borrower_id
"#;

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book instance by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<BookInstance>> {
        let row = sqlx::query_as::<_, BookInstanceRow>(&format!(
            "{} WHERE bi.id = $1",
            SELECT_INSTANCES
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(BookInstance::try_from).transpose()
    }

    /// Copies of one book
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<CopySummary>> {
        let rows = sqlx::query_as::<_, BookInstanceRow>(&format!(
            "{} WHERE bi.book_id = $1 ORDER BY bi.imprint, bi.id",
            SELECT_INSTANCES
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        rows
            .into_iter()
            .map(|row| {
                let instance = BookInstance::try_from(row)?;
                Ok(CopySummary {
                    id: instance.id,
                    imprint: instance.imprint,
                    status: instance.status,
                    due_back: instance.due_back,
                })
            })
            .collect()
    }

    /// Count all copies
    pub async fn count_all(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count copies with the given status
    pub async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
            .bind(status.code())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Whether a book still has copies
    pub async fn book_has_copies(&self, book_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM book_instances WHERE book_id = $1)",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

#[async_trait]
impl BookInstanceStore for BookInstancesRepository {
    async fn find(&self, id: Uuid) -> AppResult<Option<BookInstance>> {
        self.get_by_id(id).await
    }

    async fn update_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()> {
        let result = sqlx::query("UPDATE book_instances SET due_back = $1 WHERE id = $2")
            .bind(due_back)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Book instance with id {} not found",
                id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl LoanLedger for BookInstancesRepository {
    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        page: &PageRequest,
    ) -> AppResult<Vec<BookInstance>> {
        let rows = sqlx::query_as::<_, BookInstanceRow>(&format!(
            r#"{}
            WHERE bi.status = $1 AND ($2::int IS NULL OR bi.borrower_id = $2)
            ORDER BY bi.due_back, bi.id
            LIMIT $3 OFFSET $4
            "#,
            SELECT_INSTANCES
        ))
        .bind(LoanStatus::OnLoan.code())
        .bind(borrower_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BookInstance::try_from).collect()
    }

    async fn count_on_loan(&self, borrower_id: Option<i32>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_instances WHERE status = $1 AND ($2::int IS NULL OR borrower_id = $2)",
        )
        .bind(LoanStatus::OnLoan.code())
        .bind(borrower_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
