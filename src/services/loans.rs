//! Loan listings for borrowers and librarians

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::{
        book_instance::LoanEntry,
        user::{Capability, Viewer},
        Page, PageQuery, PageRequest,
    },
    repository::LoanLedger,
};

use super::access::AccessPolicy;

#[derive(Clone)]
pub struct LoansService {
    ledger: Arc<dyn LoanLedger>,
    access: AccessPolicy,
    page_size: i64,
}

impl LoansService {
    pub fn new(ledger: Arc<dyn LoanLedger>, access: AccessPolicy, page_size: i64) -> Self {
        Self {
            ledger,
            access,
            page_size,
        }
    }

    /// Copies on loan to the signed-in user, soonest due first
    pub async fn my_loans(
        &self,
        viewer: &Viewer,
        query: &PageQuery,
        today: NaiveDate,
    ) -> AppResult<Page<LoanEntry>> {
        let claims = viewer.require_authenticated()?;
        self.on_loan(Some(claims.user_id), query, today).await
    }

    /// Every copy on loan, for librarians
    pub async fn all_loans(
        &self,
        viewer: &Viewer,
        query: &PageQuery,
        today: NaiveDate,
    ) -> AppResult<Page<LoanEntry>> {
        self.access.require(viewer, Capability::MarkReturned).await?;
        self.on_loan(None, query, today).await
    }

    async fn on_loan(
        &self,
        borrower_id: Option<i32>,
        query: &PageQuery,
        today: NaiveDate,
    ) -> AppResult<Page<LoanEntry>> {
        let request = PageRequest::new(query, self.page_size)?;
        let total = self.ledger.count_on_loan(borrower_id).await?;
        request.ensure_exists(total)?;

        let items = self
            .ledger
            .list_on_loan(borrower_id, &request)
            .await?
            .into_iter()
            .map(|book_instance| LoanEntry::new(book_instance, today))
            .collect();

        Ok(Page {
            items,
            total,
            request,
        })
    }
}
