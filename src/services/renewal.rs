//! Loan renewal workflow

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::BookInstance,
        renewal::{RenewBookForm, RenewalForm},
        user::{Capability, Viewer},
    },
    repository::{BookInstanceStore, CapabilityGrants},
};

use super::access::AccessPolicy;

/// What the librarian asked for
#[derive(Debug, Clone)]
pub enum RenewalRequest {
    /// Show the form with the default proposal
    Display,
    /// Renew to the submitted date
    Submit(RenewBookForm),
}

/// How a renewal request ended
#[derive(Debug, Clone)]
pub enum RenewalOutcome {
    Displayed(RenewalForm),
    /// The due date was updated; carries the record as it now stands
    Renewed(BookInstance),
    /// The submission was refused and nothing was written
    Invalid(RenewalForm),
}

#[derive(Clone)]
pub struct RenewalService {
    store: Arc<dyn BookInstanceStore>,
    access: AccessPolicy,
}

impl RenewalService {
    pub fn new(store: Arc<dyn BookInstanceStore>, grants: Arc<dyn CapabilityGrants>) -> Self {
        Self {
            store,
            access: AccessPolicy::new(grants),
        }
    }

    /// Handle one renewal request for the copy `id`.
    ///
    /// Order: sign-in, `can_mark_returned`, lookup, then display or submit.
    /// Ownership plays no part: any holder of the capability may renew any copy.
    /// The due date is written at most once, and only for a valid submission.
    pub async fn renew(
        &self,
        viewer: &Viewer,
        id: Uuid,
        request: RenewalRequest,
        today: NaiveDate,
    ) -> AppResult<RenewalOutcome> {
        let claims = self.access.require(viewer, Capability::MarkReturned).await?;

        let mut book_instance = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance with id {} not found", id)))?;

        let form = match request {
            RenewalRequest::Display => {
                return Ok(RenewalOutcome::Displayed(RenewalForm::initial(
                    book_instance,
                    today,
                )));
            }
            RenewalRequest::Submit(form) => form,
        };

        match form.clean(today) {
            Ok(renewal_date) => {
                self.store.update_due_back(id, renewal_date).await?;
                tracing::info!(
                    "Book instance {} renewed until {} by {}",
                    id,
                    renewal_date,
                    claims.sub
                );
                book_instance.due_back = Some(renewal_date);
                Ok(RenewalOutcome::Renewed(book_instance))
            }
            Err(error) => {
                tracing::debug!("Renewal of book instance {} refused: {}", id, error);
                Ok(RenewalOutcome::Invalid(RenewalForm::rejected(
                    book_instance,
                    form,
                    &error,
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            book_instance::{Borrower, LoanStatus},
            user::UserClaims,
        },
        repository::{MockBookInstanceStore, MockCapabilityGrants},
    };
    use chrono::Duration;
    use mockall::predicate::eq;
    use serde_json::json;

    const LIBRARIAN_ID: i32 = 2;
    const READER_ID: i32 = 1;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    fn instance_id() -> Uuid {
        Uuid::parse_str("2f1b0d8e-5c7a-4d2e-9a4b-3c6f8e1d2a7b").unwrap()
    }

    fn book_instance(borrower_id: i32) -> BookInstance {
        BookInstance {
            id: instance_id(),
            book_id: 1,
            book_title: "Book Title".to_string(),
            imprint: "Unlikely Imprint, 2016".to_string(),
            due_back: Some(today() + Duration::days(5)),
            status: LoanStatus::OnLoan,
            borrower: Some(Borrower {
                id: borrower_id,
                username: format!("testuser{}", borrower_id),
            }),
        }
    }

    fn viewer(user_id: i32) -> Viewer {
        Viewer::authenticated(
            UserClaims {
                sub: format!("testuser{}", user_id),
                user_id,
                exp: i64::MAX,
                iat: 0,
            },
            format!("/api/v1/book-instances/{}/renew", instance_id()),
        )
    }

    fn grants(librarians: &'static [i32]) -> Arc<MockCapabilityGrants> {
        let mut grants = MockCapabilityGrants::new();
        grants
            .expect_has_capability()
            .returning(move |user_id, _| Ok(librarians.contains(&user_id)));
        Arc::new(grants)
    }

    fn store_with(instance: BookInstance) -> MockBookInstanceStore {
        let mut store = MockBookInstanceStore::new();
        store
            .expect_find()
            .with(eq(instance.id))
            .returning(move |_| Ok(Some(instance.clone())));
        store
    }

    fn submit(date: NaiveDate) -> RenewalRequest {
        RenewalRequest::Submit(RenewBookForm::new(date.to_string()))
    }

    #[tokio::test]
    async fn anonymous_caller_is_sent_to_sign_in_before_any_lookup() {
        let service = RenewalService::new(
            Arc::new(MockBookInstanceStore::new()),
            Arc::new(MockCapabilityGrants::new()),
        );
        let viewer = Viewer::anonymous("/api/v1/book-instances/x/renew");

        let result = service
            .renew(&viewer, instance_id(), RenewalRequest::Display, today())
            .await;

        match result {
            Err(AppError::LoginRequired { next }) => {
                assert_eq!(next, "/api/v1/book-instances/x/renew")
            }
            other => panic!("expected LoginRequired, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn borrower_without_capability_is_denied_even_for_their_own_copy() {
        // The store has no expectations: the request must stop before the lookup
        let service = RenewalService::new(Arc::new(MockBookInstanceStore::new()), grants(&[]));

        let result = service
            .renew(&viewer(READER_ID), instance_id(), submit(today()), today())
            .await;

        assert!(matches!(result, Err(AppError::Authorization(_))));
    }

    #[tokio::test]
    async fn unknown_copy_is_not_found() {
        let mut store = MockBookInstanceStore::new();
        store.expect_find().returning(|_| Ok(None));
        store.expect_update_due_back().never();
        let service = RenewalService::new(Arc::new(store), grants(&[LIBRARIAN_ID]));

        let result = service
            .renew(&viewer(LIBRARIAN_ID), Uuid::new_v4(), RenewalRequest::Display, today())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn display_proposes_three_weeks_from_today_regardless_of_due_date() {
        let mut instance = book_instance(READER_ID);
        instance.due_back = Some(today() + Duration::days(60));
        let mut store = store_with(instance);
        store.expect_update_due_back().never();
        let service = RenewalService::new(Arc::new(store), grants(&[LIBRARIAN_ID]));

        let outcome = service
            .renew(&viewer(LIBRARIAN_ID), instance_id(), RenewalRequest::Display, today())
            .await
            .unwrap();

        match outcome {
            RenewalOutcome::Displayed(form) => {
                assert_eq!(form.renewal_date, Some(json!("2024-05-27")));
                assert!(form.errors.is_empty());
            }
            other => panic!("expected Displayed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn librarian_renews_a_copy_borrowed_by_someone_else() {
        let renewal_date = today() + Duration::weeks(2);
        let mut store = store_with(book_instance(READER_ID));
        store
            .expect_update_due_back()
            .with(eq(instance_id()), eq(renewal_date))
            .times(1)
            .returning(|_, _| Ok(()));
        let service = RenewalService::new(Arc::new(store), grants(&[LIBRARIAN_ID]));

        let outcome = service
            .renew(&viewer(LIBRARIAN_ID), instance_id(), submit(renewal_date), today())
            .await
            .unwrap();

        match outcome {
            RenewalOutcome::Renewed(instance) => {
                assert_eq!(instance.due_back, Some(renewal_date));
                assert!(instance.is_borrowed_by(READER_ID));
                assert_eq!(instance.status, LoanStatus::OnLoan);
            }
            other => panic!("expected Renewed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn boundary_dates_are_written() {
        for renewal_date in [today(), today() + Duration::days(28)] {
            let mut store = store_with(book_instance(READER_ID));
            store
                .expect_update_due_back()
                .with(eq(instance_id()), eq(renewal_date))
                .times(1)
                .returning(|_, _| Ok(()));
            let service = RenewalService::new(Arc::new(store), grants(&[LIBRARIAN_ID]));

            let outcome = service
                .renew(&viewer(LIBRARIAN_ID), instance_id(), submit(renewal_date), today())
                .await
                .unwrap();
            assert!(matches!(outcome, RenewalOutcome::Renewed(_)));
        }
    }

    #[tokio::test]
    async fn past_date_is_refused_without_writing() {
        let mut store = store_with(book_instance(READER_ID));
        store.expect_update_due_back().never();
        let service = RenewalService::new(Arc::new(store), grants(&[LIBRARIAN_ID]));
        let submitted = today() - Duration::weeks(1);

        let outcome = service
            .renew(&viewer(LIBRARIAN_ID), instance_id(), submit(submitted), today())
            .await
            .unwrap();

        match outcome {
            RenewalOutcome::Invalid(form) => {
                assert_eq!(form.renewal_date, Some(json!(submitted.to_string())));
                assert_eq!(
                    form.renewal_date_error(),
                    Some("Invalid date - renewal in past")
                );
                assert_eq!(form.book_instance.due_back, Some(today() + Duration::days(5)));
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn date_beyond_four_weeks_is_refused_without_writing() {
        let mut store = store_with(book_instance(READER_ID));
        store.expect_update_due_back().never();
        let service = RenewalService::new(Arc::new(store), grants(&[LIBRARIAN_ID]));

        let outcome = service
            .renew(
                &viewer(LIBRARIAN_ID),
                instance_id(),
                submit(today() + Duration::days(29)),
                today(),
            )
            .await
            .unwrap();

        match outcome {
            RenewalOutcome::Invalid(form) => assert_eq!(
                form.renewal_date_error(),
                Some("Invalid date - renewal more than 4 weeks ahead")
            ),
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_submission_is_refused_without_writing() {
        let mut store = store_with(book_instance(READER_ID));
        store.expect_update_due_back().never();
        let service = RenewalService::new(Arc::new(store), grants(&[LIBRARIAN_ID]));

        let outcome = service
            .renew(
                &viewer(LIBRARIAN_ID),
                instance_id(),
                RenewalRequest::Submit(RenewBookForm::new("next tuesday")),
                today(),
            )
            .await
            .unwrap();

        match outcome {
            RenewalOutcome::Invalid(form) => {
                assert_eq!(form.renewal_date_error(), Some("Enter a valid date."));
                assert_eq!(form.renewal_date, Some(json!("next tuesday")));
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn copy_deleted_before_the_write_is_not_found() {
        let mut store = store_with(book_instance(READER_ID));
        store
            .expect_update_due_back()
            .returning(|id, _| Err(AppError::NotFound(format!("Book instance with id {} not found", id))));
        let service = RenewalService::new(Arc::new(store), grants(&[LIBRARIAN_ID]));

        let result = service
            .renew(&viewer(LIBRARIAN_ID), instance_id(), submit(today()), today())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
