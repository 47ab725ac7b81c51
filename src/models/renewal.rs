//! Loan renewal rules and the renewal form

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

use super::book_instance::BookInstance;

/// Weeks ahead of today offered as the default renewal date
pub const DEFAULT_RENEWAL_WEEKS: i64 = 3;
/// Furthest a loan may be renewed, in weeks from today
pub const MAX_RENEWAL_WEEKS: i64 = 4;

/// Name of the single field on the renewal form
pub const RENEWAL_DATE_FIELD: &str = "renewal_date";

/// Why a proposed renewal date was refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalRejection {
    #[error("Invalid date - renewal in past")]
    InPast,
    #[error("Invalid date - renewal more than 4 weeks ahead")]
    TooFarAhead,
}

/// Date pre-filled on the renewal form
pub fn proposed_renewal_date(today: NaiveDate) -> NaiveDate {
    today + Duration::weeks(DEFAULT_RENEWAL_WEEKS)
}

/// Accept `proposed` when `today <= proposed <= today + 4 weeks`.
pub fn validate_renewal_date(
    proposed: NaiveDate,
    today: NaiveDate,
) -> Result<NaiveDate, RenewalRejection> {
    if proposed < today {
        return Err(RenewalRejection::InPast);
    }
    if proposed > today + Duration::weeks(MAX_RENEWAL_WEEKS) {
        return Err(RenewalRejection::TooFarAhead);
    }
    Ok(proposed)
}

/// Error attached to the renewal date field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenewalFieldError {
    #[error("This field is required.")]
    Missing,
    #[error("Enter a valid date.")]
    Malformed,
    #[error(transparent)]
    Rejected(#[from] RenewalRejection),
}

/// Renewal form as submitted by a librarian.
///
/// The date is kept as raw JSON so that a value of the wrong type can be
/// reported against the field and shown back as it was sent.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RenewBookForm {
    /// Proposed due date (YYYY-MM-DD)
    #[schema(value_type = Option<String>, example = "2024-03-12")]
    pub renewal_date: Option<Value>,
}

impl RenewBookForm {
    #[cfg(test)]
    pub fn new(renewal_date: impl Into<String>) -> Self {
        Self {
            renewal_date: Some(Value::String(renewal_date.into())),
        }
    }

    /// Bind the raw input and run the renewal rules against it
    pub fn clean(&self, today: NaiveDate) -> Result<NaiveDate, RenewalFieldError> {
        let raw = match &self.renewal_date {
            None | Some(Value::Null) => return Err(RenewalFieldError::Missing),
            Some(Value::String(raw)) => raw.trim(),
            Some(_) => return Err(RenewalFieldError::Malformed),
        };
        if raw.is_empty() {
            return Err(RenewalFieldError::Missing);
        }

        let proposed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| RenewalFieldError::Malformed)?;

        Ok(validate_renewal_date(proposed, today)?)
    }
}

/// Renewal form as presented back to the librarian
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalForm {
    pub book_instance: BookInstance,
    /// Value shown in the date field: the proposal, or the input as submitted
    #[schema(value_type = Option<String>, example = "2024-03-12")]
    pub renewal_date: Option<Value>,
    /// Field name to error messages; empty when the form is clean
    pub errors: BTreeMap<String, Vec<String>>,
}

impl RenewalForm {
    /// Unbound form pre-filled with the default proposal
    pub fn initial(book_instance: BookInstance, today: NaiveDate) -> Self {
        Self {
            book_instance,
            renewal_date: Some(Value::String(proposed_renewal_date(today).to_string())),
            errors: BTreeMap::new(),
        }
    }

    /// Submitted form re-presented with the error on its date field
    pub fn rejected(
        book_instance: BookInstance,
        submitted: RenewBookForm,
        error: &RenewalFieldError,
    ) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(RENEWAL_DATE_FIELD.to_string(), vec![error.to_string()]);
        Self {
            book_instance,
            renewal_date: submitted.renewal_date,
            errors,
        }
    }

    /// First error on the date field, if any
    #[cfg(test)]
    pub fn renewal_date_error(&self) -> Option<&str> {
        self.errors
            .get(RENEWAL_DATE_FIELD)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 20).unwrap()
    }

    #[test]
    fn today_is_accepted() {
        assert_eq!(validate_renewal_date(today(), today()), Ok(today()));
    }

    #[test]
    fn yesterday_is_in_the_past() {
        let yesterday = today() - Duration::days(1);
        assert_eq!(
            validate_renewal_date(yesterday, today()),
            Err(RenewalRejection::InPast)
        );
    }

    #[test]
    fn exactly_four_weeks_ahead_is_accepted() {
        let limit = today() + Duration::days(28);
        assert_eq!(validate_renewal_date(limit, today()), Ok(limit));
    }

    #[test]
    fn one_day_past_four_weeks_is_too_far() {
        let beyond = today() + Duration::days(29);
        assert_eq!(
            validate_renewal_date(beyond, today()),
            Err(RenewalRejection::TooFarAhead)
        );
    }

    #[test]
    fn accepts_exactly_the_four_week_window() {
        for offset in -40..=40 {
            let proposed = today() + Duration::days(offset);
            let accepted = validate_renewal_date(proposed, today()).is_ok();
            assert_eq!(accepted, (0..=28).contains(&offset), "offset {offset}");
        }
    }

    #[test]
    fn window_spans_a_leap_day() {
        // 2024-02-20 + 28 days crosses 2024-02-29
        assert_eq!(
            validate_renewal_date(NaiveDate::from_ymd_opt(2024, 3, 19).unwrap(), today()),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 19).unwrap())
        );
        assert_eq!(
            validate_renewal_date(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(), today()),
            Err(RenewalRejection::TooFarAhead)
        );
    }

    #[test]
    fn default_proposal_is_three_weeks_out() {
        assert_eq!(
            proposed_renewal_date(today()),
            NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()
        );
    }

    #[test]
    fn rejection_messages_match_the_form_errors() {
        assert_eq!(
            RenewalRejection::InPast.to_string(),
            "Invalid date - renewal in past"
        );
        assert_eq!(
            RenewalRejection::TooFarAhead.to_string(),
            "Invalid date - renewal more than 4 weeks ahead"
        );
        assert_eq!(
            RenewalFieldError::from(RenewalRejection::InPast).to_string(),
            "Invalid date - renewal in past"
        );
    }

    #[test]
    fn form_requires_a_value() {
        assert_eq!(
            RenewBookForm::default().clean(today()),
            Err(RenewalFieldError::Missing)
        );
        assert_eq!(
            RenewBookForm::new("  ").clean(today()),
            Err(RenewalFieldError::Missing)
        );
        let null = RenewBookForm {
            renewal_date: Some(Value::Null),
        };
        assert_eq!(null.clean(today()), Err(RenewalFieldError::Missing));
    }

    #[test]
    fn form_rejects_unparseable_dates() {
        assert_eq!(
            RenewBookForm::new("20/02/2024").clean(today()),
            Err(RenewalFieldError::Malformed)
        );
    }

    #[test]
    fn form_rejects_dates_of_the_wrong_type() {
        let form: RenewBookForm =
            serde_json::from_str(r#"{"renewal_date": 20240301}"#).unwrap();
        assert_eq!(form.clean(today()), Err(RenewalFieldError::Malformed));
        assert_eq!(form.renewal_date, Some(serde_json::json!(20240301)));
    }

    #[test]
    fn form_runs_the_renewal_rules() {
        assert_eq!(
            RenewBookForm::new("2024-03-05").clean(today()),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        );

        assert_eq!(
            RenewBookForm::new("2024-02-13").clean(today()),
            Err(RenewalFieldError::Rejected(RenewalRejection::InPast))
        );
    }
}
