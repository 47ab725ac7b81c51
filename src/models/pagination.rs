//! Page selection for list endpoints

use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{AppError, AppResult};

/// `?page=` query parameter
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, starting at 1
    pub page: Option<i64>,
}

/// A validated page of a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(query: &PageQuery, per_page: i64) -> AppResult<Self> {
        let page = query.page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::NotFound(format!("Invalid page ({})", page)));
        }
        Ok(Self {
            page,
            per_page: per_page.max(1),
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// Number of pages for `total` entries; an empty list still has one page
    pub fn num_pages(&self, total: i64) -> i64 {
        ((total + self.per_page - 1) / self.per_page).max(1)
    }

    /// Refuse pages past the end of the list
    pub fn ensure_exists(&self, total: i64) -> AppResult<()> {
        if self.page > self.num_pages(total) {
            return Err(AppError::NotFound(format!(
                "Invalid page ({}): that page contains no results",
                self.page
            )));
        }
        Ok(())
    }
}

/// One page of a list together with the list's total size
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub request: PageRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(page: Option<i64>) -> AppResult<PageRequest> {
        PageRequest::new(&PageQuery { page }, 10)
    }

    #[test]
    fn first_page_is_the_default() {
        let page = request(None).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn second_page_of_thirteen_holds_the_remaining_three() {
        let page = request(Some(2)).unwrap();
        assert_eq!(page.offset(), 10);
        assert_eq!(page.num_pages(13), 2);
        assert!(page.ensure_exists(13).is_ok());
        assert_eq!(13 - page.offset(), 3);
    }

    #[test]
    fn pages_outside_the_list_are_not_found() {
        assert!(matches!(request(Some(0)), Err(AppError::NotFound(_))));
        assert!(matches!(
            request(Some(3)).unwrap().ensure_exists(13),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn empty_list_has_a_first_page() {
        let page = request(Some(1)).unwrap();
        assert_eq!(page.num_pages(0), 1);
        assert!(page.ensure_exists(0).is_ok());
    }
}
