//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod catalog;
pub mod pagination;
pub mod renewal;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorDetails, AuthorInput};
pub use book::{BookDetails, BookInput, BookSummary, Genre, Language};
pub use book_instance::{BookInstance, LoanEntry, LoanStatus};
pub use catalog::CatalogSummary;
pub use pagination::{Page, PageQuery, PageRequest};
pub use renewal::{RenewBookForm, RenewalForm, RenewalRejection};
pub use user::{Capability, LoginRequest, LoginResponse, User, UserClaims, UserInfo, Viewer};
