//! Re-exports of the catalog and lending types this module operates on.

pub use collegium_models::{Book, BookId, Loan, LoanId, NewBook, NewLoan, UpdateBook};
