//! Storage backends and the transactional seam they share.
//!
//! Every mutating operation in the system runs through [`run_atomic`]: it
//! opens one [`UnitOfWork`] on a [`Storage`] backend, hands it to the
//! operation closure, and commits or rolls back depending on the outcome.
//! Two backends implement the seam: [`PgStorage`] over a PostgreSQL pool and
//! [`MemoryStorage`] for tests and tooling.

pub mod coordinator;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use coordinator::run_atomic;
pub use memory::MemoryStorage;
pub use postgres::{PgStorage, run_migrations};
pub use traits::{
    AccountStore, AssignmentStore, AttendanceStore, BookStore, CourseStore, EnrollmentStore,
    FacultyStore, FeeStore, LibrarianStore, LoanStore, ProgramStore, ResultStore, RoutineStore,
    Storage, StudentStore, SubmissionStore, UnitOfWork,
};
