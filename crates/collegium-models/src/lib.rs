//! # Collegium Models
//!
//! Domain models for the Collegium records core.
//!
//! This crate provides the data structures shared by the domain services and
//! the storage backends: strongly-typed entity ids, string-backed status
//! enums with database codecs, and the entity plus insert/update record types
//! for every domain.
//!
//! # Modules
//!
//! - [`ids`]: Uuid newtype ids, one per entity kind
//! - [`status`]: role and status enums
//! - [`identity`]: accounts and role-holder profiles
//! - [`catalog`]: programs and courses
//! - [`records`]: enrollment, attendance, results, assignments, submissions
//! - [`library`]: books and the lending ledger
//! - [`fees`]: fee entries
//! - [`schedule`]: routine slots

pub mod catalog;
pub mod fees;
pub mod identity;
pub mod ids;
pub mod library;
pub mod records;
pub mod schedule;
pub mod status;

// Re-export commonly used types at crate root for convenience
pub use ids::{
    AccountId, AssignmentId, AttendanceId, BookId, CourseId, EnrollmentId, FacultyId, FeeId,
    LibrarianId, LoanId, ProgramId, ResultId, RoutineId, StudentId, SubmissionId,
};

pub use status::{
    AttendanceStatus, FeeStatus, ResultStatus, Role, RoutineKind, StatusParseError,
};

pub use identity::{
    Account, Faculty, Librarian, NewAccount, NewFaculty, NewLibrarian, NewRoleHolder, NewStudent,
    Profile, ProfileRef, Student, UpdateStudent,
};

pub use catalog::{Course, NewCourse, Program};

pub use records::{
    Assignment, AttendanceRecord, Enrollment, NewAssignment, NewAttendance, NewEnrollment,
    NewResult, NewSubmission, ResultRecord, SubmissionRecord,
};

pub use library::{Book, Loan, NewBook, NewLoan, UpdateBook};

pub use fees::{Fee, NewFee};

pub use schedule::{NewRoutine, Routine};
