//! Re-exports of the account and profile types this module operates on.

pub use collegium_models::{
    Account, AccountId, Faculty, FacultyId, Librarian, LibrarianId, NewFaculty, NewLibrarian,
    NewRoleHolder, NewStudent, Profile, ProfileRef, Role, Student, StudentId, UpdateStudent,
};
