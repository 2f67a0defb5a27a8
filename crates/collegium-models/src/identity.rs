//! Account and role-holder profile models.
//!
//! A login account carries the credential and the role tag; students,
//! faculty, and librarians each own exactly one profile row pointing back at
//! their account. The two records are created and deleted together.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::ids::{AccountId, FacultyId, LibrarianId, ProgramId, StudentId};
use crate::status::Role;

/// A login account.
///
/// The password hash is opaque to this crate; it is produced and verified by
/// the credential hasher collaborator and never serialized outward.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Insert record for an account row.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// A student profile paired with a `Role::Student` account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Student {
    pub id: StudentId,
    pub account_id: AccountId,
    pub program_id: ProgramId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub enrollment_date: NaiveDate,
    pub major: Option<String>,
}

/// Profile fields for creating a student.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    pub program_id: ProgramId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub enrollment_date: NaiveDate,
    pub major: Option<String>,
}

/// Non-key student fields; only provided fields are updated.
///
/// A changed email also renames the linked account, since the email doubles
/// as the login username.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStudent {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub major: Option<String>,
}

/// A faculty profile paired with a `Role::Faculty` account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Faculty {
    pub id: FacultyId,
    pub account_id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
}

/// Profile fields for creating a faculty member.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFaculty {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
}

/// A librarian profile paired with a `Role::Librarian` account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Librarian {
    pub id: LibrarianId,
    pub account_id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Profile fields for creating a librarian.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLibrarian {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Profile payload for creating an account-plus-profile pair.
#[derive(Debug, Clone, Deserialize)]
pub enum NewRoleHolder {
    Student(NewStudent),
    Faculty(NewFaculty),
    Librarian(NewLibrarian),
}

impl NewRoleHolder {
    /// Role tag the paired account will carry.
    pub fn role(&self) -> Role {
        match self {
            Self::Student(_) => Role::Student,
            Self::Faculty(_) => Role::Faculty,
            Self::Librarian(_) => Role::Librarian,
        }
    }

    /// Email address, which doubles as the account username.
    pub fn email(&self) -> &str {
        match self {
            Self::Student(p) => &p.email,
            Self::Faculty(p) => &p.email,
            Self::Librarian(p) => &p.email,
        }
    }
}

/// A stored profile of any kind, returned by profile-creating operations.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum Profile {
    Student(Student),
    Faculty(Faculty),
    Librarian(Librarian),
}

impl Profile {
    pub fn role(&self) -> Role {
        match self {
            Self::Student(_) => Role::Student,
            Self::Faculty(_) => Role::Faculty,
            Self::Librarian(_) => Role::Librarian,
        }
    }

    pub fn account_id(&self) -> AccountId {
        match self {
            Self::Student(p) => p.account_id,
            Self::Faculty(p) => p.account_id,
            Self::Librarian(p) => p.account_id,
        }
    }
}

/// Reference to a profile of a known kind, used by deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ProfileRef {
    Student(StudentId),
    Faculty(FacultyId),
    Librarian(LibrarianId),
}
