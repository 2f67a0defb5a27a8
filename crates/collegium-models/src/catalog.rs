//! Program and course catalog models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::ids::{CourseId, ProgramId};

/// A degree program. Names are unique across the institution.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
}

/// A course offered within a program's semester.
///
/// The course code is unique within its (program, semester) pair; the same
/// code may recur in other programs or semesters.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub program_id: ProgramId,
    pub semester: i32,
    pub code: String,
    pub name: String,
    pub credits: i32,
    pub description: Option<String>,
    pub department: Option<String>,
}

/// Insert record for a course.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
    pub program_id: ProgramId,
    pub semester: i32,
    pub code: String,
    pub name: String,
    pub credits: i32,
    pub description: Option<String>,
    pub department: Option<String>,
}
