//! Academic record models: enrollment, attendance, results, assignments,
//! and submissions.
//!
//! Each of the one-per-key records here (enrollment, attendance, result,
//! submission) has its key fields fixed at creation; amendments touch only
//! the non-key fields.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::ids::{
    AssignmentId, AttendanceId, CourseId, EnrollmentId, FacultyId, ResultId, StudentId,
    SubmissionId,
};
use crate::status::{AttendanceStatus, ResultStatus};

/// A student's enrollment in a course. One per (student, course).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub enrolled_on: NaiveDate,
    pub grade: Option<String>,
}

/// Insert record for an enrollment.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEnrollment {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub enrolled_on: NaiveDate,
}

/// One student's attendance outcome for one course day.
/// One per (student, course, date).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub taken_by: Option<FacultyId>,
}

/// Insert record for an attendance outcome.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAttendance {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub taken_by: Option<FacultyId>,
}

/// A graded course outcome for one academic year.
/// One per (student, course, academic_year).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct ResultRecord {
    pub id: ResultId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub semester: i32,
    pub academic_year: String,
    pub marks: Option<i32>,
    pub grade: Option<String>,
    pub status: ResultStatus,
}

/// Insert record for a course result.
#[derive(Debug, Clone, Deserialize)]
pub struct NewResult {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub semester: i32,
    pub academic_year: String,
    pub marks: Option<i32>,
    pub grade: Option<String>,
    pub status: ResultStatus,
}

/// A piece of coursework set by a faculty member.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Assignment {
    pub id: AssignmentId,
    pub course_id: CourseId,
    pub faculty_id: FacultyId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub max_marks: i32,
    pub created_at: DateTime<Utc>,
}

/// Insert record for an assignment.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAssignment {
    pub course_id: CourseId,
    pub faculty_id: FacultyId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub max_marks: i32,
}

/// A student's submission against an assignment.
/// One per (assignment, student); marks never exceed the assignment's
/// max_marks.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub assignment_id: AssignmentId,
    pub student_id: StudentId,
    pub submitted_at: DateTime<Utc>,
    pub file_path: String,
    pub marks: Option<i32>,
    pub feedback: Option<String>,
}

/// Insert record for a submission; `submitted_at` is stamped by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubmission {
    pub assignment_id: AssignmentId,
    pub student_id: StudentId,
    pub file_path: String,
}
