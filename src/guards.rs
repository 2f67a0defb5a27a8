//! Uniqueness guards for the one-per-key records and unique columns.
//!
//! Each guard is a single filtered existence read against the repository that
//! owns the key. Callers run the guard inside the same unit of work as the
//! dependent insert, so the check and the write commit or abort together; a
//! duplicate observed here surfaces as [`OperationError::Conflict`] before
//! the write happens.

use chrono::NaiveDate;

use collegium_core::OperationError;
use collegium_models::{AccountId, AssignmentId, BookId, CourseId, ProgramId, StudentId};
use collegium_store::UnitOfWork;

/// Account usernames are globally unique. `excluding` skips the holder's own
/// row when a rename re-checks the key.
pub async fn ensure_username_free(
    uow: &mut dyn UnitOfWork,
    username: &str,
    excluding: Option<AccountId>,
) -> Result<(), OperationError> {
    if uow.username_taken(username, excluding).await? {
        return Err(OperationError::conflict(format!(
            "username '{username}' is already taken"
        )));
    }
    Ok(())
}

pub async fn ensure_program_name_free(
    uow: &mut dyn UnitOfWork,
    name: &str,
    excluding: Option<ProgramId>,
) -> Result<(), OperationError> {
    if uow.program_name_taken(name, excluding).await? {
        return Err(OperationError::conflict(format!(
            "a program named '{name}' already exists"
        )));
    }
    Ok(())
}

/// Course codes are unique within one (program, semester).
pub async fn ensure_course_code_free(
    uow: &mut dyn UnitOfWork,
    program_id: ProgramId,
    semester: i32,
    code: &str,
) -> Result<(), OperationError> {
    if uow.course_code_taken(program_id, semester, code).await? {
        return Err(OperationError::conflict(format!(
            "course code '{code}' already exists in semester {semester} of this program"
        )));
    }
    Ok(())
}

pub async fn ensure_isbn_free(
    uow: &mut dyn UnitOfWork,
    isbn: &str,
    excluding: Option<BookId>,
) -> Result<(), OperationError> {
    if uow.isbn_taken(isbn, excluding).await? {
        return Err(OperationError::conflict(format!(
            "a book with ISBN '{isbn}' already exists"
        )));
    }
    Ok(())
}

/// One attendance record per (student, course, date).
pub async fn ensure_attendance_unmarked(
    uow: &mut dyn UnitOfWork,
    student_id: StudentId,
    course_id: CourseId,
    date: NaiveDate,
) -> Result<(), OperationError> {
    if uow.attendance_exists(student_id, course_id, date).await? {
        return Err(OperationError::conflict(format!(
            "attendance for student {student_id} in course {course_id} on {date} is already marked"
        )));
    }
    Ok(())
}

/// One enrollment per (student, course).
pub async fn ensure_not_enrolled(
    uow: &mut dyn UnitOfWork,
    student_id: StudentId,
    course_id: CourseId,
) -> Result<(), OperationError> {
    if uow.enrollment_exists(student_id, course_id).await? {
        return Err(OperationError::conflict(format!(
            "student {student_id} is already enrolled in course {course_id}"
        )));
    }
    Ok(())
}

/// One result per (student, course, academic year).
pub async fn ensure_result_unrecorded(
    uow: &mut dyn UnitOfWork,
    student_id: StudentId,
    course_id: CourseId,
    academic_year: &str,
) -> Result<(), OperationError> {
    if uow
        .result_exists(student_id, course_id, academic_year)
        .await?
    {
        return Err(OperationError::conflict(format!(
            "a result for student {student_id} in course {course_id} is already recorded for {academic_year}"
        )));
    }
    Ok(())
}

/// One submission per (assignment, student).
pub async fn ensure_not_submitted(
    uow: &mut dyn UnitOfWork,
    assignment_id: AssignmentId,
    student_id: StudentId,
) -> Result<(), OperationError> {
    if uow.submission_exists(assignment_id, student_id).await? {
        return Err(OperationError::conflict(format!(
            "student {student_id} has already submitted assignment {assignment_id}"
        )));
    }
    Ok(())
}
