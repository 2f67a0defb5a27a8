use tracing::instrument;

use collegium_core::{OperationError, validate};
use collegium_models::{Course, CourseId, NewCourse, ProgramId};
use collegium_store::{Storage, run_atomic};

use crate::guards::ensure_course_code_free;

/// Semesters run 1 through 8.
pub const SEMESTER_RANGE: (i32, i32) = (1, 8);

pub struct CourseService;

impl CourseService {
    /// Creates a course under a program. The code must be unique within the
    /// (program, semester) pair, checked in the same transaction as the
    /// insert.
    #[instrument(skip(storage, course))]
    pub async fn create_course(
        storage: &dyn Storage,
        course: NewCourse,
    ) -> Result<Course, OperationError> {
        let course = NewCourse {
            program_id: course.program_id,
            semester: validate::in_range(
                "semester",
                course.semester,
                SEMESTER_RANGE.0,
                SEMESTER_RANGE.1,
            )?,
            code: validate::non_empty("code", &course.code)?,
            name: validate::non_empty("name", &course.name)?,
            credits: validate::positive_i32("credits", course.credits)?,
            description: validate::optional_text(course.description.as_deref()),
            department: validate::optional_text(course.department.as_deref()),
        };

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if !uow.program_exists(course.program_id).await? {
                    return Err(OperationError::not_found("program", course.program_id));
                }
                ensure_course_code_free(uow, course.program_id, course.semester, &course.code)
                    .await?;
                Ok(uow.insert_course(course).await?)
            })
        })
        .await
    }

    #[instrument(skip(storage))]
    pub async fn get_course(
        storage: &dyn Storage,
        course_id: CourseId,
    ) -> Result<Course, OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                uow.find_course(course_id)
                    .await?
                    .ok_or_else(|| OperationError::not_found("course", course_id))
            })
        })
        .await
    }

    /// Courses of one program semester, ordered by code.
    #[instrument(skip(storage))]
    pub async fn courses_for_program_semester(
        storage: &dyn Storage,
        program_id: ProgramId,
        semester: i32,
    ) -> Result<Vec<Course>, OperationError> {
        let semester =
            validate::in_range("semester", semester, SEMESTER_RANGE.0, SEMESTER_RANGE.1)?;

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if !uow.program_exists(program_id).await? {
                    return Err(OperationError::not_found("program", program_id));
                }
                Ok(uow.courses_for_program_semester(program_id, semester).await?)
            })
        })
        .await
    }
}
