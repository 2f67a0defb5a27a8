use chrono::Utc;
use tracing::instrument;

use collegium_core::{OperationError, validate};
use collegium_models::{Enrollment, EnrollmentId, NewEnrollment, StudentId};
use collegium_store::{Storage, run_atomic};

use crate::guards::ensure_not_enrolled;

pub struct EnrollmentService;

impl EnrollmentService {
    /// Enrolls a student in a course. At most one enrollment exists per
    /// (student, course); both references are resolved in the same
    /// transaction as the insert.
    #[instrument(skip(storage, enrollment))]
    pub async fn enroll_student(
        storage: &dyn Storage,
        enrollment: NewEnrollment,
    ) -> Result<Enrollment, OperationError> {
        let today = Utc::now().date_naive();
        let enrollment = NewEnrollment {
            student_id: enrollment.student_id,
            course_id: enrollment.course_id,
            enrolled_on: validate::not_in_future("enrolled_on", enrollment.enrolled_on, today)?,
        };

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if !uow.student_exists(enrollment.student_id).await? {
                    return Err(OperationError::not_found("student", enrollment.student_id));
                }
                if !uow.course_exists(enrollment.course_id).await? {
                    return Err(OperationError::not_found("course", enrollment.course_id));
                }
                ensure_not_enrolled(uow, enrollment.student_id, enrollment.course_id).await?;
                Ok(uow.insert_enrollment(enrollment).await?)
            })
        })
        .await
    }

    /// Records the final grade on an enrollment. Key fields stay fixed.
    #[instrument(skip(storage))]
    pub async fn record_enrollment_grade(
        storage: &dyn Storage,
        enrollment_id: EnrollmentId,
        grade: &str,
    ) -> Result<Enrollment, OperationError> {
        let grade = validate::non_empty("grade", grade)?;

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                let Some(enrollment) = uow.find_enrollment(enrollment_id).await? else {
                    return Err(OperationError::not_found("enrollment", enrollment_id));
                };
                if uow.set_enrollment_grade(enrollment_id, &grade).await? == 0 {
                    return Err(OperationError::not_found("enrollment", enrollment_id));
                }
                Ok(Enrollment {
                    grade: Some(grade),
                    ..enrollment
                })
            })
        })
        .await
    }

    /// Removes an enrollment. Attendance and results referencing the pair
    /// are history and stay untouched.
    #[instrument(skip(storage))]
    pub async fn withdraw_enrollment(
        storage: &dyn Storage,
        enrollment_id: EnrollmentId,
    ) -> Result<(), OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if uow.delete_enrollment(enrollment_id).await? == 0 {
                    return Err(OperationError::not_found("enrollment", enrollment_id));
                }
                Ok(())
            })
        })
        .await
    }

    /// A student's enrollments, oldest first.
    #[instrument(skip(storage))]
    pub async fn enrollments_for_student(
        storage: &dyn Storage,
        student_id: StudentId,
    ) -> Result<Vec<Enrollment>, OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if !uow.student_exists(student_id).await? {
                    return Err(OperationError::not_found("student", student_id));
                }
                Ok(uow.enrollments_for_student(student_id).await?)
            })
        })
        .await
    }
}
