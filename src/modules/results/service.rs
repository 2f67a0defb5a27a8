use tracing::instrument;

use collegium_core::{OperationError, validate};
use collegium_models::{NewResult, ResultId, ResultRecord, ResultStatus};
use collegium_store::{Storage, run_atomic};

use crate::guards::ensure_result_unrecorded;
use crate::modules::courses::service::SEMESTER_RANGE;

/// Marks are percentages, 0 through 100.
pub const MARKS_RANGE: (i32, i32) = (0, 100);

pub struct ResultService;

impl ResultService {
    /// Records a course result for one academic year. At most one result
    /// exists per (student, course, academic year); references and the guard
    /// are checked in the same transaction as the insert.
    #[instrument(skip(storage, result))]
    pub async fn record_result(
        storage: &dyn Storage,
        result: NewResult,
    ) -> Result<ResultRecord, OperationError> {
        let result = NewResult {
            student_id: result.student_id,
            course_id: result.course_id,
            semester: validate::in_range(
                "semester",
                result.semester,
                SEMESTER_RANGE.0,
                SEMESTER_RANGE.1,
            )?,
            academic_year: validate::non_empty("academic_year", &result.academic_year)?,
            marks: result
                .marks
                .map(|m| validate::in_range("marks", m, MARKS_RANGE.0, MARKS_RANGE.1))
                .transpose()?,
            grade: validate::optional_text(result.grade.as_deref()),
            status: result.status,
        };

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if !uow.student_exists(result.student_id).await? {
                    return Err(OperationError::not_found("student", result.student_id));
                }
                if !uow.course_exists(result.course_id).await? {
                    return Err(OperationError::not_found("course", result.course_id));
                }
                ensure_result_unrecorded(
                    uow,
                    result.student_id,
                    result.course_id,
                    &result.academic_year,
                )
                .await?;
                Ok(uow.insert_result(result).await?)
            })
        })
        .await
    }

    /// Corrects the marks, grade, or standing of a recorded result. The
    /// (student, course, academic year) key stays fixed.
    #[instrument(skip(storage, grade))]
    pub async fn amend_result(
        storage: &dyn Storage,
        result_id: ResultId,
        marks: Option<i32>,
        grade: Option<&str>,
        status: ResultStatus,
    ) -> Result<ResultRecord, OperationError> {
        let marks = marks
            .map(|m| validate::in_range("marks", m, MARKS_RANGE.0, MARKS_RANGE.1))
            .transpose()?;
        let grade = validate::optional_text(grade);

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                let Some(record) = uow.find_result(result_id).await? else {
                    return Err(OperationError::not_found("result", result_id));
                };
                if uow
                    .amend_result(result_id, marks, grade.as_deref(), status)
                    .await?
                    == 0
                {
                    return Err(OperationError::not_found("result", result_id));
                }
                Ok(ResultRecord {
                    marks,
                    grade,
                    status,
                    ..record
                })
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use collegium_models::{CourseId, NewAccount, NewCourse, NewStudent, Role, StudentId};
    use collegium_store::MemoryStorage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seed(storage: &MemoryStorage) -> (StudentId, CourseId) {
        let mut uow = storage.begin().await.unwrap();
        let program = uow.insert_program("Physics BSc").await.unwrap();
        let account = uow
            .insert_account(NewAccount {
                username: "asha.rao@example.edu".to_string(),
                password_hash: "x".to_string(),
                role: Role::Student,
            })
            .await
            .unwrap();
        let student = uow
            .insert_student(
                account.id,
                NewStudent {
                    program_id: program.id,
                    first_name: "Asha".to_string(),
                    last_name: "Rao".to_string(),
                    date_of_birth: date(2004, 5, 17),
                    gender: None,
                    email: "asha.rao@example.edu".to_string(),
                    phone: None,
                    address: None,
                    enrollment_date: date(2022, 8, 1),
                    major: None,
                },
            )
            .await
            .unwrap();
        let course = uow
            .insert_course(NewCourse {
                program_id: program.id,
                semester: 3,
                code: "PHY301".to_string(),
                name: "Quantum Mechanics I".to_string(),
                credits: 4,
                description: None,
                department: None,
            })
            .await
            .unwrap();
        uow.commit().await.unwrap();
        (student.id, course.id)
    }

    fn new_result(student_id: StudentId, course_id: CourseId, year: &str) -> NewResult {
        NewResult {
            student_id,
            course_id,
            semester: 3,
            academic_year: year.to_string(),
            marks: Some(72),
            grade: Some("B+".to_string()),
            status: ResultStatus::Pass,
        }
    }

    #[tokio::test]
    async fn test_one_result_per_student_course_year() {
        let storage = MemoryStorage::new();
        let (student_id, course_id) = seed(&storage).await;

        ResultService::record_result(&storage, new_result(student_id, course_id, "2025-2026"))
            .await
            .unwrap();
        let err =
            ResultService::record_result(&storage, new_result(student_id, course_id, "2025-2026"))
                .await
                .unwrap_err();
        assert!(matches!(err, OperationError::Conflict(_)));

        // the next academic year is a fresh key
        ResultService::record_result(&storage, new_result(student_id, course_id, "2026-2027"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_record_result_validates_ranges_and_refs() {
        let storage = MemoryStorage::new();
        let (student_id, course_id) = seed(&storage).await;

        let mut bad_semester = new_result(student_id, course_id, "2025-2026");
        bad_semester.semester = 0;
        let err = ResultService::record_result(&storage, bad_semester).await.unwrap_err();
        assert!(matches!(err, OperationError::Validation(v) if v.field == "semester"));

        let mut bad_marks = new_result(student_id, course_id, "2025-2026");
        bad_marks.marks = Some(101);
        let err = ResultService::record_result(&storage, bad_marks).await.unwrap_err();
        assert!(matches!(err, OperationError::Validation(v) if v.field == "marks"));

        let err =
            ResultService::record_result(&storage, new_result(StudentId::new(), course_id, "x"))
                .await
                .unwrap_err();
        assert!(matches!(err, OperationError::NotFound { entity: "student", .. }));

        let err =
            ResultService::record_result(&storage, new_result(student_id, CourseId::new(), "x"))
                .await
                .unwrap_err();
        assert!(matches!(err, OperationError::NotFound { entity: "course", .. }));
    }

    #[tokio::test]
    async fn test_amend_result_touches_only_non_key_fields() {
        let storage = MemoryStorage::new();
        let (student_id, course_id) = seed(&storage).await;
        let mut incomplete = new_result(student_id, course_id, "2025-2026");
        incomplete.marks = None;
        incomplete.grade = None;
        incomplete.status = ResultStatus::Incomplete;
        let record = ResultService::record_result(&storage, incomplete).await.unwrap();

        let amended = ResultService::amend_result(
            &storage,
            record.id,
            Some(44),
            Some("D"),
            ResultStatus::Fail,
        )
        .await
        .unwrap();
        assert_eq!(amended.marks, Some(44));
        assert_eq!(amended.grade.as_deref(), Some("D"));
        assert_eq!(amended.status, ResultStatus::Fail);
        assert_eq!(amended.student_id, student_id);
        assert_eq!(amended.academic_year, "2025-2026");

        let err = ResultService::amend_result(&storage, record.id, Some(-1), None, ResultStatus::Fail)
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::Validation(v) if v.field == "marks"));

        let err =
            ResultService::amend_result(&storage, ResultId::new(), None, None, ResultStatus::Pass)
                .await
                .unwrap_err();
        assert!(matches!(err, OperationError::NotFound { .. }));
    }
}
