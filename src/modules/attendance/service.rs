use chrono::Utc;
use tracing::instrument;

use collegium_core::{OperationError, validate};
use collegium_models::{
    AttendanceId, AttendanceRecord, AttendanceStatus, FacultyId, NewAttendance, StudentId,
};
use collegium_store::{Storage, run_atomic};

use crate::guards::ensure_attendance_unmarked;

pub struct AttendanceService;

impl AttendanceService {
    /// Marks one student's attendance for one course day. At most one record
    /// exists per (student, course, date); the guard and every reference
    /// check run in the same transaction as the insert.
    #[instrument(skip(storage, record))]
    pub async fn mark_attendance(
        storage: &dyn Storage,
        record: NewAttendance,
    ) -> Result<AttendanceRecord, OperationError> {
        let today = Utc::now().date_naive();
        let record = NewAttendance {
            student_id: record.student_id,
            course_id: record.course_id,
            date: validate::not_in_future("date", record.date, today)?,
            status: record.status,
            taken_by: record.taken_by,
        };

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if !uow.student_exists(record.student_id).await? {
                    return Err(OperationError::not_found("student", record.student_id));
                }
                if !uow.course_exists(record.course_id).await? {
                    return Err(OperationError::not_found("course", record.course_id));
                }
                if let Some(faculty_id) = record.taken_by {
                    if !uow.faculty_exists(faculty_id).await? {
                        return Err(OperationError::not_found("faculty", faculty_id));
                    }
                }
                ensure_attendance_unmarked(
                    uow,
                    record.student_id,
                    record.course_id,
                    record.date,
                )
                .await?;
                Ok(uow.insert_attendance(record).await?)
            })
        })
        .await
    }

    /// Corrects the status (and recording faculty) of an existing mark. The
    /// (student, course, date) key stays fixed.
    #[instrument(skip(storage))]
    pub async fn amend_attendance(
        storage: &dyn Storage,
        attendance_id: AttendanceId,
        status: AttendanceStatus,
        taken_by: Option<FacultyId>,
    ) -> Result<AttendanceRecord, OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                let Some(record) = uow.find_attendance(attendance_id).await? else {
                    return Err(OperationError::not_found("attendance", attendance_id));
                };
                if let Some(faculty_id) = taken_by {
                    if !uow.faculty_exists(faculty_id).await? {
                        return Err(OperationError::not_found("faculty", faculty_id));
                    }
                }
                if uow.amend_attendance(attendance_id, status, taken_by).await? == 0 {
                    return Err(OperationError::not_found("attendance", attendance_id));
                }
                Ok(AttendanceRecord {
                    status,
                    taken_by,
                    ..record
                })
            })
        })
        .await
    }

    /// A student's attendance records, oldest first.
    #[instrument(skip(storage))]
    pub async fn attendance_for_student(
        storage: &dyn Storage,
        student_id: StudentId,
    ) -> Result<Vec<AttendanceRecord>, OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if !uow.student_exists(student_id).await? {
                    return Err(OperationError::not_found("student", student_id));
                }
                Ok(uow.attendance_for_student(student_id).await?)
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use collegium_models::{
        CourseId, NewAccount, NewCourse, NewFaculty, NewStudent, Role, StudentId,
    };
    use collegium_store::MemoryStorage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seed(storage: &MemoryStorage) -> (StudentId, CourseId, FacultyId) {
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
        let faculty_account = uow
            .insert_account(NewAccount {
                username: "derek.olsen@example.edu".to_string(),
                password_hash: "x".to_string(),
                role: Role::Faculty,
            })
            .await
            .unwrap();
        let faculty = uow
            .insert_faculty(
                faculty_account.id,
                NewFaculty {
                    first_name: "Derek".to_string(),
                    last_name: "Olsen".to_string(),
                    email: "derek.olsen@example.edu".to_string(),
                    phone: None,
                    department: "Physics".to_string(),
                },
            )
            .await
            .unwrap();
        uow.commit().await.unwrap();
        (student.id, course.id, faculty.id)
    }

    fn mark(student_id: StudentId, course_id: CourseId, d: NaiveDate) -> NewAttendance {
        NewAttendance {
            student_id,
            course_id,
            date: d,
            status: AttendanceStatus::Present,
            taken_by: None,
        }
    }

    #[tokio::test]
    async fn test_one_mark_per_student_course_day() {
        let storage = MemoryStorage::new();
        let (student_id, course_id, _) = seed(&storage).await;
        let day = date(2026, 1, 10);

        AttendanceService::mark_attendance(&storage, mark(student_id, course_id, day))
            .await
            .unwrap();
        let err = AttendanceService::mark_attendance(&storage, mark(student_id, course_id, day))
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::Conflict(_)));

        let records = AttendanceService::attendance_for_student(&storage, student_id)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);

        // another day is a fresh key
        AttendanceService::mark_attendance(&storage, mark(student_id, course_id, date(2026, 1, 11)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_mark_checks_all_references() {
        let storage = MemoryStorage::new();
        let (student_id, course_id, _) = seed(&storage).await;
        let day = date(2026, 1, 10);

        let err =
            AttendanceService::mark_attendance(&storage, mark(StudentId::new(), course_id, day))
                .await
                .unwrap_err();
        assert!(matches!(err, OperationError::NotFound { entity: "student", .. }));

        let err =
            AttendanceService::mark_attendance(&storage, mark(student_id, CourseId::new(), day))
                .await
                .unwrap_err();
        assert!(matches!(err, OperationError::NotFound { entity: "course", .. }));

        let mut with_unknown_faculty = mark(student_id, course_id, day);
        with_unknown_faculty.taken_by = Some(FacultyId::new());
        let err = AttendanceService::mark_attendance(&storage, with_unknown_faculty)
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::NotFound { entity: "faculty", .. }));

        // none of the failures left a record behind
        let records = AttendanceService::attendance_for_student(&storage, student_id)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_mark_rejects_future_date() {
        let storage = MemoryStorage::new();
        let (student_id, course_id, _) = seed(&storage).await;
        let future = Utc::now().date_naive() + chrono::Days::new(1);

        let err = AttendanceService::mark_attendance(&storage, mark(student_id, course_id, future))
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::Validation(v) if v.field == "date"));
    }

    #[tokio::test]
    async fn test_amend_changes_status_and_keeps_key() {
        let storage = MemoryStorage::new();
        let (student_id, course_id, faculty_id) = seed(&storage).await;
        let day = date(2026, 1, 10);
        let record =
            AttendanceService::mark_attendance(&storage, mark(student_id, course_id, day))
                .await
                .unwrap();

        let amended = AttendanceService::amend_attendance(
            &storage,
            record.id,
            AttendanceStatus::Excused,
            Some(faculty_id),
        )
        .await
        .unwrap();
        assert_eq!(amended.status, AttendanceStatus::Excused);
        assert_eq!(amended.taken_by, Some(faculty_id));
        assert_eq!(amended.student_id, student_id);
        assert_eq!(amended.date, day);

        let err = AttendanceService::amend_attendance(
            &storage,
            AttendanceId::new(),
            AttendanceStatus::Late,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, OperationError::NotFound { .. }));

        let err = AttendanceService::amend_attendance(
            &storage,
            record.id,
            AttendanceStatus::Late,
            Some(FacultyId::new()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, OperationError::NotFound { entity: "faculty", .. }));
    }
}
