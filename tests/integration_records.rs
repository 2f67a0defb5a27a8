mod common;

use chrono::Utc;

use collegium::modules::{
    AssignmentService, AttendanceService, EnrollmentService, ResultService,
};
use collegium_core::OperationError;
use collegium_models::{
    AttendanceStatus, NewAssignment, NewAttendance, NewEnrollment, NewResult, NewSubmission,
    ResultStatus,
};
use collegium_store::MemoryStorage;
use common::{create_course, create_faculty, create_program, create_student, date};

#[tokio::test]
async fn test_one_semester_of_records_for_one_student() {
    let storage = MemoryStorage::new();
    let program = create_program(&storage).await;
    let course = create_course(&storage, &program).await;
    let student = create_student(&storage, &program).await;
    let faculty = create_faculty(&storage).await;

    EnrollmentService::enroll_student(
        &storage,
        NewEnrollment {
            student_id: student.id,
            course_id: course.id,
            enrolled_on: date(2026, 1, 12),
        },
    )
    .await
    .unwrap();

    AttendanceService::mark_attendance(
        &storage,
        NewAttendance {
            student_id: student.id,
            course_id: course.id,
            date: date(2026, 2, 2),
            status: AttendanceStatus::Present,
            taken_by: Some(faculty.id),
        },
    )
    .await
    .unwrap();

    let assignment = AssignmentService::create_assignment(
        &storage,
        NewAssignment {
            course_id: course.id,
            faculty_id: faculty.id,
            title: "Midterm essay".to_string(),
            description: None,
            due_date: date(2026, 3, 20),
            max_marks: 40,
        },
    )
    .await
    .unwrap();
    let submission = AssignmentService::submit_assignment(
        &storage,
        NewSubmission {
            assignment_id: assignment.id,
            student_id: student.id,
            file_path: "uploads/midterm-essay.pdf".to_string(),
        },
    )
    .await
    .unwrap();
    let graded = AssignmentService::grade_submission(&storage, submission.id, 33, Some("Good"))
        .await
        .unwrap();
    assert_eq!(graded.marks, Some(33));

    let result = ResultService::record_result(
        &storage,
        NewResult {
            student_id: student.id,
            course_id: course.id,
            semester: 1,
            academic_year: "2025-2026".to_string(),
            marks: Some(82),
            grade: Some("A-".to_string()),
            status: ResultStatus::Pass,
        },
    )
    .await
    .unwrap();
    assert_eq!(result.status, ResultStatus::Pass);

    let attendance = AttendanceService::attendance_for_student(&storage, student.id)
        .await
        .unwrap();
    assert_eq!(attendance.len(), 1);
    let enrollments = EnrollmentService::enrollments_for_student(&storage, student.id)
        .await
        .unwrap();
    assert_eq!(enrollments.len(), 1);
}

#[tokio::test]
async fn test_concurrent_duplicate_attendance_marks_single_winner() {
    let storage = MemoryStorage::new();
    let program = create_program(&storage).await;
    let course = create_course(&storage, &program).await;
    let student = create_student(&storage, &program).await;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let storage = storage.clone();
        let student_id = student.id;
        let course_id = course.id;
        handles.push(tokio::spawn(async move {
            AttendanceService::mark_attendance(
                &storage,
                NewAttendance {
                    student_id,
                    course_id,
                    date: date(2026, 2, 2),
                    status: AttendanceStatus::Present,
                    taken_by: None,
                },
            )
            .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(OperationError::Conflict(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(successes, 1, "the day may be marked exactly once");
    let attendance = AttendanceService::attendance_for_student(&storage, student.id)
        .await
        .unwrap();
    assert_eq!(attendance.len(), 1);
}

#[tokio::test]
async fn test_record_uniqueness_guards_hold_across_the_board() {
    let storage = MemoryStorage::new();
    let program = create_program(&storage).await;
    let course = create_course(&storage, &program).await;
    let student = create_student(&storage, &program).await;
    let faculty = create_faculty(&storage).await;

    let enrollment = NewEnrollment {
        student_id: student.id,
        course_id: course.id,
        enrolled_on: date(2026, 1, 12),
    };
    EnrollmentService::enroll_student(&storage, enrollment.clone()).await.unwrap();
    let err = EnrollmentService::enroll_student(&storage, enrollment).await.unwrap_err();
    assert!(matches!(err, OperationError::Conflict(_)));

    let result = NewResult {
        student_id: student.id,
        course_id: course.id,
        semester: 1,
        academic_year: "2025-2026".to_string(),
        marks: Some(74),
        grade: None,
        status: ResultStatus::Pass,
    };
    ResultService::record_result(&storage, result.clone()).await.unwrap();
    let err = ResultService::record_result(&storage, result.clone()).await.unwrap_err();
    assert!(matches!(err, OperationError::Conflict(_)));

    // A later academic year is a different record.
    ResultService::record_result(
        &storage,
        NewResult {
            academic_year: "2026-2027".to_string(),
            ..result
        },
    )
    .await
    .unwrap();

    let assignment = AssignmentService::create_assignment(
        &storage,
        NewAssignment {
            course_id: course.id,
            faculty_id: faculty.id,
            title: "Lab report".to_string(),
            description: None,
            due_date: date(2026, 4, 1),
            max_marks: 10,
        },
    )
    .await
    .unwrap();
    let submission = NewSubmission {
        assignment_id: assignment.id,
        student_id: student.id,
        file_path: "uploads/lab-report.pdf".to_string(),
    };
    AssignmentService::submit_assignment(&storage, submission.clone()).await.unwrap();
    let err = AssignmentService::submit_assignment(&storage, submission).await.unwrap_err();
    assert!(matches!(err, OperationError::Conflict(_)));
}

#[tokio::test]
async fn test_rejected_attendance_mark_writes_nothing() {
    let storage = MemoryStorage::new();
    let program = create_program(&storage).await;
    let course = create_course(&storage, &program).await;
    let student = create_student(&storage, &program).await;

    // Future-dated mark fails validation before any write.
    let err = AttendanceService::mark_attendance(
        &storage,
        NewAttendance {
            student_id: student.id,
            course_id: course.id,
            date: Utc::now().date_naive() + chrono::Days::new(7),
            status: AttendanceStatus::Present,
            taken_by: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, OperationError::Validation(_)));

    let attendance = AttendanceService::attendance_for_student(&storage, student.id)
        .await
        .unwrap();
    assert!(attendance.is_empty());
}
