use tracing::instrument;

use collegium_core::{OperationError, validate};
use collegium_models::{
    Assignment, AssignmentId, NewAssignment, NewSubmission, SubmissionId, SubmissionRecord,
};
use collegium_store::{Storage, run_atomic};

use crate::guards::ensure_not_submitted;

pub struct AssignmentService;

impl AssignmentService {
    /// Creates a piece of coursework. The course and the setting faculty
    /// member are resolved in the same transaction as the insert.
    #[instrument(skip(storage, assignment))]
    pub async fn create_assignment(
        storage: &dyn Storage,
        assignment: NewAssignment,
    ) -> Result<Assignment, OperationError> {
        let assignment = NewAssignment {
            course_id: assignment.course_id,
            faculty_id: assignment.faculty_id,
            title: validate::non_empty("title", &assignment.title)?,
            description: validate::optional_text(assignment.description.as_deref()),
            due_date: assignment.due_date,
            max_marks: validate::positive_i32("max_marks", assignment.max_marks)?,
        };

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if !uow.course_exists(assignment.course_id).await? {
                    return Err(OperationError::not_found("course", assignment.course_id));
                }
                if !uow.faculty_exists(assignment.faculty_id).await? {
                    return Err(OperationError::not_found("faculty", assignment.faculty_id));
                }
                Ok(uow.insert_assignment(assignment).await?)
            })
        })
        .await
    }

    #[instrument(skip(storage))]
    pub async fn get_assignment(
        storage: &dyn Storage,
        assignment_id: AssignmentId,
    ) -> Result<Assignment, OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                uow.find_assignment(assignment_id)
                    .await?
                    .ok_or_else(|| OperationError::not_found("assignment", assignment_id))
            })
        })
        .await
    }

    /// Records a student's submission. At most one submission exists per
    /// (assignment, student); the submission timestamp is stamped by the
    /// backend.
    #[instrument(skip(storage, submission))]
    pub async fn submit_assignment(
        storage: &dyn Storage,
        submission: NewSubmission,
    ) -> Result<SubmissionRecord, OperationError> {
        let submission = NewSubmission {
            assignment_id: submission.assignment_id,
            student_id: submission.student_id,
            file_path: validate::non_empty("file_path", &submission.file_path)?,
        };

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if uow.find_assignment(submission.assignment_id).await?.is_none() {
                    return Err(OperationError::not_found(
                        "assignment",
                        submission.assignment_id,
                    ));
                }
                if !uow.student_exists(submission.student_id).await? {
                    return Err(OperationError::not_found("student", submission.student_id));
                }
                ensure_not_submitted(uow, submission.assignment_id, submission.student_id)
                    .await?;
                Ok(uow.insert_submission(submission).await?)
            })
        })
        .await
    }

    /// Grades a submission. The owning assignment is re-read inside the
    /// transaction so the marks cap reflects its current `max_marks`.
    #[instrument(skip(storage, feedback))]
    pub async fn grade_submission(
        storage: &dyn Storage,
        submission_id: SubmissionId,
        marks: i32,
        feedback: Option<&str>,
    ) -> Result<SubmissionRecord, OperationError> {
        let feedback = validate::optional_text(feedback);

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                let Some(submission) = uow.find_submission(submission_id).await? else {
                    return Err(OperationError::not_found("submission", submission_id));
                };
                let Some(assignment) = uow.find_assignment(submission.assignment_id).await? else {
                    return Err(OperationError::not_found(
                        "assignment",
                        submission.assignment_id,
                    ));
                };
                let marks = validate::in_range("marks", marks, 0, assignment.max_marks)?;

                if uow
                    .grade_submission(submission_id, marks, feedback.as_deref())
                    .await?
                    == 0
                {
                    return Err(OperationError::not_found("submission", submission_id));
                }
                Ok(SubmissionRecord {
                    marks: Some(marks),
                    feedback,
                    ..submission
                })
            })
        })
        .await
    }

    /// Every submission against one assignment, oldest first.
    #[instrument(skip(storage))]
    pub async fn submissions_for_assignment(
        storage: &dyn Storage,
        assignment_id: AssignmentId,
    ) -> Result<Vec<SubmissionRecord>, OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if uow.find_assignment(assignment_id).await?.is_none() {
                    return Err(OperationError::not_found("assignment", assignment_id));
                }
                Ok(uow.submissions_for_assignment(assignment_id).await?)
            })
        })
        .await
    }
}
