//! Re-exports of the assignment and submission types this module operates on.

pub use collegium_models::{
    Assignment, AssignmentId, NewAssignment, NewSubmission, SubmissionId, SubmissionRecord,
};
