//! Storage trait seam.
//!
//! A [`Storage`] hands out units of work; a [`UnitOfWork`] is one open
//! transaction exposing every per-entity repository capability. Repository
//! calls take `&mut self` on the unit of work, so a write can only happen
//! inside a transaction someone explicitly began, and the uniqueness-guard
//! reads run against the same transaction as the writes they protect.
//!
//! All fallible calls return [`StoreError`]; interpreting an absent row or a
//! zero row count is the domain layer's job.

use async_trait::async_trait;
use chrono::NaiveDate;
use collegium_core::StoreError;
use collegium_models::{
    Account, AccountId, Assignment, AssignmentId, AttendanceId, AttendanceRecord,
    AttendanceStatus, Book, BookId, Course, CourseId, Enrollment, EnrollmentId, Faculty,
    FacultyId, Fee, FeeId, FeeStatus, Librarian, LibrarianId, Loan, LoanId, NewAccount,
    NewAssignment, NewAttendance, NewBook, NewCourse, NewEnrollment, NewFaculty, NewFee,
    NewLibrarian, NewLoan, NewResult, NewRoutine, NewStudent, NewSubmission, Program, ProgramId,
    ResultId, ResultRecord, ResultStatus, Routine, RoutineId, Student, StudentId,
    SubmissionId, SubmissionRecord,
};

/// Login account rows.
#[async_trait]
pub trait AccountStore: Send {
    async fn insert_account(&mut self, account: NewAccount) -> Result<Account, StoreError>;

    async fn find_account(&mut self, id: AccountId) -> Result<Option<Account>, StoreError>;

    async fn find_account_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<Account>, StoreError>;

    /// Uniqueness-guard read; `excluding` skips the holder's own row on
    /// rename paths.
    async fn username_taken(
        &mut self,
        username: &str,
        excluding: Option<AccountId>,
    ) -> Result<bool, StoreError>;

    async fn rename_account(&mut self, id: AccountId, username: &str)
    -> Result<u64, StoreError>;

    async fn delete_account(&mut self, id: AccountId) -> Result<u64, StoreError>;
}

/// Student profile rows.
#[async_trait]
pub trait StudentStore: Send {
    async fn insert_student(
        &mut self,
        account_id: AccountId,
        profile: NewStudent,
    ) -> Result<Student, StoreError>;

    async fn find_student(&mut self, id: StudentId) -> Result<Option<Student>, StoreError>;

    async fn student_exists(&mut self, id: StudentId) -> Result<bool, StoreError>;

    /// Writes the non-key profile columns of `student` (account, program,
    /// and id are never touched).
    async fn update_student_profile(&mut self, student: &Student) -> Result<u64, StoreError>;

    async fn delete_student(&mut self, id: StudentId) -> Result<u64, StoreError>;
}

/// Faculty profile rows.
#[async_trait]
pub trait FacultyStore: Send {
    async fn insert_faculty(
        &mut self,
        account_id: AccountId,
        profile: NewFaculty,
    ) -> Result<Faculty, StoreError>;

    async fn find_faculty(&mut self, id: FacultyId) -> Result<Option<Faculty>, StoreError>;

    async fn faculty_exists(&mut self, id: FacultyId) -> Result<bool, StoreError>;

    async fn delete_faculty(&mut self, id: FacultyId) -> Result<u64, StoreError>;
}

/// Librarian profile rows.
#[async_trait]
pub trait LibrarianStore: Send {
    async fn insert_librarian(
        &mut self,
        account_id: AccountId,
        profile: NewLibrarian,
    ) -> Result<Librarian, StoreError>;

    async fn find_librarian(&mut self, id: LibrarianId)
    -> Result<Option<Librarian>, StoreError>;

    async fn delete_librarian(&mut self, id: LibrarianId) -> Result<u64, StoreError>;
}

/// Degree program rows.
#[async_trait]
pub trait ProgramStore: Send {
    async fn insert_program(&mut self, name: &str) -> Result<Program, StoreError>;

    async fn find_program(&mut self, id: ProgramId) -> Result<Option<Program>, StoreError>;

    async fn program_exists(&mut self, id: ProgramId) -> Result<bool, StoreError>;

    /// Uniqueness-guard read for the program name.
    async fn program_name_taken(
        &mut self,
        name: &str,
        excluding: Option<ProgramId>,
    ) -> Result<bool, StoreError>;

    async fn rename_program(&mut self, id: ProgramId, name: &str) -> Result<u64, StoreError>;

    async fn list_programs(&mut self) -> Result<Vec<Program>, StoreError>;
}

/// Course rows.
#[async_trait]
pub trait CourseStore: Send {
    async fn insert_course(&mut self, course: NewCourse) -> Result<Course, StoreError>;

    async fn find_course(&mut self, id: CourseId) -> Result<Option<Course>, StoreError>;

    async fn course_exists(&mut self, id: CourseId) -> Result<bool, StoreError>;

    /// Uniqueness-guard read for the course code within (program, semester).
    async fn course_code_taken(
        &mut self,
        program_id: ProgramId,
        semester: i32,
        code: &str,
    ) -> Result<bool, StoreError>;

    async fn courses_for_program_semester(
        &mut self,
        program_id: ProgramId,
        semester: i32,
    ) -> Result<Vec<Course>, StoreError>;
}

/// Book catalog rows, including the availability counter.
#[async_trait]
pub trait BookStore: Send {
    /// Inserts with `available_copies` equal to `total_copies`.
    async fn insert_book(&mut self, book: NewBook) -> Result<Book, StoreError>;

    async fn find_book(&mut self, id: BookId) -> Result<Option<Book>, StoreError>;

    /// Like [`find_book`](Self::find_book) but takes the row lock backends
    /// use on read-modify-write paths.
    async fn find_book_for_update(&mut self, id: BookId) -> Result<Option<Book>, StoreError>;

    async fn find_book_by_isbn(&mut self, isbn: &str) -> Result<Option<Book>, StoreError>;

    /// Uniqueness-guard read for the ISBN.
    async fn isbn_taken(
        &mut self,
        isbn: &str,
        excluding: Option<BookId>,
    ) -> Result<bool, StoreError>;

    /// Writes the metadata columns of `book`; never touches either copy
    /// count.
    async fn update_book_details(&mut self, book: &Book) -> Result<u64, StoreError>;

    /// Decrements `available_copies` iff it is positive. Returns the row
    /// count, so `0` means the last copy was gone by write time.
    async fn take_book_copy(&mut self, id: BookId) -> Result<u64, StoreError>;

    /// Increments `available_copies` iff it is below `total_copies`.
    async fn put_book_copy(&mut self, id: BookId) -> Result<u64, StoreError>;

    async fn delete_book(&mut self, id: BookId) -> Result<u64, StoreError>;
}

/// Lending ledger rows.
#[async_trait]
pub trait LoanStore: Send {
    async fn insert_loan(&mut self, loan: NewLoan) -> Result<Loan, StoreError>;

    async fn find_loan(&mut self, id: LoanId) -> Result<Option<Loan>, StoreError>;

    /// Sets the return date and fine on an open loan.
    async fn close_loan(
        &mut self,
        id: LoanId,
        return_date: NaiveDate,
        fine: f64,
    ) -> Result<u64, StoreError>;

    async fn open_loan_count_for_book(&mut self, book_id: BookId) -> Result<i64, StoreError>;

    async fn open_loans_for_student(
        &mut self,
        student_id: StudentId,
    ) -> Result<Vec<Loan>, StoreError>;

    async fn loans_for_book(&mut self, book_id: BookId) -> Result<Vec<Loan>, StoreError>;

    async fn delete_loan(&mut self, id: LoanId) -> Result<u64, StoreError>;
}

/// Attendance rows.
#[async_trait]
pub trait AttendanceStore: Send {
    async fn insert_attendance(
        &mut self,
        record: NewAttendance,
    ) -> Result<AttendanceRecord, StoreError>;

    async fn find_attendance(
        &mut self,
        id: AttendanceId,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    /// Uniqueness-guard read for (student, course, date).
    async fn attendance_exists(
        &mut self,
        student_id: StudentId,
        course_id: CourseId,
        date: NaiveDate,
    ) -> Result<bool, StoreError>;

    async fn amend_attendance(
        &mut self,
        id: AttendanceId,
        status: AttendanceStatus,
        taken_by: Option<FacultyId>,
    ) -> Result<u64, StoreError>;

    async fn attendance_for_student(
        &mut self,
        student_id: StudentId,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;
}

/// Enrollment rows.
#[async_trait]
pub trait EnrollmentStore: Send {
    async fn insert_enrollment(
        &mut self,
        enrollment: NewEnrollment,
    ) -> Result<Enrollment, StoreError>;

    async fn find_enrollment(
        &mut self,
        id: EnrollmentId,
    ) -> Result<Option<Enrollment>, StoreError>;

    /// Uniqueness-guard read for (student, course).
    async fn enrollment_exists(
        &mut self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<bool, StoreError>;

    async fn set_enrollment_grade(
        &mut self,
        id: EnrollmentId,
        grade: &str,
    ) -> Result<u64, StoreError>;

    async fn delete_enrollment(&mut self, id: EnrollmentId) -> Result<u64, StoreError>;

    async fn enrollments_for_student(
        &mut self,
        student_id: StudentId,
    ) -> Result<Vec<Enrollment>, StoreError>;
}

/// Course result rows.
#[async_trait]
pub trait ResultStore: Send {
    async fn insert_result(&mut self, result: NewResult) -> Result<ResultRecord, StoreError>;

    async fn find_result(&mut self, id: ResultId) -> Result<Option<ResultRecord>, StoreError>;

    /// Uniqueness-guard read for (student, course, academic_year).
    async fn result_exists(
        &mut self,
        student_id: StudentId,
        course_id: CourseId,
        academic_year: &str,
    ) -> Result<bool, StoreError>;

    async fn amend_result(
        &mut self,
        id: ResultId,
        marks: Option<i32>,
        grade: Option<&str>,
        status: ResultStatus,
    ) -> Result<u64, StoreError>;
}

/// Assignment rows.
#[async_trait]
pub trait AssignmentStore: Send {
    async fn insert_assignment(
        &mut self,
        assignment: NewAssignment,
    ) -> Result<Assignment, StoreError>;

    async fn find_assignment(
        &mut self,
        id: AssignmentId,
    ) -> Result<Option<Assignment>, StoreError>;
}

/// Submission rows.
#[async_trait]
pub trait SubmissionStore: Send {
    async fn insert_submission(
        &mut self,
        submission: NewSubmission,
    ) -> Result<SubmissionRecord, StoreError>;

    async fn find_submission(
        &mut self,
        id: SubmissionId,
    ) -> Result<Option<SubmissionRecord>, StoreError>;

    /// Uniqueness-guard read for (assignment, student).
    async fn submission_exists(
        &mut self,
        assignment_id: AssignmentId,
        student_id: StudentId,
    ) -> Result<bool, StoreError>;

    async fn grade_submission(
        &mut self,
        id: SubmissionId,
        marks: i32,
        feedback: Option<&str>,
    ) -> Result<u64, StoreError>;

    async fn submissions_for_assignment(
        &mut self,
        assignment_id: AssignmentId,
    ) -> Result<Vec<SubmissionRecord>, StoreError>;
}

/// Fee rows.
#[async_trait]
pub trait FeeStore: Send {
    async fn insert_fee(&mut self, fee: NewFee) -> Result<Fee, StoreError>;

    async fn find_fee(&mut self, id: FeeId) -> Result<Option<Fee>, StoreError>;

    /// Moves a fee to `status`, recording `paid_on` when given.
    async fn set_fee_status(
        &mut self,
        id: FeeId,
        status: FeeStatus,
        paid_on: Option<NaiveDate>,
    ) -> Result<u64, StoreError>;

    async fn fees_for_student(&mut self, student_id: StudentId)
    -> Result<Vec<Fee>, StoreError>;
}

/// Routine rows.
#[async_trait]
pub trait RoutineStore: Send {
    async fn insert_routine(&mut self, routine: NewRoutine) -> Result<Routine, StoreError>;

    async fn find_routine(&mut self, id: RoutineId) -> Result<Option<Routine>, StoreError>;
}

/// One open transaction across every repository.
///
/// Consuming `self` on commit and rollback makes half-finished transactions
/// unrepresentable: a unit of work either ends explicitly or is dropped, and
/// both backends treat a plain drop as rollback.
#[async_trait]
pub trait UnitOfWork:
    AccountStore
    + StudentStore
    + FacultyStore
    + LibrarianStore
    + ProgramStore
    + CourseStore
    + BookStore
    + LoanStore
    + AttendanceStore
    + EnrollmentStore
    + ResultStore
    + AssignmentStore
    + SubmissionStore
    + FeeStore
    + RoutineStore
    + Send
{
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Hands out units of work.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;
}
