//! In-memory storage backend.
//!
//! Mirrors the relational backend's transactional behavior without a
//! database. `begin` takes an owned lock over the whole table set, so units
//! of work are fully serialized; writes land in a working copy that replaces
//! the shared tables only on commit. Dropping a unit of work without
//! committing discards the copy, which is what makes cancellation safe.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use collegium_core::StoreError;
use collegium_models::{
    Account, AccountId, Assignment, AssignmentId, AttendanceId, AttendanceRecord,
    AttendanceStatus, Book, BookId, Course, CourseId, Enrollment, EnrollmentId, Faculty,
    FacultyId, Fee, FeeId, FeeStatus, Librarian, LibrarianId, Loan, LoanId, NewAccount,
    NewAssignment, NewAttendance, NewBook, NewCourse, NewEnrollment, NewFaculty, NewFee,
    NewLibrarian, NewLoan, NewResult, NewRoutine, NewStudent, NewSubmission, Program, ProgramId,
    ResultId, ResultRecord, ResultStatus, Routine, RoutineId, Student, StudentId, SubmissionId,
    SubmissionRecord,
};

use crate::traits::{
    AccountStore, AssignmentStore, AttendanceStore, BookStore, CourseStore, EnrollmentStore,
    FacultyStore, FeeStore, LibrarianStore, LoanStore, ProgramStore, ResultStore, Storage,
    StudentStore, SubmissionStore, RoutineStore, UnitOfWork,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    accounts: BTreeMap<AccountId, Account>,
    students: BTreeMap<StudentId, Student>,
    faculty: BTreeMap<FacultyId, Faculty>,
    librarians: BTreeMap<LibrarianId, Librarian>,
    programs: BTreeMap<ProgramId, Program>,
    courses: BTreeMap<CourseId, Course>,
    books: BTreeMap<BookId, Book>,
    loans: BTreeMap<LoanId, Loan>,
    attendance: BTreeMap<AttendanceId, AttendanceRecord>,
    enrollments: BTreeMap<EnrollmentId, Enrollment>,
    results: BTreeMap<ResultId, ResultRecord>,
    assignments: BTreeMap<AssignmentId, Assignment>,
    submissions: BTreeMap<SubmissionId, SubmissionRecord>,
    fees: BTreeMap<FeeId, Fee>,
    routines: BTreeMap<RoutineId, Routine>,
}

/// Shared in-memory storage. Cloning shares the underlying tables.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }
}

/// One serialized transaction over the shared tables.
///
/// Holds the storage lock for its whole lifetime; the working copy becomes
/// the shared state only through [`UnitOfWork::commit`].
pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl AccountStore for MemoryUnitOfWork {
    async fn insert_account(&mut self, account: NewAccount) -> Result<Account, StoreError> {
        let record = Account {
            id: AccountId::new(),
            username: account.username,
            password_hash: account.password_hash,
            role: account.role,
            created_at: Utc::now(),
        };
        self.working.accounts.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_account(&mut self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.working.accounts.get(&id).cloned())
    }

    async fn find_account_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .working
            .accounts
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn username_taken(
        &mut self,
        username: &str,
        excluding: Option<AccountId>,
    ) -> Result<bool, StoreError> {
        Ok(self
            .working
            .accounts
            .values()
            .any(|a| a.username == username && excluding != Some(a.id)))
    }

    async fn rename_account(
        &mut self,
        id: AccountId,
        username: &str,
    ) -> Result<u64, StoreError> {
        match self.working.accounts.get_mut(&id) {
            Some(account) => {
                account.username = username.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_account(&mut self, id: AccountId) -> Result<u64, StoreError> {
        Ok(self.working.accounts.remove(&id).map_or(0, |_| 1))
    }
}

#[async_trait]
impl StudentStore for MemoryUnitOfWork {
    async fn insert_student(
        &mut self,
        account_id: AccountId,
        profile: NewStudent,
    ) -> Result<Student, StoreError> {
        let record = Student {
            id: StudentId::new(),
            account_id,
            program_id: profile.program_id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            date_of_birth: profile.date_of_birth,
            gender: profile.gender,
            email: profile.email,
            phone: profile.phone,
            address: profile.address,
            enrollment_date: profile.enrollment_date,
            major: profile.major,
        };
        self.working.students.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_student(&mut self, id: StudentId) -> Result<Option<Student>, StoreError> {
        Ok(self.working.students.get(&id).cloned())
    }

    async fn student_exists(&mut self, id: StudentId) -> Result<bool, StoreError> {
        Ok(self.working.students.contains_key(&id))
    }

    async fn update_student_profile(&mut self, student: &Student) -> Result<u64, StoreError> {
        match self.working.students.get_mut(&student.id) {
            Some(row) => {
                row.first_name = student.first_name.clone();
                row.last_name = student.last_name.clone();
                row.date_of_birth = student.date_of_birth;
                row.gender = student.gender.clone();
                row.email = student.email.clone();
                row.phone = student.phone.clone();
                row.address = student.address.clone();
                row.enrollment_date = student.enrollment_date;
                row.major = student.major.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_student(&mut self, id: StudentId) -> Result<u64, StoreError> {
        Ok(self.working.students.remove(&id).map_or(0, |_| 1))
    }
}

#[async_trait]
impl FacultyStore for MemoryUnitOfWork {
    async fn insert_faculty(
        &mut self,
        account_id: AccountId,
        profile: NewFaculty,
    ) -> Result<Faculty, StoreError> {
        let record = Faculty {
            id: FacultyId::new(),
            account_id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
            phone: profile.phone,
            department: profile.department,
        };
        self.working.faculty.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_faculty(&mut self, id: FacultyId) -> Result<Option<Faculty>, StoreError> {
        Ok(self.working.faculty.get(&id).cloned())
    }

    async fn faculty_exists(&mut self, id: FacultyId) -> Result<bool, StoreError> {
        Ok(self.working.faculty.contains_key(&id))
    }

    async fn delete_faculty(&mut self, id: FacultyId) -> Result<u64, StoreError> {
        Ok(self.working.faculty.remove(&id).map_or(0, |_| 1))
    }
}

#[async_trait]
impl LibrarianStore for MemoryUnitOfWork {
    async fn insert_librarian(
        &mut self,
        account_id: AccountId,
        profile: NewLibrarian,
    ) -> Result<Librarian, StoreError> {
        let record = Librarian {
            id: LibrarianId::new(),
            account_id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
            phone: profile.phone,
        };
        self.working.librarians.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_librarian(
        &mut self,
        id: LibrarianId,
    ) -> Result<Option<Librarian>, StoreError> {
        Ok(self.working.librarians.get(&id).cloned())
    }

    async fn delete_librarian(&mut self, id: LibrarianId) -> Result<u64, StoreError> {
        Ok(self.working.librarians.remove(&id).map_or(0, |_| 1))
    }
}

#[async_trait]
impl ProgramStore for MemoryUnitOfWork {
    async fn insert_program(&mut self, name: &str) -> Result<Program, StoreError> {
        let record = Program {
            id: ProgramId::new(),
            name: name.to_string(),
        };
        self.working.programs.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_program(&mut self, id: ProgramId) -> Result<Option<Program>, StoreError> {
        Ok(self.working.programs.get(&id).cloned())
    }

    async fn program_exists(&mut self, id: ProgramId) -> Result<bool, StoreError> {
        Ok(self.working.programs.contains_key(&id))
    }

    async fn program_name_taken(
        &mut self,
        name: &str,
        excluding: Option<ProgramId>,
    ) -> Result<bool, StoreError> {
        Ok(self
            .working
            .programs
            .values()
            .any(|p| p.name == name && excluding != Some(p.id)))
    }

    async fn rename_program(&mut self, id: ProgramId, name: &str) -> Result<u64, StoreError> {
        match self.working.programs.get_mut(&id) {
            Some(program) => {
                program.name = name.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn list_programs(&mut self) -> Result<Vec<Program>, StoreError> {
        let mut programs: Vec<Program> = self.working.programs.values().cloned().collect();
        programs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(programs)
    }
}

#[async_trait]
impl CourseStore for MemoryUnitOfWork {
    async fn insert_course(&mut self, course: NewCourse) -> Result<Course, StoreError> {
        let record = Course {
            id: CourseId::new(),
            program_id: course.program_id,
            semester: course.semester,
            code: course.code,
            name: course.name,
            credits: course.credits,
            description: course.description,
            department: course.department,
        };
        self.working.courses.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_course(&mut self, id: CourseId) -> Result<Option<Course>, StoreError> {
        Ok(self.working.courses.get(&id).cloned())
    }

    async fn course_exists(&mut self, id: CourseId) -> Result<bool, StoreError> {
        Ok(self.working.courses.contains_key(&id))
    }

    async fn course_code_taken(
        &mut self,
        program_id: ProgramId,
        semester: i32,
        code: &str,
    ) -> Result<bool, StoreError> {
        Ok(self
            .working
            .courses
            .values()
            .any(|c| c.program_id == program_id && c.semester == semester && c.code == code))
    }

    async fn courses_for_program_semester(
        &mut self,
        program_id: ProgramId,
        semester: i32,
    ) -> Result<Vec<Course>, StoreError> {
        let mut courses: Vec<Course> = self
            .working
            .courses
            .values()
            .filter(|c| c.program_id == program_id && c.semester == semester)
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(courses)
    }
}

#[async_trait]
impl BookStore for MemoryUnitOfWork {
    async fn insert_book(&mut self, book: NewBook) -> Result<Book, StoreError> {
        let record = Book {
            id: BookId::new(),
            isbn: book.isbn,
            title: book.title,
            author: book.author,
            publisher: book.publisher,
            publication_year: book.publication_year,
            genre: book.genre,
            total_copies: book.total_copies,
            available_copies: book.total_copies,
            added_at: Utc::now(),
        };
        self.working.books.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_book(&mut self, id: BookId) -> Result<Option<Book>, StoreError> {
        Ok(self.working.books.get(&id).cloned())
    }

    async fn find_book_for_update(&mut self, id: BookId) -> Result<Option<Book>, StoreError> {
        // Transactions are serialized here, so the plain read is already
        // exclusive.
        self.find_book(id).await
    }

    async fn find_book_by_isbn(&mut self, isbn: &str) -> Result<Option<Book>, StoreError> {
        Ok(self
            .working
            .books
            .values()
            .find(|b| b.isbn.as_deref() == Some(isbn))
            .cloned())
    }

    async fn isbn_taken(
        &mut self,
        isbn: &str,
        excluding: Option<BookId>,
    ) -> Result<bool, StoreError> {
        Ok(self
            .working
            .books
            .values()
            .any(|b| b.isbn.as_deref() == Some(isbn) && excluding != Some(b.id)))
    }

    async fn update_book_details(&mut self, book: &Book) -> Result<u64, StoreError> {
        match self.working.books.get_mut(&book.id) {
            Some(row) => {
                row.isbn = book.isbn.clone();
                row.title = book.title.clone();
                row.author = book.author.clone();
                row.publisher = book.publisher.clone();
                row.publication_year = book.publication_year;
                row.genre = book.genre.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn take_book_copy(&mut self, id: BookId) -> Result<u64, StoreError> {
        match self.working.books.get_mut(&id) {
            Some(book) if book.available_copies > 0 => {
                book.available_copies -= 1;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn put_book_copy(&mut self, id: BookId) -> Result<u64, StoreError> {
        match self.working.books.get_mut(&id) {
            Some(book) if book.available_copies < book.total_copies => {
                book.available_copies += 1;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_book(&mut self, id: BookId) -> Result<u64, StoreError> {
        Ok(self.working.books.remove(&id).map_or(0, |_| 1))
    }
}

#[async_trait]
impl LoanStore for MemoryUnitOfWork {
    async fn insert_loan(&mut self, loan: NewLoan) -> Result<Loan, StoreError> {
        let record = Loan {
            id: LoanId::new(),
            book_id: loan.book_id,
            student_id: loan.student_id,
            borrow_date: loan.borrow_date,
            due_date: loan.due_date,
            return_date: None,
            fine: 0.0,
        };
        self.working.loans.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_loan(&mut self, id: LoanId) -> Result<Option<Loan>, StoreError> {
        Ok(self.working.loans.get(&id).cloned())
    }

    async fn close_loan(
        &mut self,
        id: LoanId,
        return_date: NaiveDate,
        fine: f64,
    ) -> Result<u64, StoreError> {
        match self.working.loans.get_mut(&id) {
            Some(loan) if loan.return_date.is_none() => {
                loan.return_date = Some(return_date);
                loan.fine = fine;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn open_loan_count_for_book(&mut self, book_id: BookId) -> Result<i64, StoreError> {
        Ok(self
            .working
            .loans
            .values()
            .filter(|l| l.book_id == book_id && l.is_open())
            .count() as i64)
    }

    async fn open_loans_for_student(
        &mut self,
        student_id: StudentId,
    ) -> Result<Vec<Loan>, StoreError> {
        let mut loans: Vec<Loan> = self
            .working
            .loans
            .values()
            .filter(|l| l.student_id == student_id && l.is_open())
            .cloned()
            .collect();
        loans.sort_by(|a, b| a.borrow_date.cmp(&b.borrow_date).then(a.id.cmp(&b.id)));
        Ok(loans)
    }

    async fn loans_for_book(&mut self, book_id: BookId) -> Result<Vec<Loan>, StoreError> {
        let mut loans: Vec<Loan> = self
            .working
            .loans
            .values()
            .filter(|l| l.book_id == book_id)
            .cloned()
            .collect();
        loans.sort_by(|a, b| a.borrow_date.cmp(&b.borrow_date).then(a.id.cmp(&b.id)));
        Ok(loans)
    }

    async fn delete_loan(&mut self, id: LoanId) -> Result<u64, StoreError> {
        Ok(self.working.loans.remove(&id).map_or(0, |_| 1))
    }
}

#[async_trait]
impl AttendanceStore for MemoryUnitOfWork {
    async fn insert_attendance(
        &mut self,
        record: NewAttendance,
    ) -> Result<AttendanceRecord, StoreError> {
        let stored = AttendanceRecord {
            id: AttendanceId::new(),
            student_id: record.student_id,
            course_id: record.course_id,
            date: record.date,
            status: record.status,
            taken_by: record.taken_by,
        };
        self.working.attendance.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_attendance(
        &mut self,
        id: AttendanceId,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        Ok(self.working.attendance.get(&id).cloned())
    }

    async fn attendance_exists(
        &mut self,
        student_id: StudentId,
        course_id: CourseId,
        date: NaiveDate,
    ) -> Result<bool, StoreError> {
        Ok(self.working.attendance.values().any(|a| {
            a.student_id == student_id && a.course_id == course_id && a.date == date
        }))
    }

    async fn amend_attendance(
        &mut self,
        id: AttendanceId,
        status: AttendanceStatus,
        taken_by: Option<FacultyId>,
    ) -> Result<u64, StoreError> {
        match self.working.attendance.get_mut(&id) {
            Some(record) => {
                record.status = status;
                record.taken_by = taken_by;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn attendance_for_student(
        &mut self,
        student_id: StudentId,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let mut records: Vec<AttendanceRecord> = self
            .working
            .attendance
            .values()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(records)
    }
}

#[async_trait]
impl EnrollmentStore for MemoryUnitOfWork {
    async fn insert_enrollment(
        &mut self,
        enrollment: NewEnrollment,
    ) -> Result<Enrollment, StoreError> {
        let record = Enrollment {
            id: EnrollmentId::new(),
            student_id: enrollment.student_id,
            course_id: enrollment.course_id,
            enrolled_on: enrollment.enrolled_on,
            grade: None,
        };
        self.working.enrollments.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_enrollment(
        &mut self,
        id: EnrollmentId,
    ) -> Result<Option<Enrollment>, StoreError> {
        Ok(self.working.enrollments.get(&id).cloned())
    }

    async fn enrollment_exists(
        &mut self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<bool, StoreError> {
        Ok(self
            .working
            .enrollments
            .values()
            .any(|e| e.student_id == student_id && e.course_id == course_id))
    }

    async fn set_enrollment_grade(
        &mut self,
        id: EnrollmentId,
        grade: &str,
    ) -> Result<u64, StoreError> {
        match self.working.enrollments.get_mut(&id) {
            Some(enrollment) => {
                enrollment.grade = Some(grade.to_string());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_enrollment(&mut self, id: EnrollmentId) -> Result<u64, StoreError> {
        Ok(self.working.enrollments.remove(&id).map_or(0, |_| 1))
    }

    async fn enrollments_for_student(
        &mut self,
        student_id: StudentId,
    ) -> Result<Vec<Enrollment>, StoreError> {
        let mut enrollments: Vec<Enrollment> = self
            .working
            .enrollments
            .values()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect();
        enrollments.sort_by(|a, b| a.enrolled_on.cmp(&b.enrolled_on).then(a.id.cmp(&b.id)));
        Ok(enrollments)
    }
}

#[async_trait]
impl ResultStore for MemoryUnitOfWork {
    async fn insert_result(&mut self, result: NewResult) -> Result<ResultRecord, StoreError> {
        let record = ResultRecord {
            id: ResultId::new(),
            student_id: result.student_id,
            course_id: result.course_id,
            semester: result.semester,
            academic_year: result.academic_year,
            marks: result.marks,
            grade: result.grade,
            status: result.status,
        };
        self.working.results.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_result(&mut self, id: ResultId) -> Result<Option<ResultRecord>, StoreError> {
        Ok(self.working.results.get(&id).cloned())
    }

    async fn result_exists(
        &mut self,
        student_id: StudentId,
        course_id: CourseId,
        academic_year: &str,
    ) -> Result<bool, StoreError> {
        Ok(self.working.results.values().any(|r| {
            r.student_id == student_id
                && r.course_id == course_id
                && r.academic_year == academic_year
        }))
    }

    async fn amend_result(
        &mut self,
        id: ResultId,
        marks: Option<i32>,
        grade: Option<&str>,
        status: ResultStatus,
    ) -> Result<u64, StoreError> {
        match self.working.results.get_mut(&id) {
            Some(record) => {
                record.marks = marks;
                record.grade = grade.map(str::to_string);
                record.status = status;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[async_trait]
impl AssignmentStore for MemoryUnitOfWork {
    async fn insert_assignment(
        &mut self,
        assignment: NewAssignment,
    ) -> Result<Assignment, StoreError> {
        let record = Assignment {
            id: AssignmentId::new(),
            course_id: assignment.course_id,
            faculty_id: assignment.faculty_id,
            title: assignment.title,
            description: assignment.description,
            due_date: assignment.due_date,
            max_marks: assignment.max_marks,
            created_at: Utc::now(),
        };
        self.working.assignments.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_assignment(
        &mut self,
        id: AssignmentId,
    ) -> Result<Option<Assignment>, StoreError> {
        Ok(self.working.assignments.get(&id).cloned())
    }
}

#[async_trait]
impl SubmissionStore for MemoryUnitOfWork {
    async fn insert_submission(
        &mut self,
        submission: NewSubmission,
    ) -> Result<SubmissionRecord, StoreError> {
        let record = SubmissionRecord {
            id: SubmissionId::new(),
            assignment_id: submission.assignment_id,
            student_id: submission.student_id,
            submitted_at: Utc::now(),
            file_path: submission.file_path,
            marks: None,
            feedback: None,
        };
        self.working.submissions.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_submission(
        &mut self,
        id: SubmissionId,
    ) -> Result<Option<SubmissionRecord>, StoreError> {
        Ok(self.working.submissions.get(&id).cloned())
    }

    async fn submission_exists(
        &mut self,
        assignment_id: AssignmentId,
        student_id: StudentId,
    ) -> Result<bool, StoreError> {
        Ok(self
            .working
            .submissions
            .values()
            .any(|s| s.assignment_id == assignment_id && s.student_id == student_id))
    }

    async fn grade_submission(
        &mut self,
        id: SubmissionId,
        marks: i32,
        feedback: Option<&str>,
    ) -> Result<u64, StoreError> {
        match self.working.submissions.get_mut(&id) {
            Some(record) => {
                record.marks = Some(marks);
                record.feedback = feedback.map(str::to_string);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn submissions_for_assignment(
        &mut self,
        assignment_id: AssignmentId,
    ) -> Result<Vec<SubmissionRecord>, StoreError> {
        let mut submissions: Vec<SubmissionRecord> = self
            .working
            .submissions
            .values()
            .filter(|s| s.assignment_id == assignment_id)
            .cloned()
            .collect();
        submissions.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then(a.id.cmp(&b.id)));
        Ok(submissions)
    }
}

#[async_trait]
impl FeeStore for MemoryUnitOfWork {
    async fn insert_fee(&mut self, fee: NewFee) -> Result<Fee, StoreError> {
        let record = Fee {
            id: FeeId::new(),
            student_id: fee.student_id,
            fee_type: fee.fee_type,
            amount: fee.amount,
            due_date: fee.due_date,
            paid_on: None,
            status: FeeStatus::Due,
        };
        self.working.fees.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_fee(&mut self, id: FeeId) -> Result<Option<Fee>, StoreError> {
        Ok(self.working.fees.get(&id).cloned())
    }

    async fn set_fee_status(
        &mut self,
        id: FeeId,
        status: FeeStatus,
        paid_on: Option<NaiveDate>,
    ) -> Result<u64, StoreError> {
        match self.working.fees.get_mut(&id) {
            Some(fee) => {
                fee.status = status;
                if let Some(date) = paid_on {
                    fee.paid_on = Some(date);
                }
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn fees_for_student(
        &mut self,
        student_id: StudentId,
    ) -> Result<Vec<Fee>, StoreError> {
        let mut fees: Vec<Fee> = self
            .working
            .fees
            .values()
            .filter(|f| f.student_id == student_id)
            .cloned()
            .collect();
        fees.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.id.cmp(&b.id)));
        Ok(fees)
    }
}

#[async_trait]
impl RoutineStore for MemoryUnitOfWork {
    async fn insert_routine(&mut self, routine: NewRoutine) -> Result<Routine, StoreError> {
        let record = Routine {
            id: RoutineId::new(),
            course_id: routine.course_id,
            faculty_id: routine.faculty_id,
            kind: routine.kind,
            day_of_week: routine.day_of_week,
            start_time: routine.start_time,
            end_time: routine.end_time,
            room: routine.room,
            academic_year: routine.academic_year,
            semester: routine.semester,
        };
        self.working.routines.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_routine(&mut self, id: RoutineId) -> Result<Option<Routine>, StoreError> {
        Ok(self.working.routines.get(&id).cloned())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        // Dropping the working copy without publishing it is the rollback.
        Ok(())
    }
}
