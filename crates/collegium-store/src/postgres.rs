//! PostgreSQL storage backend.
//!
//! One [`PgUnitOfWork`] wraps one sqlx transaction. Read-modify-write paths
//! lock their row with `FOR UPDATE`, the copy counter ops re-check their
//! bound in the `WHERE` clause, and unique indexes on every guarded key back
//! up the co-transactional guard reads. Dropping the unit of work without
//! committing lets sqlx roll the transaction back.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};

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
    FacultyStore, FeeStore, LibrarianStore, LoanStore, ProgramStore, ResultStore, RoutineStore,
    Storage, StudentStore, SubmissionStore, UnitOfWork,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Applies the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    MIGRATOR.run(pool).await.map_err(StoreError::new)
}

/// PostgreSQL-backed storage over a connection pool.
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool to `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(StoreError::new)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let tx = self.pool.begin().await.map_err(StoreError::new)?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// One open PostgreSQL transaction.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl AccountStore for PgUnitOfWork {
    async fn insert_account(&mut self, account: NewAccount) -> Result<Account, StoreError> {
        sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (username, password_hash, role)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.role)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn find_account(&mut self, id: AccountId) -> Result<Option<Account>, StoreError> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn find_account_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<Account>, StoreError> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn username_taken(
        &mut self,
        username: &str,
        excluding: Option<AccountId>,
    ) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                 SELECT 1 FROM accounts
                 WHERE username = $1 AND ($2::uuid IS NULL OR id <> $2)
             )",
        )
        .bind(username)
        .bind(excluding)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn rename_account(
        &mut self,
        id: AccountId,
        username: &str,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE accounts SET username = $2 WHERE id = $1")
            .bind(id)
            .bind(username)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }

    async fn delete_account(&mut self, id: AccountId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl StudentStore for PgUnitOfWork {
    async fn insert_student(
        &mut self,
        account_id: AccountId,
        profile: NewStudent,
    ) -> Result<Student, StoreError> {
        sqlx::query_as::<_, Student>(
            "INSERT INTO students (account_id, program_id, first_name, last_name,
                                   date_of_birth, gender, email, phone, address,
                                   enrollment_date, major)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING *",
        )
        .bind(account_id)
        .bind(profile.program_id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(profile.date_of_birth)
        .bind(&profile.gender)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.address)
        .bind(profile.enrollment_date)
        .bind(&profile.major)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn find_student(&mut self, id: StudentId) -> Result<Option<Student>, StoreError> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn student_exists(&mut self, id: StudentId) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM students WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn update_student_profile(&mut self, student: &Student) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE students
             SET first_name = $2, last_name = $3, date_of_birth = $4, gender = $5,
                 email = $6, phone = $7, address = $8, enrollment_date = $9, major = $10
             WHERE id = $1",
        )
        .bind(student.id)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(student.date_of_birth)
        .bind(&student.gender)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(&student.address)
        .bind(student.enrollment_date)
        .bind(&student.major)
        .execute(&mut *self.tx)
        .await
        .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }

    async fn delete_student(&mut self, id: StudentId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl FacultyStore for PgUnitOfWork {
    async fn insert_faculty(
        &mut self,
        account_id: AccountId,
        profile: NewFaculty,
    ) -> Result<Faculty, StoreError> {
        sqlx::query_as::<_, Faculty>(
            "INSERT INTO faculty (account_id, first_name, last_name, email, phone, department)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(account_id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.department)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn find_faculty(&mut self, id: FacultyId) -> Result<Option<Faculty>, StoreError> {
        sqlx::query_as::<_, Faculty>("SELECT * FROM faculty WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn faculty_exists(&mut self, id: FacultyId) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM faculty WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn delete_faculty(&mut self, id: FacultyId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM faculty WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl LibrarianStore for PgUnitOfWork {
    async fn insert_librarian(
        &mut self,
        account_id: AccountId,
        profile: NewLibrarian,
    ) -> Result<Librarian, StoreError> {
        sqlx::query_as::<_, Librarian>(
            "INSERT INTO librarians (account_id, first_name, last_name, email, phone)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(account_id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn find_librarian(
        &mut self,
        id: LibrarianId,
    ) -> Result<Option<Librarian>, StoreError> {
        sqlx::query_as::<_, Librarian>("SELECT * FROM librarians WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn delete_librarian(&mut self, id: LibrarianId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM librarians WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ProgramStore for PgUnitOfWork {
    async fn insert_program(&mut self, name: &str) -> Result<Program, StoreError> {
        sqlx::query_as::<_, Program>(
            "INSERT INTO programs (name) VALUES ($1) RETURNING *",
        )
        .bind(name)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn find_program(&mut self, id: ProgramId) -> Result<Option<Program>, StoreError> {
        sqlx::query_as::<_, Program>("SELECT * FROM programs WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn program_exists(&mut self, id: ProgramId) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM programs WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn program_name_taken(
        &mut self,
        name: &str,
        excluding: Option<ProgramId>,
    ) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                 SELECT 1 FROM programs
                 WHERE name = $1 AND ($2::uuid IS NULL OR id <> $2)
             )",
        )
        .bind(name)
        .bind(excluding)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn rename_program(&mut self, id: ProgramId, name: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE programs SET name = $2 WHERE id = $1")
            .bind(id)
            .bind(name)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }

    async fn list_programs(&mut self) -> Result<Vec<Program>, StoreError> {
        sqlx::query_as::<_, Program>("SELECT * FROM programs ORDER BY name")
            .fetch_all(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }
}

#[async_trait]
impl CourseStore for PgUnitOfWork {
    async fn insert_course(&mut self, course: NewCourse) -> Result<Course, StoreError> {
        sqlx::query_as::<_, Course>(
            "INSERT INTO courses (program_id, semester, code, name, credits,
                                  description, department)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(course.program_id)
        .bind(course.semester)
        .bind(&course.code)
        .bind(&course.name)
        .bind(course.credits)
        .bind(&course.description)
        .bind(&course.department)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn find_course(&mut self, id: CourseId) -> Result<Option<Course>, StoreError> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn course_exists(&mut self, id: CourseId) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn course_code_taken(
        &mut self,
        program_id: ProgramId,
        semester: i32,
        code: &str,
    ) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                 SELECT 1 FROM courses
                 WHERE program_id = $1 AND semester = $2 AND code = $3
             )",
        )
        .bind(program_id)
        .bind(semester)
        .bind(code)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn courses_for_program_semester(
        &mut self,
        program_id: ProgramId,
        semester: i32,
    ) -> Result<Vec<Course>, StoreError> {
        sqlx::query_as::<_, Course>(
            "SELECT * FROM courses
             WHERE program_id = $1 AND semester = $2
             ORDER BY code",
        )
        .bind(program_id)
        .bind(semester)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }
}

#[async_trait]
impl BookStore for PgUnitOfWork {
    async fn insert_book(&mut self, book: NewBook) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>(
            "INSERT INTO books (isbn, title, author, publisher, publication_year,
                                genre, total_copies, available_copies)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
             RETURNING *",
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(book.publication_year)
        .bind(&book.genre)
        .bind(book.total_copies)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn find_book(&mut self, id: BookId) -> Result<Option<Book>, StoreError> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn find_book_for_update(&mut self, id: BookId) -> Result<Option<Book>, StoreError> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn find_book_by_isbn(&mut self, isbn: &str) -> Result<Option<Book>, StoreError> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn isbn_taken(
        &mut self,
        isbn: &str,
        excluding: Option<BookId>,
    ) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                 SELECT 1 FROM books
                 WHERE isbn = $1 AND ($2::uuid IS NULL OR id <> $2)
             )",
        )
        .bind(isbn)
        .bind(excluding)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn update_book_details(&mut self, book: &Book) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE books
             SET isbn = $2, title = $3, author = $4, publisher = $5,
                 publication_year = $6, genre = $7
             WHERE id = $1",
        )
        .bind(book.id)
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(book.publication_year)
        .bind(&book.genre)
        .execute(&mut *self.tx)
        .await
        .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }

    async fn take_book_copy(&mut self, id: BookId) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE books SET available_copies = available_copies - 1
             WHERE id = $1 AND available_copies > 0",
        )
        .bind(id)
        .execute(&mut *self.tx)
        .await
        .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }

    async fn put_book_copy(&mut self, id: BookId) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE books SET available_copies = available_copies + 1
             WHERE id = $1 AND available_copies < total_copies",
        )
        .bind(id)
        .execute(&mut *self.tx)
        .await
        .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }

    async fn delete_book(&mut self, id: BookId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl LoanStore for PgUnitOfWork {
    async fn insert_loan(&mut self, loan: NewLoan) -> Result<Loan, StoreError> {
        sqlx::query_as::<_, Loan>(
            "INSERT INTO loans (book_id, student_id, borrow_date, due_date)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(loan.book_id)
        .bind(loan.student_id)
        .bind(loan.borrow_date)
        .bind(loan.due_date)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn find_loan(&mut self, id: LoanId) -> Result<Option<Loan>, StoreError> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn close_loan(
        &mut self,
        id: LoanId,
        return_date: NaiveDate,
        fine: f64,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE loans SET return_date = $2, fine = $3
             WHERE id = $1 AND return_date IS NULL",
        )
        .bind(id)
        .bind(return_date)
        .bind(fine)
        .execute(&mut *self.tx)
        .await
        .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }

    async fn open_loan_count_for_book(&mut self, book_id: BookId) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM loans WHERE book_id = $1 AND return_date IS NULL",
        )
        .bind(book_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn open_loans_for_student(
        &mut self,
        student_id: StudentId,
    ) -> Result<Vec<Loan>, StoreError> {
        sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans
             WHERE student_id = $1 AND return_date IS NULL
             ORDER BY borrow_date, id",
        )
        .bind(student_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn loans_for_book(&mut self, book_id: BookId) -> Result<Vec<Loan>, StoreError> {
        sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE book_id = $1 ORDER BY borrow_date, id",
        )
        .bind(book_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn delete_loan(&mut self, id: LoanId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM loans WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl AttendanceStore for PgUnitOfWork {
    async fn insert_attendance(
        &mut self,
        record: NewAttendance,
    ) -> Result<AttendanceRecord, StoreError> {
        sqlx::query_as::<_, AttendanceRecord>(
            "INSERT INTO attendance (student_id, course_id, date, status, taken_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(record.student_id)
        .bind(record.course_id)
        .bind(record.date)
        .bind(record.status)
        .bind(record.taken_by)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn find_attendance(
        &mut self,
        id: AttendanceId,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        sqlx::query_as::<_, AttendanceRecord>("SELECT * FROM attendance WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn attendance_exists(
        &mut self,
        student_id: StudentId,
        course_id: CourseId,
        date: NaiveDate,
    ) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                 SELECT 1 FROM attendance
                 WHERE student_id = $1 AND course_id = $2 AND date = $3
             )",
        )
        .bind(student_id)
        .bind(course_id)
        .bind(date)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn amend_attendance(
        &mut self,
        id: AttendanceId,
        status: AttendanceStatus,
        taken_by: Option<FacultyId>,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE attendance SET status = $2, taken_by = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(taken_by)
        .execute(&mut *self.tx)
        .await
        .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }

    async fn attendance_for_student(
        &mut self,
        student_id: StudentId,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance WHERE student_id = $1 ORDER BY date, id",
        )
        .bind(student_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }
}

#[async_trait]
impl EnrollmentStore for PgUnitOfWork {
    async fn insert_enrollment(
        &mut self,
        enrollment: NewEnrollment,
    ) -> Result<Enrollment, StoreError> {
        sqlx::query_as::<_, Enrollment>(
            "INSERT INTO enrollments (student_id, course_id, enrolled_on)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(enrollment.student_id)
        .bind(enrollment.course_id)
        .bind(enrollment.enrolled_on)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn find_enrollment(
        &mut self,
        id: EnrollmentId,
    ) -> Result<Option<Enrollment>, StoreError> {
        sqlx::query_as::<_, Enrollment>("SELECT * FROM enrollments WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn enrollment_exists(
        &mut self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                 SELECT 1 FROM enrollments WHERE student_id = $1 AND course_id = $2
             )",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn set_enrollment_grade(
        &mut self,
        id: EnrollmentId,
        grade: &str,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE enrollments SET grade = $2 WHERE id = $1")
            .bind(id)
            .bind(grade)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }

    async fn delete_enrollment(&mut self, id: EnrollmentId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }

    async fn enrollments_for_student(
        &mut self,
        student_id: StudentId,
    ) -> Result<Vec<Enrollment>, StoreError> {
        sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE student_id = $1 ORDER BY enrolled_on, id",
        )
        .bind(student_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }
}

#[async_trait]
impl ResultStore for PgUnitOfWork {
    async fn insert_result(&mut self, result: NewResult) -> Result<ResultRecord, StoreError> {
        sqlx::query_as::<_, ResultRecord>(
            "INSERT INTO results (student_id, course_id, semester, academic_year,
                                  marks, grade, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(result.student_id)
        .bind(result.course_id)
        .bind(result.semester)
        .bind(&result.academic_year)
        .bind(result.marks)
        .bind(&result.grade)
        .bind(result.status)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn find_result(&mut self, id: ResultId) -> Result<Option<ResultRecord>, StoreError> {
        sqlx::query_as::<_, ResultRecord>("SELECT * FROM results WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn result_exists(
        &mut self,
        student_id: StudentId,
        course_id: CourseId,
        academic_year: &str,
    ) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                 SELECT 1 FROM results
                 WHERE student_id = $1 AND course_id = $2 AND academic_year = $3
             )",
        )
        .bind(student_id)
        .bind(course_id)
        .bind(academic_year)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn amend_result(
        &mut self,
        id: ResultId,
        marks: Option<i32>,
        grade: Option<&str>,
        status: ResultStatus,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE results SET marks = $2, grade = $3, status = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(marks)
        .bind(grade)
        .bind(status)
        .execute(&mut *self.tx)
        .await
        .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl AssignmentStore for PgUnitOfWork {
    async fn insert_assignment(
        &mut self,
        assignment: NewAssignment,
    ) -> Result<Assignment, StoreError> {
        sqlx::query_as::<_, Assignment>(
            "INSERT INTO assignments (course_id, faculty_id, title, description,
                                      due_date, max_marks)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(assignment.course_id)
        .bind(assignment.faculty_id)
        .bind(&assignment.title)
        .bind(&assignment.description)
        .bind(assignment.due_date)
        .bind(assignment.max_marks)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn find_assignment(
        &mut self,
        id: AssignmentId,
    ) -> Result<Option<Assignment>, StoreError> {
        sqlx::query_as::<_, Assignment>("SELECT * FROM assignments WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }
}

#[async_trait]
impl SubmissionStore for PgUnitOfWork {
    async fn insert_submission(
        &mut self,
        submission: NewSubmission,
    ) -> Result<SubmissionRecord, StoreError> {
        sqlx::query_as::<_, SubmissionRecord>(
            "INSERT INTO submissions (assignment_id, student_id, file_path)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(submission.assignment_id)
        .bind(submission.student_id)
        .bind(&submission.file_path)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn find_submission(
        &mut self,
        id: SubmissionId,
    ) -> Result<Option<SubmissionRecord>, StoreError> {
        sqlx::query_as::<_, SubmissionRecord>("SELECT * FROM submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn submission_exists(
        &mut self,
        assignment_id: AssignmentId,
        student_id: StudentId,
    ) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                 SELECT 1 FROM submissions WHERE assignment_id = $1 AND student_id = $2
             )",
        )
        .bind(assignment_id)
        .bind(student_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn grade_submission(
        &mut self,
        id: SubmissionId,
        marks: i32,
        feedback: Option<&str>,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE submissions SET marks = $2, feedback = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(marks)
        .bind(feedback)
        .execute(&mut *self.tx)
        .await
        .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }

    async fn submissions_for_assignment(
        &mut self,
        assignment_id: AssignmentId,
    ) -> Result<Vec<SubmissionRecord>, StoreError> {
        sqlx::query_as::<_, SubmissionRecord>(
            "SELECT * FROM submissions WHERE assignment_id = $1 ORDER BY submitted_at, id",
        )
        .bind(assignment_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }
}

#[async_trait]
impl FeeStore for PgUnitOfWork {
    async fn insert_fee(&mut self, fee: NewFee) -> Result<Fee, StoreError> {
        sqlx::query_as::<_, Fee>(
            "INSERT INTO fees (student_id, fee_type, amount, due_date)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(fee.student_id)
        .bind(&fee.fee_type)
        .bind(fee.amount)
        .bind(fee.due_date)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn find_fee(&mut self, id: FeeId) -> Result<Option<Fee>, StoreError> {
        sqlx::query_as::<_, Fee>("SELECT * FROM fees WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }

    async fn set_fee_status(
        &mut self,
        id: FeeId,
        status: FeeStatus,
        paid_on: Option<NaiveDate>,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE fees SET status = $2, paid_on = COALESCE($3, paid_on) WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(paid_on)
        .execute(&mut *self.tx)
        .await
        .map_err(StoreError::new)?;
        Ok(result.rows_affected())
    }

    async fn fees_for_student(
        &mut self,
        student_id: StudentId,
    ) -> Result<Vec<Fee>, StoreError> {
        sqlx::query_as::<_, Fee>(
            "SELECT * FROM fees WHERE student_id = $1 ORDER BY due_date, id",
        )
        .bind(student_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }
}

#[async_trait]
impl RoutineStore for PgUnitOfWork {
    async fn insert_routine(&mut self, routine: NewRoutine) -> Result<Routine, StoreError> {
        sqlx::query_as::<_, Routine>(
            "INSERT INTO routines (course_id, faculty_id, kind, day_of_week,
                                   start_time, end_time, room, academic_year, semester)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *",
        )
        .bind(routine.course_id)
        .bind(routine.faculty_id)
        .bind(routine.kind)
        .bind(&routine.day_of_week)
        .bind(routine.start_time)
        .bind(routine.end_time)
        .bind(&routine.room)
        .bind(&routine.academic_year)
        .bind(routine.semester)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::new)
    }

    async fn find_routine(&mut self, id: RoutineId) -> Result<Option<Routine>, StoreError> {
        sqlx::query_as::<_, Routine>("SELECT * FROM routines WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::new)
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(StoreError::new)
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(StoreError::new)
    }
}
