use chrono::{Datelike, NaiveDate, Utc};
use tracing::instrument;

use collegium_core::{OperationError, validate};
use collegium_models::{Book, BookId, Loan, LoanId, NewBook, NewLoan, StudentId, UpdateBook};
use collegium_store::{Storage, run_atomic};

use crate::config::lending::LendingPolicy;
use crate::guards::ensure_isbn_free;

pub struct LibraryService;

impl LibraryService {
    /// Adds a title to the catalog. Available copies start equal to total.
    #[instrument(skip(storage, book))]
    pub async fn add_book(storage: &dyn Storage, book: NewBook) -> Result<Book, OperationError> {
        let book = NewBook {
            isbn: validate::optional_text(book.isbn.as_deref()),
            title: validate::non_empty("title", &book.title)?,
            author: validate::non_empty("author", &book.author)?,
            publisher: validate::optional_text(book.publisher.as_deref()),
            publication_year: book
                .publication_year
                .map(|y| validate::year_in_range("publication_year", y, Utc::now().year()))
                .transpose()?,
            genre: validate::optional_text(book.genre.as_deref()),
            total_copies: validate::non_negative_i32("total_copies", book.total_copies)?,
        };

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if let Some(isbn) = book.isbn.as_deref() {
                    ensure_isbn_free(uow, isbn, None).await?;
                }
                Ok(uow.insert_book(book).await?)
            })
        })
        .await
    }

    /// Updates catalog metadata. Copy counts belong to the lending ledger
    /// and are never written here.
    #[instrument(skip(storage, changes))]
    pub async fn update_book_details(
        storage: &dyn Storage,
        book_id: BookId,
        changes: UpdateBook,
    ) -> Result<Book, OperationError> {
        let changes = UpdateBook {
            isbn: changes.isbn,
            title: changes
                .title
                .as_deref()
                .map(|v| validate::non_empty("title", v))
                .transpose()?,
            author: changes
                .author
                .as_deref()
                .map(|v| validate::non_empty("author", v))
                .transpose()?,
            publisher: changes.publisher,
            publication_year: changes
                .publication_year
                .map(|y| validate::year_in_range("publication_year", y, Utc::now().year()))
                .transpose()?,
            genre: changes.genre,
        };

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                let Some(mut book) = uow.find_book(book_id).await? else {
                    return Err(OperationError::not_found("book", book_id));
                };

                if let Some(v) = changes.isbn {
                    book.isbn = validate::optional_text(Some(v.as_str()));
                }
                if let Some(v) = changes.title {
                    book.title = v;
                }
                if let Some(v) = changes.author {
                    book.author = v;
                }
                if let Some(v) = changes.publisher {
                    book.publisher = validate::optional_text(Some(v.as_str()));
                }
                if let Some(v) = changes.publication_year {
                    book.publication_year = Some(v);
                }
                if let Some(v) = changes.genre {
                    book.genre = validate::optional_text(Some(v.as_str()));
                }

                if let Some(isbn) = book.isbn.as_deref() {
                    ensure_isbn_free(uow, isbn, Some(book.id)).await?;
                }

                if uow.update_book_details(&book).await? == 0 {
                    return Err(OperationError::not_found("book", book_id));
                }

                Ok(book)
            })
        })
        .await
    }

    /// Removes a title. Fails with `Conflict` while any copy is still out;
    /// closed loans keep their book id as plain history.
    #[instrument(skip(storage))]
    pub async fn delete_book(storage: &dyn Storage, book_id: BookId) -> Result<(), OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                let Some(book) = uow.find_book(book_id).await? else {
                    return Err(OperationError::not_found("book", book_id));
                };
                let open = uow.open_loan_count_for_book(book_id).await?;
                if open > 0 {
                    return Err(OperationError::conflict(format!(
                        "'{}' has {open} open loan(s)",
                        book.title
                    )));
                }
                uow.delete_book(book_id).await?;
                Ok(())
            })
        })
        .await
    }

    /// Opens a loan and takes one copy, as a single atomic step.
    ///
    /// Availability is re-read under the transaction's row lock and the
    /// decrement is conditional on `available_copies > 0`, so two concurrent
    /// borrows of the last copy cannot both succeed.
    #[instrument(skip(storage))]
    pub async fn borrow_book(
        storage: &dyn Storage,
        book_id: BookId,
        student_id: StudentId,
        borrow_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Result<Loan, OperationError> {
        let today = Utc::now().date_naive();
        let borrow_date = validate::not_in_future("borrow_date", borrow_date, today)?;
        let due_date = validate::on_or_after("due_date", due_date, borrow_date, "borrow_date")?;

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if !uow.student_exists(student_id).await? {
                    return Err(OperationError::not_found("student", student_id));
                }
                let Some(book) = uow.find_book_for_update(book_id).await? else {
                    return Err(OperationError::not_found("book", book_id));
                };
                if book.available_copies <= 0 {
                    return Err(OperationError::unavailable(format!(
                        "no copies of '{}' available",
                        book.title
                    )));
                }

                let loan = uow
                    .insert_loan(NewLoan {
                        book_id,
                        student_id,
                        borrow_date,
                        due_date,
                    })
                    .await?;

                // With optimistic backends the pre-check above can go stale
                // before the write lands, so the decrement re-verifies it.
                if uow.take_book_copy(book_id).await? == 0 {
                    return Err(OperationError::unavailable(format!(
                        "no copies of '{}' available",
                        book.title
                    )));
                }

                Ok(loan)
            })
        })
        .await
    }

    /// Closes a loan: sets the return date, charges any overdue fine, and
    /// puts the copy back, all in one transaction.
    #[instrument(skip(storage, policy))]
    pub async fn return_book(
        storage: &dyn Storage,
        loan_id: LoanId,
        return_date: NaiveDate,
        policy: &LendingPolicy,
    ) -> Result<Loan, OperationError> {
        let today = Utc::now().date_naive();
        let return_date = validate::not_in_future("return_date", return_date, today)?;
        let fine_per_day = policy.fine_per_day;

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                let Some(loan) = uow.find_loan(loan_id).await? else {
                    return Err(OperationError::not_found("loan", loan_id));
                };
                if loan.return_date.is_some() {
                    return Err(OperationError::conflict(format!(
                        "loan {loan_id} is already returned"
                    )));
                }
                validate::on_or_after("return_date", return_date, loan.borrow_date, "borrow_date")?;

                let fine = loan.days_overdue(return_date) as f64 * fine_per_day;

                if uow.close_loan(loan_id, return_date, fine).await? == 0 {
                    return Err(OperationError::conflict(format!(
                        "loan {loan_id} is already returned"
                    )));
                }
                // A full shelf here means the ledger and the counter disagree;
                // failing rolls the close back rather than papering over it.
                if uow.put_book_copy(loan.book_id).await? == 0 {
                    return Err(OperationError::conflict(format!(
                        "book {} already has every copy back",
                        loan.book_id
                    )));
                }

                Ok(Loan {
                    return_date: Some(return_date),
                    fine,
                    ..loan
                })
            })
        })
        .await
    }

    /// Administrative removal of a ledger entry. Deliberately does not touch
    /// `available_copies`; undoing a borrow goes through
    /// [`return_book`](Self::return_book).
    #[instrument(skip(storage))]
    pub async fn delete_loan(storage: &dyn Storage, loan_id: LoanId) -> Result<(), OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if uow.delete_loan(loan_id).await? == 0 {
                    return Err(OperationError::not_found("loan", loan_id));
                }
                Ok(())
            })
        })
        .await
    }

    #[instrument(skip(storage))]
    pub async fn get_book(storage: &dyn Storage, book_id: BookId) -> Result<Book, OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                uow.find_book(book_id)
                    .await?
                    .ok_or_else(|| OperationError::not_found("book", book_id))
            })
        })
        .await
    }

    #[instrument(skip(storage))]
    pub async fn find_book_by_isbn(
        storage: &dyn Storage,
        isbn: &str,
    ) -> Result<Option<Book>, OperationError> {
        let isbn = validate::non_empty("isbn", isbn)?;
        run_atomic(storage, move |uow| {
            Box::pin(async move { Ok(uow.find_book_by_isbn(&isbn).await?) })
        })
        .await
    }

    #[instrument(skip(storage))]
    pub async fn get_loan(storage: &dyn Storage, loan_id: LoanId) -> Result<Loan, OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                uow.find_loan(loan_id)
                    .await?
                    .ok_or_else(|| OperationError::not_found("loan", loan_id))
            })
        })
        .await
    }

    #[instrument(skip(storage))]
    pub async fn open_loans_for_student(
        storage: &dyn Storage,
        student_id: StudentId,
    ) -> Result<Vec<Loan>, OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if !uow.student_exists(student_id).await? {
                    return Err(OperationError::not_found("student", student_id));
                }
                Ok(uow.open_loans_for_student(student_id).await?)
            })
        })
        .await
    }

    #[instrument(skip(storage))]
    pub async fn loans_for_book(
        storage: &dyn Storage,
        book_id: BookId,
    ) -> Result<Vec<Loan>, OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if uow.find_book(book_id).await?.is_none() {
                    return Err(OperationError::not_found("book", book_id));
                }
                Ok(uow.loans_for_book(book_id).await?)
            })
        })
        .await
    }
}
