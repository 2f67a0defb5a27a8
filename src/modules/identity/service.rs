use chrono::Utc;
use tracing::instrument;

use collegium_core::{OperationError, validate};
use collegium_models::{
    Account, NewAccount, NewFaculty, NewLibrarian, NewRoleHolder, NewStudent, Profile,
    ProfileRef, Role, Student, StudentId, UpdateStudent,
};
use collegium_store::{Storage, run_atomic};

use crate::config::credentials::CredentialPolicy;
use crate::guards::ensure_username_free;
use crate::utils::password::CredentialHasher;

pub struct IdentityService;

impl IdentityService {
    /// Creates an account and its role profile as one unit.
    ///
    /// The profile's email doubles as the account username. Any failure after
    /// the account insert rolls the whole pair back, so a rejected profile
    /// never leaves an orphan account behind.
    #[instrument(skip(storage, hasher, policy, holder, password))]
    pub async fn create_role_holder(
        storage: &dyn Storage,
        hasher: &dyn CredentialHasher,
        policy: &CredentialPolicy,
        holder: NewRoleHolder,
        password: &str,
    ) -> Result<Profile, OperationError> {
        let holder = validated_role_holder(holder)?;
        validate::min_len("password", password, policy.min_password_len)?;

        let role = holder.role();
        let username = holder.email().to_string();
        let password_hash = hasher.hash(password)?;

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                ensure_username_free(uow, &username, None).await?;

                let account = uow
                    .insert_account(NewAccount {
                        username,
                        password_hash,
                        role,
                    })
                    .await?;

                let profile = match holder {
                    NewRoleHolder::Student(profile) => {
                        if !uow.program_exists(profile.program_id).await? {
                            return Err(OperationError::not_found(
                                "program",
                                profile.program_id,
                            ));
                        }
                        Profile::Student(uow.insert_student(account.id, profile).await?)
                    }
                    NewRoleHolder::Faculty(profile) => {
                        Profile::Faculty(uow.insert_faculty(account.id, profile).await?)
                    }
                    NewRoleHolder::Librarian(profile) => {
                        Profile::Librarian(uow.insert_librarian(account.id, profile).await?)
                    }
                };

                Ok(profile)
            })
        })
        .await
    }

    /// Creates a bare admin account. Admins carry no profile row.
    #[instrument(skip(storage, hasher, policy, password))]
    pub async fn create_admin_account(
        storage: &dyn Storage,
        hasher: &dyn CredentialHasher,
        policy: &CredentialPolicy,
        username: &str,
        password: &str,
    ) -> Result<Account, OperationError> {
        let username = validate::non_empty("username", username)?;
        validate::min_len("password", password, policy.min_password_len)?;
        let password_hash = hasher.hash(password)?;

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                ensure_username_free(uow, &username, None).await?;
                Ok(uow
                    .insert_account(NewAccount {
                        username,
                        password_hash,
                        role: Role::Admin,
                    })
                    .await?)
            })
        })
        .await
    }

    /// Updates a student's non-key profile fields.
    ///
    /// A changed email renames the linked account in the same transaction,
    /// re-checking username uniqueness while excluding the student's own
    /// account row.
    #[instrument(skip(storage, changes))]
    pub async fn update_student(
        storage: &dyn Storage,
        student_id: StudentId,
        changes: UpdateStudent,
    ) -> Result<Student, OperationError> {
        let today = Utc::now().date_naive();
        let changes = UpdateStudent {
            first_name: changes
                .first_name
                .as_deref()
                .map(|v| validate::non_empty("first_name", v))
                .transpose()?,
            last_name: changes
                .last_name
                .as_deref()
                .map(|v| validate::non_empty("last_name", v))
                .transpose()?,
            date_of_birth: changes
                .date_of_birth
                .map(|d| validate::not_in_future("date_of_birth", d, today))
                .transpose()?,
            email: changes
                .email
                .as_deref()
                .map(|v| validate::email("email", v))
                .transpose()?,
            gender: changes.gender,
            phone: changes.phone,
            address: changes.address,
            major: changes.major,
        };

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                let Some(mut student) = uow.find_student(student_id).await? else {
                    return Err(OperationError::not_found("student", student_id));
                };

                let email_changed = changes
                    .email
                    .as_ref()
                    .is_some_and(|email| *email != student.email);

                if let Some(v) = changes.first_name {
                    student.first_name = v;
                }
                if let Some(v) = changes.last_name {
                    student.last_name = v;
                }
                if let Some(v) = changes.date_of_birth {
                    student.date_of_birth = v;
                }
                if let Some(v) = changes.gender {
                    student.gender = validate::optional_text(Some(v.as_str()));
                }
                if let Some(v) = changes.email {
                    student.email = v;
                }
                if let Some(v) = changes.phone {
                    student.phone = validate::optional_text(Some(v.as_str()));
                }
                if let Some(v) = changes.address {
                    student.address = validate::optional_text(Some(v.as_str()));
                }
                if let Some(v) = changes.major {
                    student.major = validate::optional_text(Some(v.as_str()));
                }

                validate::on_or_after(
                    "enrollment_date",
                    student.enrollment_date,
                    student.date_of_birth,
                    "date_of_birth",
                )?;

                if email_changed {
                    ensure_username_free(uow, &student.email, Some(student.account_id)).await?;
                    uow.rename_account(student.account_id, &student.email).await?;
                }

                if uow.update_student_profile(&student).await? == 0 {
                    return Err(OperationError::not_found("student", student_id));
                }

                Ok(student)
            })
        })
        .await
    }

    /// Deletes a profile and its account together.
    ///
    /// The profile lookup runs before either delete, so an unknown reference
    /// reports `NotFound` without touching anything.
    #[instrument(skip(storage))]
    pub async fn delete_role_holder(
        storage: &dyn Storage,
        profile: ProfileRef,
    ) -> Result<(), OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                match profile {
                    ProfileRef::Student(id) => {
                        let Some(student) = uow.find_student(id).await? else {
                            return Err(OperationError::not_found("student", id));
                        };
                        uow.delete_student(id).await?;
                        uow.delete_account(student.account_id).await?;
                    }
                    ProfileRef::Faculty(id) => {
                        let Some(faculty) = uow.find_faculty(id).await? else {
                            return Err(OperationError::not_found("faculty", id));
                        };
                        uow.delete_faculty(id).await?;
                        uow.delete_account(faculty.account_id).await?;
                    }
                    ProfileRef::Librarian(id) => {
                        let Some(librarian) = uow.find_librarian(id).await? else {
                            return Err(OperationError::not_found("librarian", id));
                        };
                        uow.delete_librarian(id).await?;
                        uow.delete_account(librarian.account_id).await?;
                    }
                }
                Ok(())
            })
        })
        .await
    }

    /// Checks a username/password pair against the stored credential.
    ///
    /// Returns `Ok(None)` for an unknown username, a wrong password, or a
    /// role tag that does not match; the caller decides how to report that.
    #[instrument(skip(storage, hasher, password))]
    pub async fn verify_credentials(
        storage: &dyn Storage,
        hasher: &dyn CredentialHasher,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<Option<Account>, OperationError> {
        let username = validate::non_empty("username", username)?;

        let account = run_atomic(storage, move |uow| {
            Box::pin(async move { Ok(uow.find_account_by_username(&username).await?) })
        })
        .await?;

        let Some(account) = account else {
            return Ok(None);
        };
        if account.role != role {
            return Ok(None);
        }
        if !hasher.verify(password, &account.password_hash)? {
            return Ok(None);
        }

        Ok(Some(account))
    }

    #[instrument(skip(storage))]
    pub async fn find_account(
        storage: &dyn Storage,
        username: &str,
    ) -> Result<Option<Account>, OperationError> {
        let username = username.to_string();
        run_atomic(storage, move |uow| {
            Box::pin(async move { Ok(uow.find_account_by_username(&username).await?) })
        })
        .await
    }

    #[instrument(skip(storage))]
    pub async fn get_student(
        storage: &dyn Storage,
        student_id: StudentId,
    ) -> Result<Student, OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                uow.find_student(student_id)
                    .await?
                    .ok_or_else(|| OperationError::not_found("student", student_id))
            })
        })
        .await
    }
}

/// Normalizes and validates the profile fields of a new role holder.
fn validated_role_holder(holder: NewRoleHolder) -> Result<NewRoleHolder, OperationError> {
    let today = Utc::now().date_naive();
    Ok(match holder {
        NewRoleHolder::Student(p) => NewRoleHolder::Student(NewStudent {
            program_id: p.program_id,
            first_name: validate::non_empty("first_name", &p.first_name)?,
            last_name: validate::non_empty("last_name", &p.last_name)?,
            date_of_birth: validate::not_in_future("date_of_birth", p.date_of_birth, today)?,
            gender: validate::optional_text(p.gender.as_deref()),
            email: validate::email("email", &p.email)?,
            phone: validate::optional_text(p.phone.as_deref()),
            address: validate::optional_text(p.address.as_deref()),
            enrollment_date: validate::on_or_after(
                "enrollment_date",
                p.enrollment_date,
                p.date_of_birth,
                "date_of_birth",
            )?,
            major: validate::optional_text(p.major.as_deref()),
        }),
        NewRoleHolder::Faculty(p) => NewRoleHolder::Faculty(NewFaculty {
            first_name: validate::non_empty("first_name", &p.first_name)?,
            last_name: validate::non_empty("last_name", &p.last_name)?,
            email: validate::email("email", &p.email)?,
            phone: validate::optional_text(p.phone.as_deref()),
            department: validate::non_empty("department", &p.department)?,
        }),
        NewRoleHolder::Librarian(p) => NewRoleHolder::Librarian(NewLibrarian {
            first_name: validate::non_empty("first_name", &p.first_name)?,
            last_name: validate::non_empty("last_name", &p.last_name)?,
            email: validate::email("email", &p.email)?,
            phone: validate::optional_text(p.phone.as_deref()),
        }),
    })
}
