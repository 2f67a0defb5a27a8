mod common;

use collegium::modules::IdentityService;
use collegium_core::OperationError;
use collegium_models::{
    NewFaculty, NewRoleHolder, NewStudent, ProfileRef, ProgramId, Role, UpdateStudent,
};
use collegium_store::MemoryStorage;
use common::{
    TEST_PASSWORD, create_program, create_student, date, generate_unique_email, test_hasher,
    test_policy,
};

#[tokio::test]
async fn test_failed_student_create_leaves_no_account_behind() {
    let storage = MemoryStorage::new();
    let email = generate_unique_email();

    // The account insert succeeds inside the transaction; the profile insert
    // then fails on the unknown program and must take the account with it.
    let err = IdentityService::create_role_holder(
        &storage,
        &test_hasher(),
        &test_policy(),
        NewRoleHolder::Student(NewStudent {
            program_id: ProgramId::new(),
            first_name: "Ines".to_string(),
            last_name: "Marlow".to_string(),
            date_of_birth: date(2004, 5, 17),
            gender: None,
            email: email.clone(),
            phone: None,
            address: None,
            enrollment_date: date(2022, 8, 1),
            major: None,
        }),
        TEST_PASSWORD,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, OperationError::NotFound { entity: "program", .. }));

    let account = IdentityService::find_account(&storage, &email).await.unwrap();
    assert!(account.is_none(), "rolled-back create left an orphan account");
}

#[tokio::test]
async fn test_duplicate_username_keeps_original_account_unchanged() {
    let storage = MemoryStorage::new();
    let faculty = common::create_faculty(&storage).await;

    let err = IdentityService::create_role_holder(
        &storage,
        &test_hasher(),
        &test_policy(),
        NewRoleHolder::Faculty(NewFaculty {
            first_name: "Another".to_string(),
            last_name: "Person".to_string(),
            email: faculty.email.clone(),
            phone: None,
            department: "Testing".to_string(),
        }),
        TEST_PASSWORD,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, OperationError::Conflict(_)));

    let account = IdentityService::find_account(&storage, &faculty.email)
        .await
        .unwrap()
        .expect("original account must survive the rejected duplicate");
    assert_eq!(account.id, faculty.account_id);
    assert_eq!(account.role, Role::Faculty);
}

#[tokio::test]
async fn test_delete_role_holder_removes_account_and_profile_together() {
    let storage = MemoryStorage::new();
    let program = create_program(&storage).await;
    let student = create_student(&storage, &program).await;

    IdentityService::delete_role_holder(&storage, ProfileRef::Student(student.id))
        .await
        .unwrap();

    let err = IdentityService::get_student(&storage, student.id).await.unwrap_err();
    assert!(matches!(err, OperationError::NotFound { .. }));
    assert!(
        IdentityService::find_account(&storage, &student.email)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_admin_accounts_carry_the_admin_role_only() {
    let storage = MemoryStorage::new();
    IdentityService::create_admin_account(
        &storage,
        &test_hasher(),
        &test_policy(),
        "registrar",
        TEST_PASSWORD,
    )
    .await
    .unwrap();

    let admin = IdentityService::verify_credentials(
        &storage,
        &test_hasher(),
        "registrar",
        TEST_PASSWORD,
        Role::Admin,
    )
    .await
    .unwrap();
    assert!(admin.is_some());

    // The same credential never authenticates under another role tag.
    let as_student = IdentityService::verify_credentials(
        &storage,
        &test_hasher(),
        "registrar",
        TEST_PASSWORD,
        Role::Student,
    )
    .await
    .unwrap();
    assert!(as_student.is_none());
}

#[tokio::test]
async fn test_email_change_moves_the_login_username() {
    let storage = MemoryStorage::new();
    let program = create_program(&storage).await;
    let student = create_student(&storage, &program).await;
    let old_email = student.email.clone();
    let new_email = generate_unique_email();

    IdentityService::update_student(
        &storage,
        student.id,
        UpdateStudent {
            email: Some(new_email.clone()),
            ..UpdateStudent::default()
        },
    )
    .await
    .unwrap();

    let verified = IdentityService::verify_credentials(
        &storage,
        &test_hasher(),
        &new_email,
        TEST_PASSWORD,
        Role::Student,
    )
    .await
    .unwrap();
    assert!(verified.is_some(), "renamed account must keep its credential");

    let stale = IdentityService::verify_credentials(
        &storage,
        &test_hasher(),
        &old_email,
        TEST_PASSWORD,
        Role::Student,
    )
    .await
    .unwrap();
    assert!(stale.is_none(), "old username must stop resolving");
}
