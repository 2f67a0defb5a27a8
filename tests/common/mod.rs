use chrono::NaiveDate;
use uuid::Uuid;

use collegium::config::credentials::CredentialPolicy;
use collegium::modules::{CourseService, IdentityService, LibraryService, ProgramService};
use collegium::utils::password::BcryptHasher;
use collegium_models::{
    Book, Course, Faculty, NewBook, NewCourse, NewFaculty, NewRoleHolder, NewStudent, Profile,
    Program, Student,
};
use collegium_store::MemoryStorage;

/// Password used for every fixture account.
pub const TEST_PASSWORD: &str = "sesame1";

/// bcrypt's minimum cost factor, kept private by the bcrypt crate.
const MIN_COST: u32 = 4;

pub fn test_hasher() -> BcryptHasher {
    BcryptHasher::new(MIN_COST)
}

pub fn test_policy() -> CredentialPolicy {
    CredentialPolicy {
        min_password_len: 6,
        bcrypt_cost: MIN_COST,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn generate_unique_email() -> String {
    format!("test-{}@example.edu", Uuid::new_v4())
}

#[allow(dead_code)]
pub async fn create_program(storage: &MemoryStorage) -> Program {
    ProgramService::create_program(storage, &format!("Program {}", Uuid::new_v4()))
        .await
        .unwrap()
}

/// Creates a student with a unique email through the identity service, so
/// the account/profile pair exists exactly as production writes it.
#[allow(dead_code)]
pub async fn create_student(storage: &MemoryStorage, program: &Program) -> Student {
    let profile = IdentityService::create_role_holder(
        storage,
        &test_hasher(),
        &test_policy(),
        NewRoleHolder::Student(NewStudent {
            program_id: program.id,
            first_name: "Test".to_string(),
            last_name: "Student".to_string(),
            date_of_birth: date(2004, 5, 17),
            gender: None,
            email: generate_unique_email(),
            phone: None,
            address: None,
            enrollment_date: date(2022, 8, 1),
            major: None,
        }),
        TEST_PASSWORD,
    )
    .await
    .unwrap();

    match profile {
        Profile::Student(student) => student,
        other => panic!("expected a student profile, got {other:?}"),
    }
}

#[allow(dead_code)]
pub async fn create_faculty(storage: &MemoryStorage) -> Faculty {
    let profile = IdentityService::create_role_holder(
        storage,
        &test_hasher(),
        &test_policy(),
        NewRoleHolder::Faculty(NewFaculty {
            first_name: "Test".to_string(),
            last_name: "Faculty".to_string(),
            email: generate_unique_email(),
            phone: None,
            department: "Testing".to_string(),
        }),
        TEST_PASSWORD,
    )
    .await
    .unwrap();

    match profile {
        Profile::Faculty(faculty) => faculty,
        other => panic!("expected a faculty profile, got {other:?}"),
    }
}

#[allow(dead_code)]
pub async fn create_course(storage: &MemoryStorage, program: &Program) -> Course {
    let tag = Uuid::new_v4().simple().to_string();
    CourseService::create_course(
        storage,
        NewCourse {
            program_id: program.id,
            semester: 1,
            code: format!("TST-{}", &tag[..8]),
            name: format!("Test Course {}", &tag[..8]),
            credits: 3,
            description: None,
            department: None,
        },
    )
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn add_book(storage: &MemoryStorage, total_copies: i32) -> Book {
    LibraryService::add_book(
        storage,
        NewBook {
            isbn: Some(format!("isbn-{}", Uuid::new_v4())),
            title: "A Study in Scarlet".to_string(),
            author: "Arthur Conan Doyle".to_string(),
            publisher: None,
            publication_year: Some(1887),
            genre: Some("Mystery".to_string()),
            total_copies,
        },
    )
    .await
    .unwrap()
}
