pub mod assignments;
pub mod attendance;
pub mod courses;
pub mod enrollment;
pub mod fees;
pub mod identity;
pub mod library;
pub mod programs;
pub mod results;
pub mod routines;

pub use self::assignments::service::AssignmentService;
pub use self::attendance::service::AttendanceService;
pub use self::courses::service::CourseService;
pub use self::enrollment::service::EnrollmentService;
pub use self::fees::service::FeeService;
pub use self::identity::service::IdentityService;
pub use self::library::service::LibraryService;
pub use self::programs::service::ProgramService;
pub use self::results::service::ResultService;
pub use self::routines::service::RoutineService;
