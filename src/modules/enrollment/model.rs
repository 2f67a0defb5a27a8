pub use collegium_models::{Enrollment, EnrollmentId, NewEnrollment};
