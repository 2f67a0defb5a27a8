pub use collegium_models::{Course, CourseId, NewCourse};
