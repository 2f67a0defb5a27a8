pub use collegium_models::{AttendanceId, AttendanceRecord, AttendanceStatus, NewAttendance};
