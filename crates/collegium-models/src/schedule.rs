//! Routine (timetable) models.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::ids::{CourseId, FacultyId, RoutineId};
use crate::status::RoutineKind;

/// A scheduled class or exam slot for a course.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Routine {
    pub id: RoutineId,
    pub course_id: CourseId,
    pub faculty_id: Option<FacultyId>,
    pub kind: RoutineKind,
    pub day_of_week: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: String,
    pub academic_year: String,
    pub semester: i32,
}

/// Insert record for a routine slot.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRoutine {
    pub course_id: CourseId,
    pub faculty_id: Option<FacultyId>,
    pub kind: RoutineKind,
    pub day_of_week: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: String,
    pub academic_year: String,
    pub semester: i32,
}
