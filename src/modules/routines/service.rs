use tracing::instrument;

use collegium_core::{OperationError, validate};
use collegium_models::{NewRoutine, Routine, RoutineId};
use collegium_store::{Storage, run_atomic};

use crate::modules::courses::service::SEMESTER_RANGE;

pub struct RoutineService;

impl RoutineService {
    /// Places a class or exam slot on the timetable. The course (and the
    /// faculty member, when one is assigned) are resolved in the same
    /// transaction as the insert.
    #[instrument(skip(storage, routine))]
    pub async fn schedule_routine(
        storage: &dyn Storage,
        routine: NewRoutine,
    ) -> Result<Routine, OperationError> {
        validate::starts_before("start_time", routine.start_time, routine.end_time)?;
        let routine = NewRoutine {
            course_id: routine.course_id,
            faculty_id: routine.faculty_id,
            kind: routine.kind,
            day_of_week: validate::non_empty("day_of_week", &routine.day_of_week)?,
            start_time: routine.start_time,
            end_time: routine.end_time,
            room: validate::non_empty("room", &routine.room)?,
            academic_year: validate::non_empty("academic_year", &routine.academic_year)?,
            semester: validate::in_range(
                "semester",
                routine.semester,
                SEMESTER_RANGE.0,
                SEMESTER_RANGE.1,
            )?,
        };

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                if !uow.course_exists(routine.course_id).await? {
                    return Err(OperationError::not_found("course", routine.course_id));
                }
                if let Some(faculty_id) = routine.faculty_id {
                    if !uow.faculty_exists(faculty_id).await? {
                        return Err(OperationError::not_found("faculty", faculty_id));
                    }
                }
                Ok(uow.insert_routine(routine).await?)
            })
        })
        .await
    }

    #[instrument(skip(storage))]
    pub async fn get_routine(
        storage: &dyn Storage,
        routine_id: RoutineId,
    ) -> Result<Routine, OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                uow.find_routine(routine_id)
                    .await?
                    .ok_or_else(|| OperationError::not_found("routine", routine_id))
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use collegium_models::{
        CourseId, FacultyId, NewAccount, NewCourse, NewFaculty, Role, RoutineKind,
    };
    use collegium_store::MemoryStorage;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    async fn seed(storage: &MemoryStorage) -> (CourseId, FacultyId) {
        let mut uow = storage.begin().await.unwrap();
        let program = uow.insert_program("Chemistry BSc").await.unwrap();
        let course = uow
            .insert_course(NewCourse {
                program_id: program.id,
                semester: 2,
                code: "CHM204".to_string(),
                name: "Organic Chemistry".to_string(),
                credits: 3,
                description: None,
                department: None,
            })
            .await
            .unwrap();
        let account = uow
            .insert_account(NewAccount {
                username: "priya.nair@example.edu".to_string(),
                password_hash: "x".to_string(),
                role: Role::Faculty,
            })
            .await
            .unwrap();
        let faculty = uow
            .insert_faculty(
                account.id,
                NewFaculty {
                    first_name: "Priya".to_string(),
                    last_name: "Nair".to_string(),
                    email: "priya.nair@example.edu".to_string(),
                    phone: None,
                    department: "Chemistry".to_string(),
                },
            )
            .await
            .unwrap();
        uow.commit().await.unwrap();
        (course.id, faculty.id)
    }

    fn slot(course_id: CourseId, faculty_id: Option<FacultyId>) -> NewRoutine {
        NewRoutine {
            course_id,
            faculty_id,
            kind: RoutineKind::Class,
            day_of_week: "Tuesday".to_string(),
            start_time: time(9, 0),
            end_time: time(10, 30),
            room: "B-204".to_string(),
            academic_year: "2026-2027".to_string(),
            semester: 2,
        }
    }

    #[tokio::test]
    async fn test_schedule_routine_resolves_refs() {
        let storage = MemoryStorage::new();
        let (course_id, faculty_id) = seed(&storage).await;

        let routine = RoutineService::schedule_routine(&storage, slot(course_id, Some(faculty_id)))
            .await
            .unwrap();
        assert_eq!(routine.kind, RoutineKind::Class);
        assert_eq!(
            RoutineService::get_routine(&storage, routine.id).await.unwrap().room,
            "B-204"
        );

        // Faculty is optional.
        RoutineService::schedule_routine(&storage, slot(course_id, None)).await.unwrap();

        let err = RoutineService::schedule_routine(&storage, slot(CourseId::new(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::NotFound { entity: "course", .. }));

        let err =
            RoutineService::schedule_routine(&storage, slot(course_id, Some(FacultyId::new())))
                .await
                .unwrap_err();
        assert!(matches!(err, OperationError::NotFound { entity: "faculty", .. }));
    }

    #[tokio::test]
    async fn test_schedule_routine_validates_slot() {
        let storage = MemoryStorage::new();
        let (course_id, _) = seed(&storage).await;

        let mut backwards = slot(course_id, None);
        backwards.start_time = time(11, 0);
        backwards.end_time = time(9, 0);
        let err = RoutineService::schedule_routine(&storage, backwards).await.unwrap_err();
        assert!(matches!(err, OperationError::Validation(v) if v.field == "start_time"));

        let mut bad_semester = slot(course_id, None);
        bad_semester.semester = 9;
        let err = RoutineService::schedule_routine(&storage, bad_semester).await.unwrap_err();
        assert!(matches!(err, OperationError::Validation(v) if v.field == "semester"));

        let mut no_room = slot(course_id, None);
        no_room.room = " ".to_string();
        let err = RoutineService::schedule_routine(&storage, no_room).await.unwrap_err();
        assert!(matches!(err, OperationError::Validation(v) if v.field == "room"));
    }

    #[tokio::test]
    async fn test_unknown_routine_is_not_found() {
        let storage = MemoryStorage::new();

        let err = RoutineService::get_routine(&storage, RoutineId::new()).await.unwrap_err();
        assert!(matches!(err, OperationError::NotFound { entity: "routine", .. }));
    }
}
