pub use collegium_models::{NewRoutine, Routine, RoutineId, RoutineKind};
