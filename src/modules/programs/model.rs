pub use collegium_models::{Program, ProgramId};
