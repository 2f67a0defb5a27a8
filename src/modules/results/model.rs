pub use collegium_models::{NewResult, ResultId, ResultRecord, ResultStatus};
