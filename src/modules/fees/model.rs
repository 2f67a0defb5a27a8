pub use collegium_models::{Fee, FeeId, FeeStatus, NewFee};
