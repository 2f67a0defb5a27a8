use std::env;

/// Library lending policy.
///
/// `fine_per_day` is the amount charged per whole day a returned book is past
/// its due date.
#[derive(Clone, Debug)]
pub struct LendingPolicy {
    pub fine_per_day: f64,
}

impl LendingPolicy {
    pub fn from_env() -> Self {
        Self {
            fine_per_day: env::var("COLLEGIUM_FINE_PER_DAY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5.0),
        }
    }
}
