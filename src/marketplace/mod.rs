// Marketplace module - per-unit profit after marketplace fees

pub mod fees;
pub mod margin;

pub use fees::{builtin_schedules, FeeSchedule};
pub use margin::{
    compute_margin, compute_margin_with_threshold, MarketplaceMargin, DEFAULT_FIXED_FEE_THRESHOLD,
};
