//! Derived statistics
//!
//! Pure functions over the in-memory item list. Nothing here touches the
//! store; callers pass the items and "today".

pub mod dashboard;
pub mod expiration;

pub use dashboard::{
    bucket_by_expiration_window, compute_stats, monthly_aggregate, monthly_purchase_counts,
    monthly_spending, DashboardStats, DashboardSummary, ExpirationWindows, MonthlyAggregate, Trend,
};
pub use expiration::{
    classify_urgency, days_until, days_until_date, describe_days, parse_date, today, Urgency,
};
