//! Session and user level aggregation.

pub mod analytics;
pub mod insights;
pub mod session;
pub mod trend;
pub mod user;

pub use session::summarize;
pub use trend::{halves_trend, Trend};
pub use user::{gather_user_data, quick_insights, wellness_alerts, Alert, QuickInsight, Severity, UserData};
