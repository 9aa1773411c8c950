pub mod monthly_report;

pub use monthly_report::{CategorySummary, MonthlyReport};
