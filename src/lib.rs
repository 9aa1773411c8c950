pub mod clock;
pub mod config;
pub mod ledger;
pub mod orchestrator;
pub mod reports;
pub mod transactions;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use ledger::{Ledger, LedgerError, TransactionEdit};
pub use orchestrator::run;
pub use reports::{CategorySummary, MonthlyReport};
pub use transactions::{DecodeError, Transaction, TransactionError, TransactionType};
