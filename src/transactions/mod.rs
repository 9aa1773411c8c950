pub mod transaction;

pub use transaction::{
    CSV_HEADER, DecodeError, Transaction, TransactionError, TransactionType, check_amount,
};
