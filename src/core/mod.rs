mod debt;
mod txn;

pub use debt::Debt;
pub use txn::{Origin, Status, Transaction, MANUAL, UNKNOWN};
