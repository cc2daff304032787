pub mod codes;
pub mod tx_check;

pub use codes::{CheckCode, CheckError, CheckSeverity, check_code_registry};
pub use tx_check::{TxCheckInput, TxCheckMetrics, check_transaction};
