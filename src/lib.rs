// Equipment Checkout System - Core Library
// Checkout/return state machine with an append-only transaction ledger.
// Exposes the coordinator plus the store/report collaborators for CLI,
// web frontends, and tests.

pub mod error;
pub mod tool;
pub mod transaction;
pub mod session;
pub mod checkout;
pub mod store;
pub mod report;

// Re-export commonly used types
pub use error::CheckoutError;
pub use tool::{Tool, ToolCatalog, ToolCondition, ToolStatus};
pub use transaction::{TransactionKind, TransactionLedger, TransactionRecord};
pub use session::{Authenticator, Employee, Session};
pub use checkout::CheckoutSystem;
pub use store::{
    hash_secret, load_tools, load_tools_csv, seed_sample_data, setup_database,
    SqliteAuthenticator,
};
pub use report::{
    export_json, CheckoutActivityReport, EmployeeUsageReport, ToolStatusReport,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
