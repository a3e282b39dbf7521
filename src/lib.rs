//! # Reconciliation Core
//!
//! A bank account reconciliation library: users periodically certify that the
//! computed running balance of an account matches an externally known
//! bank-statement closing balance, and the system durably records that
//! checkpoint and locks the transactions it covers.
//!
//! ## Features
//!
//! - **Balance verification**: a checkpoint is only created when the declared
//!   closing balance equals the ledger's running balance as of the date
//! - **Monotonic checkpoint history**: per-account checkpoints are strictly
//!   ordered by date; only the newest may be removed (stack discipline)
//! - **Transaction locking**: covered transactions are stamped atomically
//!   with checkpoint creation and released atomically with removal
//! - **Storage abstraction**: database-agnostic design with trait-based
//!   storage and ledger seams
//! - **REST boundary**: an axum router exposing the inherited list / create /
//!   bulk-remove / fetch-transaction contract
//!
//! ## Quick Start
//!
//! ```no_run
//! use reconciliation_core::utils::MemoryStorage;
//! use reconciliation_core::{BankAccount, LedgerTransaction, ReconciliationEngine};
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() {
//!     let storage = MemoryStorage::new();
//!     storage.insert_account(BankAccount::new(
//!         "acc1".into(), "Checking".into(), "USD".into(), 0,
//!         NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     ));
//!     storage.insert_transaction(LedgerTransaction::new(
//!         "txn1".into(), "acc1".into(),
//!         NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
//!         10_000, "Deposit".into(),
//!     ));
//!
//!     let engine = ReconciliationEngine::new(storage.clone(), storage);
//!     let checkpoint = engine
//!         .reconcile("acc1", NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), 10_000)
//!         .await
//!         .unwrap();
//!     assert_eq!(checkpoint.computed_closing_balance, 10_000);
//! }
//! ```

pub mod api;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use reconciliation::*;
pub use traits::*;
pub use types::*;
