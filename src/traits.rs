//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::*;
use crate::utils::validation;

/// Read-only view of the ledger owned by the broader accounting engine.
///
/// `running_balance` must be a pure, deterministic function of persisted
/// transaction state at call time. The reconciliation engine treats any error
/// from this trait as a transient failure and aborts the whole attempt
/// without partial writes.
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    /// Get a bank account by ID
    async fn get_account(&self, bank_account_id: &str) -> ReconcileResult<Option<BankAccount>>;

    /// Opening balance plus the sum of all transaction amounts for the
    /// account with `date <= as_of`, in signed cents
    async fn running_balance(
        &self,
        bank_account_id: &str,
        as_of: NaiveDate,
    ) -> ReconcileResult<i64>;

    /// Get a ledger transaction by ID
    async fn get_transaction(
        &self,
        transaction_id: &str,
    ) -> ReconcileResult<Option<LedgerTransaction>>;
}

/// Durable storage for reconciliation checkpoints.
///
/// This trait allows the reconciliation core to work with any storage backend
/// (PostgreSQL, MySQL, SQLite, in-memory, etc.) by implementing these
/// methods. `commit_checkpoint` and `retract_checkpoint` are the two atomic
/// units of work in the system: each must apply the checkpoint row change and
/// the transaction stamp changes all-or-nothing, so that a failure (or a
/// cancelled request) never leaves a checkpoint without its locks or locks
/// without their checkpoint.
#[async_trait]
pub trait ReconciliationStore: Send + Sync {
    /// The checkpoint with the highest date for the account, if any
    async fn latest_checkpoint(
        &self,
        bank_account_id: &str,
    ) -> ReconcileResult<Option<ReconciliationCheckpoint>>;

    /// Get a checkpoint by ID
    async fn get_checkpoint(
        &self,
        checkpoint_id: &str,
    ) -> ReconcileResult<Option<ReconciliationCheckpoint>>;

    /// List checkpoints for an account with sorting and optional pagination
    async fn list_checkpoints(
        &self,
        bank_account_id: &str,
        query: &CheckpointQuery,
    ) -> ReconcileResult<CheckpointPage>;

    /// Atomically insert the checkpoint and stamp every unreconciled
    /// transaction of its account with `date <= checkpoint.date`.
    /// Returns the number of transactions locked.
    async fn commit_checkpoint(
        &self,
        checkpoint: &ReconciliationCheckpoint,
    ) -> ReconcileResult<usize>;

    /// Atomically delete the checkpoint and clear the stamp from every
    /// transaction it covered. Returns the number of transactions released.
    async fn retract_checkpoint(&self, checkpoint_id: &str) -> ReconcileResult<usize>;
}

/// Trait for implementing custom checkpoint request validation rules
pub trait CheckpointValidator: Send + Sync {
    /// Validate a reconcile request before it touches the ledger or the store
    fn validate_request(
        &self,
        bank_account_id: &str,
        date: NaiveDate,
        today: NaiveDate,
    ) -> ReconcileResult<()>;
}

/// Default checkpoint validator: well-formed account id, statement date not
/// in the future relative to the server clock
pub struct DefaultCheckpointValidator;

impl CheckpointValidator for DefaultCheckpointValidator {
    fn validate_request(
        &self,
        bank_account_id: &str,
        date: NaiveDate,
        today: NaiveDate,
    ) -> ReconcileResult<()> {
        validation::validate_bank_account_id(bank_account_id)?;
        validation::validate_statement_date(date, today)?;
        Ok(())
    }
}
