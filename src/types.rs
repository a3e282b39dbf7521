//! Core types and data structures for the reconciliation system

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bank account as known to the broader accounting system.
///
/// Accounts are owned by the account-management subsystem and are read-only
/// inside the reconciliation core; they are carried here so the engine can
/// verify that a checkpoint targets a live account and anchor the first
/// checkpoint's interval at the opening date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    /// Unique identifier for the account
    pub id: String,
    /// Human-readable account name
    pub name: String,
    /// ISO currency code (e.g. "INR", "USD")
    pub currency: String,
    /// Balance at the opening date, in signed cents
    pub opening_balance: i64,
    /// Date the account was opened
    pub opened_on: NaiveDate,
    /// Archived accounts cannot be reconciled
    pub archived: bool,
}

impl BankAccount {
    /// Create a new active bank account
    pub fn new(
        id: String,
        name: String,
        currency: String,
        opening_balance: i64,
        opened_on: NaiveDate,
    ) -> Self {
        Self {
            id,
            name,
            currency,
            opening_balance,
            opened_on,
            archived: false,
        }
    }
}

/// A single ledger transaction against a bank account.
///
/// Amounts are signed integer cents: deposits positive, withdrawals negative.
/// The reconciliation core only ever toggles `reconciled` and
/// `reconciled_checkpoint_id`; every other field belongs to the
/// transaction-entry subsystem, which in turn must refuse edits once
/// `reconciled` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTransaction {
    /// Unique identifier for the transaction
    pub id: String,
    /// Account the transaction belongs to
    pub bank_account_id: String,
    /// Date the transaction occurred
    pub date: NaiveDate,
    /// Signed amount in cents
    pub amount: i64,
    /// Description of the transaction
    pub description: String,
    /// Whether a checkpoint covers (and locks) this transaction
    pub reconciled: bool,
    /// The covering checkpoint, when reconciled
    pub reconciled_checkpoint_id: Option<String>,
    /// When the transaction was created
    pub created_at: NaiveDateTime,
    /// When the transaction was last updated
    pub updated_at: NaiveDateTime,
}

impl LedgerTransaction {
    /// Create a new, unreconciled transaction
    pub fn new(
        id: String,
        bank_account_id: String,
        date: NaiveDate,
        amount: i64,
        description: String,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            bank_account_id,
            date,
            amount,
            description,
            reconciled: false,
            reconciled_checkpoint_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the transaction as covered by a checkpoint
    pub fn stamp(&mut self, checkpoint_id: &str) {
        self.reconciled = true;
        self.reconciled_checkpoint_id = Some(checkpoint_id.to_string());
        self.updated_at = chrono::Utc::now().naive_utc();
    }

    /// Clear the checkpoint stamp, unlocking the transaction
    pub fn release(&mut self) {
        self.reconciled = false;
        self.reconciled_checkpoint_id = None;
        self.updated_at = chrono::Utc::now().naive_utc();
    }
}

/// A reconciliation checkpoint: the durable record that an account's running
/// balance matched the bank statement as of a date.
///
/// Checkpoints are append-only. The single allowed mutation of the history is
/// removing the newest checkpoint of an account (see the engine's
/// `unreconcile`); a checkpoint row itself is never updated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationCheckpoint {
    /// Unique identifier, generated on creation
    pub id: String,
    /// Account the checkpoint certifies
    pub bank_account_id: String,
    /// Statement date being certified
    pub date: NaiveDate,
    /// Closing balance as entered by the user, in signed cents
    pub declared_closing_balance: i64,
    /// Closing balance computed from the ledger at validation time, kept for audit
    pub computed_closing_balance: i64,
    /// Human-readable interval since the previous checkpoint, e.g. "1 Month"
    pub duration_since_last: String,
    /// When the checkpoint was created
    pub created_at: NaiveDateTime,
}

impl ReconciliationCheckpoint {
    /// Create a new checkpoint with a generated id
    pub fn new(
        bank_account_id: String,
        date: NaiveDate,
        declared_closing_balance: i64,
        computed_closing_balance: i64,
        duration_since_last: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            bank_account_id,
            date,
            declared_closing_balance,
            computed_closing_balance,
            duration_since_last,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Sort direction for checkpoint listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Columns a checkpoint listing may be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckpointSortColumn {
    Date,
    CreatedAt,
    ClosingBalance,
}

/// Paging and ordering parameters for checkpoint listings.
///
/// `page_no` is 1-based, matching the inherited UI contract. Setting
/// `paginate` to false returns every checkpoint of the account in one page;
/// callers must not mutate state based on such a read racing a concurrent
/// write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointQuery {
    pub page_no: u32,
    pub page_size: u32,
    pub sort_column: CheckpointSortColumn,
    pub sort_order: SortOrder,
    pub paginate: bool,
}

impl Default for CheckpointQuery {
    fn default() -> Self {
        Self {
            page_no: 1,
            page_size: 25,
            sort_column: CheckpointSortColumn::Date,
            sort_order: SortOrder::Asc,
            paginate: true,
        }
    }
}

/// One page of checkpoints plus the total count across all pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointPage {
    pub items: Vec<ReconciliationCheckpoint>,
    pub total_count: u64,
}

/// Errors that can occur in the reconciliation system
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Bank account not found: {0}")]
    AccountNotFound(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("Reconciliation checkpoint not found: {0}")]
    CheckpointNotFound(String),
    #[error(
        "Balance mismatch: statement shows {declared} cents but the ledger computes {computed} cents"
    )]
    BalanceMismatch { declared: i64, computed: i64 },
    #[error("Checkpoint date {date} does not follow the latest checkpoint dated {latest}")]
    OutOfOrderCheckpoint { date: NaiveDate, latest: NaiveDate },
    #[error("Checkpoint {0} is not the newest for its account and cannot be removed")]
    NotNewestCheckpoint(String),
}

impl ReconcileError {
    /// Transient failures left no partial writes and are safe to retry
    pub fn is_transient(&self) -> bool {
        matches!(self, ReconcileError::Storage(_))
    }

    /// Business-rule rejections: the user must supply a corrected value,
    /// retrying with the same input always fails again
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ReconcileError::BalanceMismatch { .. }
                | ReconcileError::OutOfOrderCheckpoint { .. }
                | ReconcileError::NotNewestCheckpoint(_)
        )
    }
}

/// Result type for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;
