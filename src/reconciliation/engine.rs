//! Reconciliation engine orchestrating checkpoint creation and removal

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use chrono::NaiveDate;
use tokio::sync::Mutex as AsyncMutex;

use crate::reconciliation::interval;
use crate::traits::*;
use crate::types::*;

/// Outcome of a bulk checkpoint removal.
///
/// Removal proceeds newest-first and stops at the first failure; each
/// individual removal is atomic but the set as a whole is not.
#[derive(Debug)]
pub struct BulkRemoval {
    /// Checkpoints removed before the operation stopped
    pub removed: Vec<String>,
    /// The removal that stopped the operation, if any
    pub failed: Option<BulkRemovalFailure>,
}

/// A single failed removal inside a bulk operation
#[derive(Debug)]
pub struct BulkRemovalFailure {
    pub checkpoint_id: String,
    pub error: ReconcileError,
}

/// Engine coordinating balance verification, checkpoint persistence, and
/// transaction locking.
///
/// Checkpoint creation and removal are serialized per bank account so that
/// two concurrent calls can never both pass the latest-checkpoint check
/// against a stale read; different accounts proceed fully in parallel.
pub struct ReconciliationEngine<L, S> {
    ledger: L,
    store: S,
    validator: Box<dyn CheckpointValidator>,
    account_locks: StdMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl<L: LedgerQuery, S: ReconciliationStore> ReconciliationEngine<L, S> {
    /// Create a new engine over a ledger view and a checkpoint store
    pub fn new(ledger: L, store: S) -> Self {
        Self {
            ledger,
            store,
            validator: Box::new(DefaultCheckpointValidator),
            account_locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Create a new engine with a custom request validator
    pub fn with_validator(ledger: L, store: S, validator: Box<dyn CheckpointValidator>) -> Self {
        Self {
            ledger,
            store,
            validator,
            account_locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Certify that the account's running balance as of `date` equals the
    /// declared statement closing balance, and durably record the checkpoint.
    ///
    /// On success every unreconciled transaction of the account dated on or
    /// before `date` is locked against further edits, atomically with the
    /// checkpoint insert. On any failure no checkpoint exists and no
    /// transaction is mutated.
    pub async fn reconcile(
        &self,
        bank_account_id: &str,
        date: NaiveDate,
        declared_closing_balance: i64,
    ) -> ReconcileResult<ReconciliationCheckpoint> {
        let today = chrono::Utc::now().date_naive();
        self.validator.validate_request(bank_account_id, date, today)?;

        let account = self
            .ledger
            .get_account(bank_account_id)
            .await?
            .ok_or_else(|| ReconcileError::AccountNotFound(bank_account_id.to_string()))?;
        if account.archived {
            return Err(ReconcileError::Validation(format!(
                "Bank account '{}' is archived and cannot be reconciled",
                bank_account_id
            )));
        }

        let lock = self.lock_for(bank_account_id);
        let _guard = lock.lock().await;

        let latest = self.store.latest_checkpoint(bank_account_id).await?;
        if let Some(ref latest) = latest {
            if date <= latest.date {
                tracing::warn!(
                    bank_account_id,
                    %date,
                    latest = %latest.date,
                    "rejected out-of-order checkpoint"
                );
                return Err(ReconcileError::OutOfOrderCheckpoint {
                    date,
                    latest: latest.date,
                });
            }
        }

        let computed = self.ledger.running_balance(bank_account_id, date).await?;
        if declared_closing_balance != computed {
            tracing::warn!(
                bank_account_id,
                declared = declared_closing_balance,
                computed,
                "rejected checkpoint with balance mismatch"
            );
            return Err(ReconcileError::BalanceMismatch {
                declared: declared_closing_balance,
                computed,
            });
        }

        let anchor = latest.map(|cp| cp.date).unwrap_or(account.opened_on);
        let checkpoint = ReconciliationCheckpoint::new(
            bank_account_id.to_string(),
            date,
            declared_closing_balance,
            computed,
            interval::interval_label(anchor, date),
        );

        let locked = self.store.commit_checkpoint(&checkpoint).await?;
        tracing::info!(
            checkpoint_id = %checkpoint.id,
            bank_account_id,
            %date,
            locked,
            "reconciliation checkpoint committed"
        );

        Ok(checkpoint)
    }

    /// Remove a checkpoint, unlocking every transaction it covered.
    ///
    /// Only the newest checkpoint of an account may be removed; anything else
    /// fails with `NotNewestCheckpoint` and leaves all state unchanged.
    pub async fn unreconcile(&self, checkpoint_id: &str) -> ReconcileResult<()> {
        let checkpoint = self
            .store
            .get_checkpoint(checkpoint_id)
            .await?
            .ok_or_else(|| ReconcileError::CheckpointNotFound(checkpoint_id.to_string()))?;

        let lock = self.lock_for(&checkpoint.bank_account_id);
        let _guard = lock.lock().await;

        let latest = self
            .store
            .latest_checkpoint(&checkpoint.bank_account_id)
            .await?
            .ok_or_else(|| ReconcileError::CheckpointNotFound(checkpoint_id.to_string()))?;
        if latest.id != checkpoint.id {
            tracing::warn!(
                checkpoint_id,
                latest = %latest.id,
                "rejected removal of non-newest checkpoint"
            );
            return Err(ReconcileError::NotNewestCheckpoint(
                checkpoint_id.to_string(),
            ));
        }

        let released = self.store.retract_checkpoint(checkpoint_id).await?;
        tracing::info!(
            checkpoint_id,
            bank_account_id = %checkpoint.bank_account_id,
            released,
            "reconciliation checkpoint retracted"
        );

        Ok(())
    }

    /// Remove a set of checkpoints, newest first.
    ///
    /// Every requested id is resolved up front; an unknown id fails the whole
    /// request before anything is removed. Removals then proceed in
    /// descending date order and stop at the first failure, reporting the ids
    /// removed so far.
    pub async fn unreconcile_many(&self, checkpoint_ids: &[String]) -> ReconcileResult<BulkRemoval> {
        let mut checkpoints = Vec::with_capacity(checkpoint_ids.len());
        for id in checkpoint_ids {
            let checkpoint = self
                .store
                .get_checkpoint(id)
                .await?
                .ok_or_else(|| ReconcileError::CheckpointNotFound(id.clone()))?;
            checkpoints.push(checkpoint);
        }
        checkpoints.sort_by(|a, b| b.date.cmp(&a.date));

        let mut removed = Vec::new();
        for checkpoint in checkpoints {
            match self.unreconcile(&checkpoint.id).await {
                Ok(()) => removed.push(checkpoint.id),
                Err(error) => {
                    return Ok(BulkRemoval {
                        removed,
                        failed: Some(BulkRemovalFailure {
                            checkpoint_id: checkpoint.id,
                            error,
                        }),
                    });
                }
            }
        }

        Ok(BulkRemoval {
            removed,
            failed: None,
        })
    }

    /// Read-through to the ledger for a single transaction
    pub async fn transaction(
        &self,
        transaction_id: &str,
    ) -> ReconcileResult<Option<LedgerTransaction>> {
        self.ledger.get_transaction(transaction_id).await
    }

    /// List the checkpoint history of an account
    pub async fn checkpoints(
        &self,
        bank_account_id: &str,
        query: &CheckpointQuery,
    ) -> ReconcileResult<CheckpointPage> {
        self.store.list_checkpoints(bank_account_id, query).await
    }

    fn lock_for(&self, bank_account_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.account_locks.lock().unwrap();
        locks
            .entry(bank_account_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_storage::MemoryStorage;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine_with_account() -> ReconciliationEngine<MemoryStorage, MemoryStorage> {
        let storage = MemoryStorage::new();
        storage.insert_account(BankAccount::new(
            "acc1".to_string(),
            "Checking".to_string(),
            "USD".to_string(),
            0,
            date(2024, 1, 1),
        ));
        storage.insert_transaction(LedgerTransaction::new(
            "txn1".to_string(),
            "acc1".to_string(),
            date(2024, 1, 5),
            10000,
            "Deposit".to_string(),
        ));
        ReconciliationEngine::new(storage.clone(), storage)
    }

    #[tokio::test]
    async fn reconcile_requires_existing_account() {
        let engine = engine_with_account();
        let result = engine.reconcile("no-such", date(2024, 1, 5), 0).await;
        assert!(matches!(result, Err(ReconcileError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn reconcile_rejects_future_dates() {
        let engine = engine_with_account();
        let tomorrow = chrono::Utc::now().date_naive().succ_opt().unwrap();
        let result = engine.reconcile("acc1", tomorrow, 10000).await;
        assert!(matches!(result, Err(ReconcileError::Validation(_))));
    }

    #[tokio::test]
    async fn reconcile_rejects_archived_accounts() {
        let storage = MemoryStorage::new();
        let mut account = BankAccount::new(
            "old".to_string(),
            "Closed".to_string(),
            "USD".to_string(),
            0,
            date(2023, 1, 1),
        );
        account.archived = true;
        storage.insert_account(account);
        let engine = ReconciliationEngine::new(storage.clone(), storage);

        let result = engine.reconcile("old", date(2024, 1, 5), 0).await;
        assert!(matches!(result, Err(ReconcileError::Validation(_))));
    }

    #[tokio::test]
    async fn first_checkpoint_interval_anchors_at_account_opening() {
        let engine = engine_with_account();
        let checkpoint = engine.reconcile("acc1", date(2024, 2, 14), 10000).await.unwrap();
        // 2024-01-01 -> 2024-02-14 spans one whole calendar month
        assert_eq!(checkpoint.duration_since_last, "1 Month");
    }

    #[tokio::test]
    async fn unreconcile_unknown_checkpoint_fails() {
        let engine = engine_with_account();
        let result = engine.unreconcile("missing").await;
        assert!(matches!(result, Err(ReconcileError::CheckpointNotFound(_))));
    }
}
