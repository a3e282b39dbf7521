//! In-memory storage implementation for testing

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::traits::*;
use crate::types::*;

#[derive(Debug, Default)]
struct StoreInner {
    accounts: HashMap<String, BankAccount>,
    transactions: HashMap<String, LedgerTransaction>,
    checkpoints: HashMap<String, ReconciliationCheckpoint>,
}

/// In-memory implementation of both `LedgerQuery` and `ReconciliationStore`
/// for testing and development.
///
/// All state lives behind a single `RwLock`, so `commit_checkpoint` and
/// `retract_checkpoint` hold the write lock for the whole checkpoint-plus-
/// stamps change and are atomic with respect to every reader.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<RwLock<StoreInner>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a bank account
    pub fn insert_account(&self, account: BankAccount) {
        self.inner
            .write()
            .unwrap()
            .accounts
            .insert(account.id.clone(), account);
    }

    /// Seed a ledger transaction
    pub fn insert_transaction(&self, transaction: LedgerTransaction) {
        self.inner
            .write()
            .unwrap()
            .transactions
            .insert(transaction.id.clone(), transaction);
    }

    /// Snapshot of a transaction's current state (useful in tests)
    pub fn transaction_snapshot(&self, transaction_id: &str) -> Option<LedgerTransaction> {
        self.inner
            .read()
            .unwrap()
            .transactions
            .get(transaction_id)
            .cloned()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.accounts.clear();
        inner.transactions.clear();
        inner.checkpoints.clear();
    }
}

#[async_trait]
impl LedgerQuery for MemoryStorage {
    async fn get_account(&self, bank_account_id: &str) -> ReconcileResult<Option<BankAccount>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .accounts
            .get(bank_account_id)
            .cloned())
    }

    async fn running_balance(
        &self,
        bank_account_id: &str,
        as_of: NaiveDate,
    ) -> ReconcileResult<i64> {
        let inner = self.inner.read().unwrap();
        let account = inner
            .accounts
            .get(bank_account_id)
            .ok_or_else(|| ReconcileError::AccountNotFound(bank_account_id.to_string()))?;

        let movements: i64 = inner
            .transactions
            .values()
            .filter(|txn| txn.bank_account_id == bank_account_id && txn.date <= as_of)
            .map(|txn| txn.amount)
            .sum();

        Ok(account.opening_balance + movements)
    }

    async fn get_transaction(
        &self,
        transaction_id: &str,
    ) -> ReconcileResult<Option<LedgerTransaction>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .transactions
            .get(transaction_id)
            .cloned())
    }
}

#[async_trait]
impl ReconciliationStore for MemoryStorage {
    async fn latest_checkpoint(
        &self,
        bank_account_id: &str,
    ) -> ReconcileResult<Option<ReconciliationCheckpoint>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .checkpoints
            .values()
            .filter(|cp| cp.bank_account_id == bank_account_id)
            .max_by_key(|cp| cp.date)
            .cloned())
    }

    async fn get_checkpoint(
        &self,
        checkpoint_id: &str,
    ) -> ReconcileResult<Option<ReconciliationCheckpoint>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .checkpoints
            .get(checkpoint_id)
            .cloned())
    }

    async fn list_checkpoints(
        &self,
        bank_account_id: &str,
        query: &CheckpointQuery,
    ) -> ReconcileResult<CheckpointPage> {
        let inner = self.inner.read().unwrap();
        let mut items: Vec<ReconciliationCheckpoint> = inner
            .checkpoints
            .values()
            .filter(|cp| cp.bank_account_id == bank_account_id)
            .cloned()
            .collect();

        items.sort_by(|a, b| {
            let ordering = match query.sort_column {
                CheckpointSortColumn::Date => a.date.cmp(&b.date),
                CheckpointSortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
                CheckpointSortColumn::ClosingBalance => a
                    .declared_closing_balance
                    .cmp(&b.declared_closing_balance),
            };
            match query.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total_count = items.len() as u64;
        if query.paginate {
            let page_no = query.page_no.max(1) as usize;
            let page_size = query.page_size as usize;
            items = items
                .into_iter()
                .skip((page_no - 1) * page_size)
                .take(page_size)
                .collect();
        }

        Ok(CheckpointPage { items, total_count })
    }

    async fn commit_checkpoint(
        &self,
        checkpoint: &ReconciliationCheckpoint,
    ) -> ReconcileResult<usize> {
        let mut inner = self.inner.write().unwrap();
        if inner.checkpoints.contains_key(&checkpoint.id) {
            return Err(ReconcileError::Storage(format!(
                "checkpoint '{}' already exists",
                checkpoint.id
            )));
        }

        inner
            .checkpoints
            .insert(checkpoint.id.clone(), checkpoint.clone());

        let mut locked = 0;
        for txn in inner.transactions.values_mut() {
            if txn.bank_account_id == checkpoint.bank_account_id
                && txn.date <= checkpoint.date
                && !txn.reconciled
            {
                txn.stamp(&checkpoint.id);
                locked += 1;
            }
        }

        Ok(locked)
    }

    async fn retract_checkpoint(&self, checkpoint_id: &str) -> ReconcileResult<usize> {
        let mut inner = self.inner.write().unwrap();
        if inner.checkpoints.remove(checkpoint_id).is_none() {
            return Err(ReconcileError::CheckpointNotFound(
                checkpoint_id.to_string(),
            ));
        }

        let mut released = 0;
        for txn in inner.transactions.values_mut() {
            if txn.reconciled_checkpoint_id.as_deref() == Some(checkpoint_id) {
                txn.release();
                released += 1;
            }
        }

        Ok(released)
    }
}
