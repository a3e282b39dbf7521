//! Bank account reconciliation walkthrough

use chrono::NaiveDate;
use reconciliation_core::utils::MemoryStorage;
use reconciliation_core::{
    BankAccount, CheckpointQuery, LedgerTransaction, ReconcileError, ReconciliationEngine,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🏦 Reconciliation Core - Bank Account Walkthrough\n");

    // 1. Seed a bank account and a month of transactions
    println!("📋 Seeding account and ledger transactions...");
    let storage = MemoryStorage::new();
    storage.insert_account(BankAccount::new(
        "checking".to_string(),
        "Business Checking".to_string(),
        "USD".to_string(),
        0,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    ));

    let transactions = [
        ("txn001", (2024, 1, 5), 250_000_i64, "Customer payment"),
        ("txn002", (2024, 1, 12), -40_000, "Office rent"),
        ("txn003", (2024, 1, 20), -12_500, "Utilities"),
        ("txn004", (2024, 2, 3), 90_000, "Customer payment"),
    ];
    for (id, (y, m, d), amount, description) in transactions {
        storage.insert_transaction(LedgerTransaction::new(
            id.to_string(),
            "checking".to_string(),
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            amount,
            description.to_string(),
        ));
        println!("  ✓ {}: {} cents ({})", id, amount, description);
    }
    println!();

    let engine = ReconciliationEngine::new(storage.clone(), storage.clone());

    // 2. Try to reconcile January with a wrong statement balance
    println!("❌ Reconciling January against a wrong statement balance...");
    let january = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    match engine.reconcile("checking", january, 200_000).await {
        Err(ReconcileError::BalanceMismatch { declared, computed }) => {
            println!("  Rejected: declared {} vs computed {}\n", declared, computed);
        }
        other => println!("  Unexpected outcome: {:?}\n", other),
    }

    // 3. Reconcile January with the correct closing balance
    println!("✅ Reconciling January with the correct closing balance...");
    let checkpoint = engine.reconcile("checking", january, 197_500).await?;
    println!(
        "  Checkpoint {} created ({} since account opening)",
        checkpoint.id, checkpoint.duration_since_last
    );
    for id in ["txn001", "txn002", "txn003", "txn004"] {
        let txn = storage.transaction_snapshot(id).unwrap();
        println!("  {} reconciled: {}", id, txn.reconciled);
    }
    println!();

    // 4. Reconcile February on top of it
    println!("✅ Reconciling February...");
    let february = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let second = engine.reconcile("checking", february, 287_500).await?;
    println!(
        "  Checkpoint {} created ({} since the previous checkpoint)\n",
        second.id, second.duration_since_last
    );

    // 5. Show the checkpoint history
    println!("📜 Checkpoint history:");
    let history = engine
        .checkpoints("checking", &CheckpointQuery::default())
        .await?;
    for cp in &history.items {
        println!(
            "  {} | declared {} | computed {} | {}",
            cp.date, cp.declared_closing_balance, cp.computed_closing_balance, cp.duration_since_last
        );
    }
    println!();

    // 6. Undo the newest checkpoint
    println!("↩️  Removing the February checkpoint...");
    engine.unreconcile(&second.id).await?;
    let txn = storage.transaction_snapshot("txn004").unwrap();
    println!("  txn004 reconciled after removal: {}", txn.reconciled);

    Ok(())
}
