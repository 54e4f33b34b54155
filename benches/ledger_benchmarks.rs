use std::hint::black_box;
use std::sync::Arc;

use coinroom::db::MemoryLedgerStore;
use coinroom::db::repository::LedgerStore;
use coinroom::ledger::EntryKind;
use criterion::{Criterion, criterion_group, criterion_main};
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Benchmark a debit/credit pair on one account, the hot path every
/// enrollment and withdrawal takes
fn bench_adjust_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = MemoryLedgerStore::new();
    let account_id = Uuid::new_v4();
    rt.block_on(store.open_account(account_id, 1_000_000)).unwrap();

    c.bench_function("adjust_debit_credit_pair", |b| {
        b.iter(|| {
            rt.block_on(async {
                store
                    .adjust(account_id, -100, EntryKind::EntryFee, None)
                    .await
                    .unwrap();
                store
                    .adjust(account_id, 100, EntryKind::Refund, None)
                    .await
                    .unwrap()
            })
        });
    });
}

/// Benchmark contended adjustments: many tasks hammering one account
/// versus the same load spread across accounts
fn bench_adjust_contention(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    c.bench_function("adjust_contended_single_account", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = Arc::new(MemoryLedgerStore::new());
                let account_id = Uuid::new_v4();
                store.open_account(account_id, 1_000_000).await.unwrap();

                let mut handles = vec![];
                for _ in 0..8 {
                    let store = store.clone();
                    handles.push(tokio::spawn(async move {
                        for _ in 0..32 {
                            store
                                .adjust(account_id, -1, EntryKind::EntryFee, None)
                                .await
                                .unwrap();
                        }
                    }));
                }
                for handle in handles {
                    handle.await.unwrap();
                }
                black_box(store.balance(account_id).await.unwrap())
            })
        });
    });

    c.bench_function("adjust_spread_across_accounts", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = Arc::new(MemoryLedgerStore::new());
                let mut handles = vec![];
                for _ in 0..8 {
                    let store = store.clone();
                    let account_id = Uuid::new_v4();
                    store.open_account(account_id, 1_000_000).await.unwrap();
                    handles.push(tokio::spawn(async move {
                        for _ in 0..32 {
                            store
                                .adjust(account_id, -1, EntryKind::EntryFee, None)
                                .await
                                .unwrap();
                        }
                    }));
                }
                for handle in handles {
                    handle.await.unwrap();
                }
                black_box(())
            })
        });
    });
}

criterion_group!(benches, bench_adjust_round_trip, bench_adjust_contention);
criterion_main!(benches);
