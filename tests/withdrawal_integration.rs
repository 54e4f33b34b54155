//! Integration tests for the withdrawal workflow and the admin gateway.
//!
//! Covers the debit-at-request discipline, the one-way pending->approved
//! transition, server-side authorization, and the compensating refund
//! when the request insert fails after the debit.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coinroom::admin::{AdminError, AdminGateway};
use coinroom::db::repository::{LedgerStore, WithdrawalStore};
use coinroom::db::{MemoryLedgerStore, MemoryRoomStore, MemoryWithdrawalStore};
use coinroom::identity::{AccountId, Identity};
use coinroom::ledger::{EntryKind, LedgerError};
use coinroom::rooms::NewRoom;
use coinroom::withdrawal::{
    RequestId, WithdrawalError, WithdrawalManager, WithdrawalRequest, WithdrawalResult,
    WithdrawalStatus,
};
use uuid::Uuid;

struct TestEnv {
    ledger: Arc<MemoryLedgerStore>,
    manager: WithdrawalManager,
    gateway: AdminGateway,
    admin: Identity,
}

impl TestEnv {
    fn new() -> Self {
        let ledger = Arc::new(MemoryLedgerStore::new());
        let rooms = Arc::new(MemoryRoomStore::new());
        let withdrawals = Arc::new(MemoryWithdrawalStore::new());

        let manager = WithdrawalManager::new(ledger.clone(), withdrawals.clone());
        let gateway = AdminGateway::new(ledger.clone(), rooms, withdrawals);

        Self {
            ledger,
            manager,
            gateway,
            admin: Identity::administrator(Uuid::new_v4()),
        }
    }

    async fn player_with(&self, coins: i64) -> Identity {
        let identity = Identity::standard(Uuid::new_v4());
        self.ledger
            .open_account(identity.account_id, coins)
            .await
            .expect("Account provisioning should succeed");
        identity
    }
}

#[tokio::test]
async fn request_reserves_funds_immediately() {
    let env = TestEnv::new();
    let player = env.player_with(300).await;

    let request = env
        .manager
        .request_withdrawal(&player, 300, "gpay:9876543210")
        .await
        .expect("Request should succeed");

    assert_eq!(request.status, WithdrawalStatus::Pending);
    assert!(request.settlement_ref.is_none());
    assert!(request.processed_at.is_none());
    assert_eq!(
        env.ledger.balance(player.account_id).await.unwrap(),
        0,
        "The visible balance already excludes the pending withdrawal"
    );
}

#[tokio::test]
async fn insufficient_balance_rejects_the_request_entirely() {
    let env = TestEnv::new();
    let player = env.player_with(100).await;

    let err = env
        .manager
        .request_withdrawal(&player, 150, "gpay:9876543210")
        .await
        .expect_err("Request must fail");
    assert!(matches!(
        err,
        WithdrawalError::Ledger(LedgerError::InsufficientFunds {
            available: 100,
            required: 150
        })
    ));

    assert_eq!(env.ledger.balance(player.account_id).await.unwrap(), 100);
    assert!(
        env.manager.history(&player).await.unwrap().is_empty(),
        "No request record is created on a rejected debit"
    );
}

#[tokio::test]
async fn non_positive_amounts_and_empty_destination_are_rejected() {
    let env = TestEnv::new();
    let player = env.player_with(100).await;

    let err = env
        .manager
        .request_withdrawal(&player, 0, "gpay:9876543210")
        .await
        .expect_err("Zero amount must fail");
    assert!(matches!(err, WithdrawalError::InvalidAmount(0)));

    let err = env
        .manager
        .request_withdrawal(&player, -50, "gpay:9876543210")
        .await
        .expect_err("Negative amount must fail");
    assert!(matches!(err, WithdrawalError::InvalidAmount(-50)));

    let err = env
        .manager
        .request_withdrawal(&player, 50, "  ")
        .await
        .expect_err("Blank destination must fail");
    assert!(matches!(err, WithdrawalError::EmptyDestination));

    assert_eq!(env.ledger.balance(player.account_id).await.unwrap(), 100);
}

#[tokio::test]
async fn approval_finalizes_without_touching_the_ledger() {
    let env = TestEnv::new();
    let player = env.player_with(300).await;

    let request = env
        .manager
        .request_withdrawal(&player, 300, "gpay:9876543210")
        .await
        .unwrap();
    assert_eq!(env.ledger.balance(player.account_id).await.unwrap(), 0);

    let approved = env
        .gateway
        .approve_withdrawal(&env.admin, request.id, "https://pay.example/receipt/81")
        .await
        .expect("Approval should succeed");

    assert_eq!(approved.status, WithdrawalStatus::Approved);
    assert_eq!(
        approved.settlement_ref.as_deref(),
        Some("https://pay.example/receipt/81")
    );
    assert!(approved.processed_at.is_some());
    assert_eq!(
        env.ledger.balance(player.account_id).await.unwrap(),
        0,
        "Approval certifies the payout; no further deduction"
    );
}

#[tokio::test]
async fn double_approval_fails_and_preserves_the_first_evidence() {
    let env = TestEnv::new();
    let player = env.player_with(500).await;

    let request = env
        .manager
        .request_withdrawal(&player, 200, "gpay:9876543210")
        .await
        .unwrap();

    env.gateway
        .approve_withdrawal(&env.admin, request.id, "receipt-first")
        .await
        .expect("First approval should succeed");

    let err = env
        .gateway
        .approve_withdrawal(&env.admin, request.id, "receipt-second")
        .await
        .expect_err("Second approval must fail");
    assert!(matches!(
        err,
        AdminError::Withdrawal(WithdrawalError::InvalidStateTransition { .. })
    ));

    let history = env.manager.history(&player).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(
        history[0].settlement_ref.as_deref(),
        Some("receipt-first"),
        "The losing approval writes nothing"
    );
}

#[tokio::test]
async fn approval_requires_evidence_and_an_existing_request() {
    let env = TestEnv::new();

    let err = env
        .gateway
        .approve_withdrawal(&env.admin, Uuid::new_v4(), "  ")
        .await
        .expect_err("Blank evidence must fail");
    assert!(matches!(
        err,
        AdminError::Withdrawal(WithdrawalError::MissingEvidence)
    ));

    let err = env
        .gateway
        .approve_withdrawal(&env.admin, Uuid::new_v4(), "receipt")
        .await
        .expect_err("Unknown request must fail");
    assert!(matches!(
        err,
        AdminError::Withdrawal(WithdrawalError::RequestNotFound(_))
    ));
}

#[tokio::test]
async fn privileged_operations_reject_standard_identities() {
    let env = TestEnv::new();
    let player = env.player_with(500).await;
    let request = env
        .manager
        .request_withdrawal(&player, 100, "gpay:9876543210")
        .await
        .unwrap();

    let approve = env
        .gateway
        .approve_withdrawal(&player, request.id, "receipt")
        .await;
    assert!(matches!(approve, Err(AdminError::AdminRequired)));

    let listing = env.gateway.pending_withdrawals(&player).await;
    assert!(matches!(listing, Err(AdminError::AdminRequired)));

    let create = env
        .gateway
        .create_room(
            &player,
            NewRoom {
                title: "Not Allowed".to_string(),
                game: "PUBG".to_string(),
                entry_fee: 10,
                code: "X".to_string(),
                password: "x".to_string(),
            },
        )
        .await;
    assert!(matches!(create, Err(AdminError::AdminRequired)));

    let grant = env.gateway.grant_coins(&player, player.account_id, 10).await;
    assert!(matches!(grant, Err(AdminError::AdminRequired)));

    // The request is untouched by all of the rejected calls
    let history = env.manager.history(&player).await.unwrap();
    assert_eq!(history[0].status, WithdrawalStatus::Pending);
}

#[tokio::test]
async fn pending_queue_lists_oldest_first_and_drains_on_approval() {
    let env = TestEnv::new();
    let player = env.player_with(1_000).await;

    let first = env
        .manager
        .request_withdrawal(&player, 100, "gpay:9876543210")
        .await
        .unwrap();
    let second = env
        .manager
        .request_withdrawal(&player, 200, "gpay:9876543210")
        .await
        .unwrap();

    let pending = env.gateway.pending_withdrawals(&env.admin).await.unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].id, first.id, "Oldest first");
    assert_eq!(pending[1].id, second.id);

    env.gateway
        .approve_withdrawal(&env.admin, first.id, "receipt-1")
        .await
        .unwrap();

    let pending = env.gateway.pending_withdrawals(&env.admin).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second.id);
}

#[tokio::test]
async fn grants_credit_the_ledger() {
    let env = TestEnv::new();
    let player = env.player_with(50).await;

    let new_balance = env
        .gateway
        .grant_coins(&env.admin, player.account_id, 450)
        .await
        .expect("Grant should succeed");
    assert_eq!(new_balance, 500);

    let err = env
        .gateway
        .grant_coins(&env.admin, player.account_id, 0)
        .await
        .expect_err("Zero grant must fail");
    assert!(matches!(err, AdminError::InvalidAmount(0)));

    let entries = env.ledger.entries(player.account_id, 10).await.unwrap();
    assert_eq!(entries[0].kind, EntryKind::Grant);
    assert_eq!(entries[0].amount, 450);
}

/// Store wrapper that fails every insert, simulating an outage between
/// the debit and the request write.
struct FailingWithdrawalStore {
    inner: MemoryWithdrawalStore,
}

#[async_trait]
impl WithdrawalStore for FailingWithdrawalStore {
    async fn insert(&self, _request: &WithdrawalRequest) -> WithdrawalResult<()> {
        Err(WithdrawalError::TransactionFailed(
            "injected insert failure".to_string(),
        ))
    }

    async fn get(&self, request_id: RequestId) -> WithdrawalResult<WithdrawalRequest> {
        self.inner.get(request_id).await
    }

    async fn approve(
        &self,
        request_id: RequestId,
        settlement_ref: &str,
        processed_at: DateTime<Utc>,
    ) -> WithdrawalResult<WithdrawalRequest> {
        self.inner.approve(request_id, settlement_ref, processed_at).await
    }

    async fn list_for_account(
        &self,
        account_id: AccountId,
    ) -> WithdrawalResult<Vec<WithdrawalRequest>> {
        self.inner.list_for_account(account_id).await
    }

    async fn list_pending(&self) -> WithdrawalResult<Vec<WithdrawalRequest>> {
        self.inner.list_pending().await
    }
}

#[tokio::test]
async fn failed_request_insert_is_compensated() {
    let ledger = Arc::new(MemoryLedgerStore::new());
    let failing = Arc::new(FailingWithdrawalStore {
        inner: MemoryWithdrawalStore::new(),
    });

    let player = Identity::standard(Uuid::new_v4());
    ledger.open_account(player.account_id, 300).await.unwrap();

    let manager = WithdrawalManager::new(ledger.clone(), failing);
    let err = manager
        .request_withdrawal(&player, 200, "gpay:9876543210")
        .await
        .expect_err("Injected failure must surface");
    assert!(matches!(err, WithdrawalError::TransactionFailed(_)));

    // The debit was rolled back by a compensating credit
    assert_eq!(ledger.balance(player.account_id).await.unwrap(), 300);
    let entries = ledger.entries(player.account_id, 10).await.unwrap();
    assert!(
        entries.iter().any(|e| e.kind == EntryKind::Refund),
        "Compensation shows up as a refund entry"
    );
}
