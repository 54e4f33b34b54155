//! Embedded database schema.
//!
//! Applied idempotently at startup. The store-level guards live here:
//! the non-negative balance check backing the ledger's atomic
//! conditional update, the composite unique constraint that closes the
//! duplicate-enrollment race, and the withdrawal status check tying
//! evidence and processed timestamp to the approved state.

use sqlx::PgPool;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS account_balances (
        account_id UUID PRIMARY KEY,
        coins BIGINT NOT NULL CHECK (coins >= 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS ledger_entries (
        id UUID PRIMARY KEY,
        account_id UUID NOT NULL REFERENCES account_balances(account_id),
        amount BIGINT NOT NULL,
        balance_after BIGINT NOT NULL CHECK (balance_after >= 0),
        kind TEXT NOT NULL CHECK (kind IN ('provision', 'entry_fee', 'withdrawal', 'refund', 'grant')),
        reference UUID,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_ledger_entries_account
        ON ledger_entries (account_id, created_at DESC)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS rooms (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        game TEXT NOT NULL,
        entry_fee BIGINT NOT NULL CHECK (entry_fee >= 0),
        room_code TEXT NOT NULL,
        room_password TEXT NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS enrollments (
        id UUID PRIMARY KEY,
        account_id UUID NOT NULL,
        room_id UUID NOT NULL REFERENCES rooms(id),
        player_handle TEXT NOT NULL,
        enrolled_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (account_id, room_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS withdrawal_requests (
        id UUID PRIMARY KEY,
        account_id UUID NOT NULL,
        amount BIGINT NOT NULL CHECK (amount > 0),
        destination TEXT NOT NULL,
        status TEXT NOT NULL CHECK (status IN ('pending', 'approved')),
        settlement_ref TEXT,
        requested_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        processed_at TIMESTAMPTZ,
        CHECK ((status = 'approved') = (settlement_ref IS NOT NULL AND processed_at IS NOT NULL))
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_withdrawal_requests_status
        ON withdrawal_requests (status, requested_at)
    "#,
];

/// Apply the schema statements in order (idempotent)
pub async fn apply(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
