//! Wallets and their audit trail.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(WALLETS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS transactions CASCADE;")
            .await?;
        db.execute_unprepared("DROP TABLE IF EXISTS wallets CASCADE;")
            .await?;
        Ok(())
    }
}

const WALLETS_SQL: &str = r"
-- One row per wallet; the balance is in minor units
CREATE TABLE IF NOT EXISTS wallets (
    id UUID PRIMARY KEY,
    balance BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_wallets_balance_non_negative CHECK (balance >= 0)
);

-- Append-only audit trail, one row per committed mutation
CREATE TABLE IF NOT EXISTS transactions (
    id UUID PRIMARY KEY,
    wallet_id UUID NOT NULL REFERENCES wallets(id) ON DELETE CASCADE,
    operation_type VARCHAR(10) NOT NULL,
    amount BIGINT NOT NULL,
    timestamp TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_transactions_operation_type CHECK (operation_type IN ('DEPOSIT', 'WITHDRAW')),
    CONSTRAINT chk_transactions_amount_positive CHECK (amount > 0)
);

-- Audit trail lookup per wallet in commit order
CREATE INDEX IF NOT EXISTS idx_transactions_wallet_timestamp ON transactions(wallet_id, timestamp);
";
