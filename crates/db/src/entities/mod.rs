//! `SeaORM` entities.

pub mod wallet_transactions;
pub mod wallets;
