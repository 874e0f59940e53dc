//! Core business logic for the wallet service.
//!
//! This crate contains the balance-mutation protocol with ZERO web or
//! database dependencies. Storage is reached only through the
//! [`wallet::LedgerStore`] port.
//!
//! # Modules
//!
//! - `wallet` - Validation, balance policy, ledger store port, and the
//!   transaction coordinator

pub mod wallet;
