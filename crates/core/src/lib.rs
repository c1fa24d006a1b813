//! Domain rules for Ledgerline.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Services call into it before opening a transaction (input checks) and inside
//! one (checks that need stored state passed in).
//!
//! # Modules
//!
//! - `amount` - Decimal string parsing
//! - `ledger` - Double-entry journal validation
//! - `account` - Chart of accounts fields and hierarchy
//! - `invoice` - Grand total check and payment reconciliation
//! - `gst` - GST breakup rules
//! - `budget` - Allocation limits and comparison
//! - `allocation` - Largest Remainder splitting and allocation rules
//! - `currency` - Exchange rate quotes
//! - `period` - Date ranges and id sets
//! - `reports` - Trial balance and expense summary

pub mod account;
pub mod allocation;
pub mod amount;
pub mod budget;
pub mod currency;
pub mod gst;
pub mod invoice;
pub mod ledger;
pub mod period;
pub mod reports;
