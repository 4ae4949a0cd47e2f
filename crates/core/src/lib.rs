//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `auth` - Roles and password hashing
//! - `access` - Ownership and role-gated feature checks
//! - `ledger` - Transaction records, validation and the store trait
//! - `aggregation` - Balances and date-range reports
//! - `trends` - Six-month buckets and the expense forecast
//! - `notify` - Account notification hook

pub mod access;
pub mod aggregation;
pub mod auth;
pub mod calendar;
pub mod ledger;
pub mod notify;
pub mod trends;
