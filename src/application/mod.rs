//! Application layer containing the point balance operations.
//!
//! Each operation is a small service composed directly with the storage ports.
//! Mutating services serialize per user through a shared [`locks::UserLocks`]
//! registry; [`ledger::PointLedger`] wires all of them to one pair of stores.

pub mod charge_point;
mod commit;
pub mod ledger;
pub mod locks;
pub mod read_history;
pub mod read_point;
pub mod use_point;
