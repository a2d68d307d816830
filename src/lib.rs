//! Single-process library checkout manager.
//!
//! This crate keeps a catalog of books, a roster of members and a ledger
//! of checkouts, and applies the lending rules (limits, due dates,
//! renewals, overdue fees) through a [`RuleEngine`] that snapshots its
//! state after every change.

pub mod book;
pub mod catalog;
pub mod checkout;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod ledger;
pub mod member;
pub mod menu;
pub mod observers;
pub mod persistence;
pub mod report;
pub mod roster;
pub mod sample;

pub use book::Book;
pub use checkout::{Checkout, CheckoutStatus};
pub use config::{LibraryConfig, LoanRules};
pub use engine::{LibraryStatistics, RuleEngine};
pub use error::{ErrorKind, LibraryError, Result};
pub use events::LibraryEvent;
pub use member::{Member, MemberStatus};
pub use persistence::{JsonFileStore, MemoryStore, Snapshot, SnapshotStore};
