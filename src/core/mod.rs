//! Core business logic - framework-agnostic operations on students, dues and payments.
//!
//! Store operations take a [`crate::store::Store`] for writes (so subscribers are
//! notified) and a plain `DatabaseConnection` for reads. Everything in `amount`,
//! `calendar`, `query`, `summary`, `export` and `overlay` is pure.

/// Amount input parsing and display formatting
pub mod amount;
/// Academic session labels and display date/time strings
pub mod calendar;
/// Due definitions
pub mod due;
/// Due expansion into per-student payment records
pub mod expansion;
/// CSV export of payments and students
pub mod export;
/// Single active overlay state
pub mod overlay;
/// Payment records and statuses
pub mod payment;
/// Identity provider interface used when creating students
pub mod provisioning;
/// Payment filtering, sorting and filter options
pub mod query;
/// Student roster, search and per-level due standing
pub mod student;
/// Dashboard statistics
pub mod summary;
