//! Payment query layer - the filter, sort and filter-option derivation behind the
//! payments table.
//!
//! Everything here is a pure function of the payment records and the current
//! [`PaymentQuery`], so the table can be recomputed on every snapshot.
//!
//! Filters compare raw strings exactly. Status casing is not normalized, so `"Pending"`
//! and `"PENDING"` are different filter options.

use crate::{
    core::{amount::parse_formatted_amount, calendar::parse_display_timestamp},
    entities::payment,
};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Sentinel filter option that matches every value.
pub const ALL: &str = "All";

/// Payment type shown on the departmental tab.
pub const DEPARTMENTAL_DUE_TYPE: &str = "Dept. Dues";

/// Table tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    /// Every payment
    #[default]
    All,
    /// Only payments whose type is exactly [`DEPARTMENTAL_DUE_TYPE`]
    Departmental,
}

/// Payment fields that can be filtered on or listed as options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentField {
    /// Academic session
    Session,
    /// Registration number
    StudentId,
    /// Formatted amount
    Amount,
    /// Due title
    Type,
    /// Level label
    Level,
    /// Date display string
    Date,
    /// Time display string
    Time,
    /// Raw status
    Status,
}

impl PaymentField {
    /// Reads the field from a payment.
    #[must_use]
    pub fn value(self, payment: &payment::Model) -> &str {
        match self {
            Self::Session => &payment.session,
            Self::StudentId => &payment.student_id,
            Self::Amount => &payment.amount,
            Self::Type => &payment.due_type,
            Self::Level => &payment.level,
            Self::Date => &payment.date,
            Self::Time => &payment.time,
            Self::Status => &payment.status,
        }
    }
}

/// Filter selections. Each field is either [`ALL`] or a value that must match exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    /// Due title
    pub due_type: String,
    /// Level label
    pub level: String,
    /// Raw status
    pub status: String,
    /// Academic session
    pub session: String,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            due_type: ALL.to_string(),
            level: ALL.to_string(),
            status: ALL.to_string(),
            session: ALL.to_string(),
        }
    }
}

impl FilterOptions {
    fn constraints(&self) -> [(PaymentField, &str); 4] {
        [
            (PaymentField::Type, &self.due_type),
            (PaymentField::Level, &self.level),
            (PaymentField::Status, &self.status),
            (PaymentField::Session, &self.session),
        ]
    }

    /// Whether a payment passes every non-[`ALL`] selection.
    #[must_use]
    pub fn matches(&self, payment: &payment::Model) -> bool {
        self.constraints()
            .iter()
            .all(|(field, wanted)| *wanted == ALL || field.value(payment) == *wanted)
    }
}

/// Sortable columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    /// Date and time combined into a timestamp
    #[default]
    Date,
    /// Numeric amount
    Amount,
    /// Registration number
    StudentId,
    /// Due title
    Type,
    /// Level label
    Level,
    /// Raw status
    Status,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first
    Ascending,
    /// Largest first
    #[default]
    Descending,
}

/// Active sort key and direction. Defaults to newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortConfig {
    /// Column
    pub field: SortField,
    /// Direction
    pub direction: SortDirection,
}

/// Everything that decides which payments the table shows, and in what order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentQuery {
    /// Active tab
    pub tab: Tab,
    /// Filter selections
    pub filters: FilterOptions,
    /// Sort key and direction
    pub sort: SortConfig,
}

impl PaymentQuery {
    /// Filters then sorts.
    #[must_use]
    pub fn apply<'a>(&self, payments: &'a [payment::Model]) -> Vec<&'a payment::Model> {
        let mut visible = filter_payments(payments, self.tab, &self.filters);
        sort_payments(&mut visible, self.sort);
        visible
    }

    /// Resets every filter to [`ALL`], keeping tab and sort.
    pub fn clear_filters(&mut self) {
        self.filters = FilterOptions::default();
    }
}

fn tab_matches(tab: Tab, payment: &payment::Model) -> bool {
    match tab {
        Tab::All => true,
        Tab::Departmental => payment.due_type == DEPARTMENTAL_DUE_TYPE,
    }
}

/// Keeps the payments that pass the tab and every filter, in input order.
#[must_use]
pub fn filter_payments<'a>(
    payments: &'a [payment::Model],
    tab: Tab,
    filters: &FilterOptions,
) -> Vec<&'a payment::Model> {
    payments
        .iter()
        .filter(|p| tab_matches(tab, p) && filters.matches(p))
        .collect()
}

// Unreadable values sort before every readable one.
fn compare_f64(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

/// Ascending comparison of two payments on one key.
#[must_use]
pub fn compare_payments(field: SortField, a: &payment::Model, b: &payment::Model) -> Ordering {
    match field {
        SortField::Date => parse_display_timestamp(&a.date, &a.time)
            .cmp(&parse_display_timestamp(&b.date, &b.time)),
        SortField::Amount => compare_f64(
            parse_formatted_amount(&a.amount),
            parse_formatted_amount(&b.amount),
        ),
        SortField::StudentId => a.student_id.cmp(&b.student_id),
        SortField::Type => a.due_type.cmp(&b.due_type),
        SortField::Level => a.level.cmp(&b.level),
        SortField::Status => a.status.cmp(&b.status),
    }
}

/// Sorts in place.
///
/// Ascending is a stable sort, so equal keys keep their input order. Descending is the
/// exact reverse of ascending, which puts equal keys in reverse input order. It is not
/// a flipped comparator, so tied rows do not keep their input order when descending.
pub fn sort_payments(payments: &mut [&payment::Model], sort: SortConfig) {
    payments.sort_by(|a, b| compare_payments(sort.field, a, b));
    if sort.direction == SortDirection::Descending {
        payments.reverse();
    }
}

/// Options for a filter dropdown: [`ALL`] followed by each distinct value of the field
/// in first-seen order.
///
/// A value that is literally `"All"` is folded into the sentinel.
#[must_use]
pub fn unique_values(payments: &[payment::Model], field: PaymentField) -> Vec<String> {
    let mut seen = HashSet::new();
    std::iter::once(ALL.to_string())
        .chain(
            payments
                .iter()
                .map(|p| field.value(p))
                .filter(|value| *value != ALL && seen.insert(*value))
                .map(str::to_string),
        )
        .collect()
}
