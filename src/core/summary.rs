//! Dashboard summary business logic.
//!
//! This module derives the figures shown on the admin and student dashboards from
//! payment records. Totals classify statuses case-insensitively through
//! [`PaymentStatus::classify`]; amounts that cannot be read count as zero.

use crate::{
    core::{
        amount::{format_amount, parse_formatted_amount},
        payment::{PaymentStatus, get_all_payments, get_payments_for_student},
        query::{SortConfig, sort_payments},
    },
    entities::{Due, Student, payment},
    errors::Result,
};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

/// Default number of payments shown in the recent activity list.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Figures for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSummary {
    /// Sum of successful payment amounts
    pub total_paid: f64,
    /// Number of successful payments
    pub paid_count: usize,
    /// Number of pending payments
    pub pending_count: usize,
    /// Number of failed payments
    pub failed_count: usize,
    /// Payments whose status is not recognised
    pub other_count: usize,
    /// Registered students
    pub student_count: u64,
    /// Dues defined
    pub due_count: u64,
}

/// A student's payments with their paid and outstanding totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentStatement {
    /// The student's payments, newest first
    pub payments: Vec<payment::Model>,
    /// Sum of successful payments
    pub paid_total: f64,
    /// Sum of every payment not yet successful
    pub outstanding_total: f64,
}

fn amount_of(payment: &payment::Model) -> f64 {
    parse_formatted_amount(&payment.amount).unwrap_or(0.0)
}

fn is_paid(payment: &payment::Model) -> bool {
    PaymentStatus::classify(&payment.status) == Some(PaymentStatus::Success)
}

/// Tallies payments by status class.
#[must_use]
pub fn summarize(
    payments: &[payment::Model],
    student_count: u64,
    due_count: u64,
) -> DashboardSummary {
    let mut summary = DashboardSummary {
        student_count,
        due_count,
        ..Default::default()
    };

    for payment in payments {
        match PaymentStatus::classify(&payment.status) {
            Some(PaymentStatus::Success) => {
                summary.paid_count += 1;
                summary.total_paid += amount_of(payment);
            }
            Some(PaymentStatus::Pending) => summary.pending_count += 1,
            Some(PaymentStatus::Failed) => summary.failed_count += 1,
            None => summary.other_count += 1,
        }
    }

    summary
}

/// The most recent payments by date and time, newest first.
#[must_use]
pub fn recent_payments(payments: &[payment::Model], limit: usize) -> Vec<&payment::Model> {
    let mut ordered: Vec<&payment::Model> = payments.iter().collect();
    sort_payments(&mut ordered, SortConfig::default());
    ordered.truncate(limit);
    ordered
}

/// Builds a statement from the payments of one student.
#[must_use]
pub fn student_statement(payments: &[payment::Model], student_id: &str) -> StudentStatement {
    let mut own: Vec<&payment::Model> = payments
        .iter()
        .filter(|p| p.student_id == student_id)
        .collect();
    sort_payments(&mut own, SortConfig::default());

    let (paid, outstanding): (Vec<&payment::Model>, Vec<&payment::Model>) =
        own.iter().copied().partition(|p| is_paid(p));

    StudentStatement {
        paid_total: paid.iter().map(|p| amount_of(p)).sum(),
        outstanding_total: outstanding.iter().map(|p| amount_of(p)).sum(),
        payments: own.into_iter().cloned().collect(),
    }
}

/// Formats an amount with its currency code, e.g. `NGN 2,000.00`.
#[must_use]
pub fn format_currency(amount: f64, currency: &str) -> String {
    format!("{} {}", currency, format_amount(amount))
}

/// Loads everything the admin dashboard needs.
///
/// # Returns
/// The summary and the `recent_limit` newest payments
pub async fn generate_admin_dashboard(
    db: &DatabaseConnection,
    recent_limit: usize,
) -> Result<(DashboardSummary, Vec<payment::Model>)> {
    let payments = get_all_payments(db).await?;
    let student_count = Student::find().count(db).await?;
    let due_count = Due::find().count(db).await?;

    let summary = summarize(&payments, student_count, due_count);
    let recent = recent_payments(&payments, recent_limit)
        .into_iter()
        .cloned()
        .collect();

    Ok((summary, recent))
}

/// Loads the statement for a student by registration number.
pub async fn generate_student_statement(
    db: &DatabaseConnection,
    student_id: &str,
) -> Result<StudentStatement> {
    let payments = get_payments_for_student(db, student_id).await?;
    Ok(student_statement(&payments, student_id))
}
