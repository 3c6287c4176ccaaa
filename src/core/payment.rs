//! Payment business logic - Handles payment record storage and status classification.
//!
//! Payment records are mostly written in bulk by due expansion. After that, an external
//! payment flow moves them to `Success` or `Failed` and attaches transaction metadata
//! through [`update_payment`]. Subscribers see those changes as new snapshots.

use crate::{
    entities::{Payment, payment},
    errors::{Error, Result},
    store::{Collection, Store},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info};

/// Student ID written on placeholder payments for levels with no enrolled students.
pub const PLACEHOLDER_STUDENT_ID: &str = "N/A";

/// Payment type tag written on every payment created by due expansion.
pub const DUE_CREATED_PAYMENT_TYPE: &str = "Due Created";

/// Status classes a payment can be in.
///
/// Stored statuses are raw strings and their casing varies between sources
/// (`"Pending"`, `"PENDING"`, `"success"`). [`PaymentStatus::classify`] reads them
/// case-insensitively for display and totals; filtering compares raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    /// Awaiting payment
    Pending,
    /// Paid
    Success,
    /// Payment attempt failed
    Failed,
}

impl PaymentStatus {
    /// Canonical spelling written by this crate.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Success => "Success",
            Self::Failed => "Failed",
        }
    }

    /// Reads a stored status regardless of case. Unknown statuses yield `None`.
    #[must_use]
    pub fn classify(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        [Self::Pending, Self::Success, Self::Failed]
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(raw))
    }
}

/// Fields of a payment record to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    /// Academic session label
    pub session: String,
    /// Registration number, or [`PLACEHOLDER_STUDENT_ID`]
    pub student_id: String,
    /// Formatted amount string
    pub amount: String,
    /// Due title
    pub due_type: String,
    /// Level label
    pub level: String,
    /// Date display string
    pub date: String,
    /// Time display string
    pub time: String,
    /// Raw status
    pub status: String,
    /// Transaction number
    pub transaction_no: Option<String>,
    /// Payment method or origin tag
    pub payment_type: Option<String>,
    /// Payee name
    pub payee_name: Option<String>,
    /// Payee registration number
    pub reg_no: Option<String>,
    /// Originating due
    pub due_id: Option<i64>,
    /// Expansion key
    pub idempotency_key: Option<String>,
}

impl NewPayment {
    fn into_active_model(self) -> payment::ActiveModel {
        payment::ActiveModel {
            session: Set(self.session),
            student_id: Set(self.student_id),
            amount: Set(self.amount),
            due_type: Set(self.due_type),
            level: Set(self.level),
            date: Set(self.date),
            time: Set(self.time),
            status: Set(self.status),
            transaction_no: Set(self.transaction_no),
            payment_type: Set(self.payment_type),
            payee_name: Set(self.payee_name),
            reg_no: Set(self.reg_no),
            due_id: Set(self.due_id),
            idempotency_key: Set(self.idempotency_key),
            ..Default::default()
        }
    }
}

/// Partial update of a payment record. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentUpdate {
    /// New raw status
    pub status: Option<String>,
    /// Transaction number
    pub transaction_no: Option<String>,
    /// Payment method
    pub payment_type: Option<String>,
    /// Payee name
    pub payee_name: Option<String>,
    /// Payee registration number
    pub reg_no: Option<String>,
}

/// Retrieves every payment in insertion order.
pub async fn get_all_payments(db: &DatabaseConnection) -> Result<Vec<payment::Model>> {
    Payment::find()
        .order_by_asc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific payment by its store ID.
pub async fn get_payment_by_id(
    db: &DatabaseConnection,
    payment_id: i64,
) -> Result<Option<payment::Model>> {
    Payment::find_by_id(payment_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every payment recorded against a registration number.
pub async fn get_payments_for_student(
    db: &DatabaseConnection,
    student_id: &str,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::StudentId.eq(student_id))
        .order_by_asc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every payment expanded from a due.
pub async fn get_payments_for_due(
    db: &DatabaseConnection,
    due_id: i64,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::DueId.eq(due_id))
        .order_by_asc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts a payment record and notifies payment subscribers.
pub async fn create_payment(store: &Store, new: NewPayment) -> Result<payment::Model> {
    let created = new.into_active_model().insert(store.db()).await?;
    debug!(
        "Created payment {} ({} for {})",
        created.id, created.due_type, created.student_id
    );
    store.notify(Collection::Payments);
    Ok(created)
}

/// Applies a partial update to a payment record.
///
/// # Errors
/// Returns [`Error::PaymentNotFound`] if no payment has this ID.
pub async fn update_payment(
    store: &Store,
    payment_id: i64,
    update: PaymentUpdate,
) -> Result<payment::Model> {
    let existing = get_payment_by_id(store.db(), payment_id)
        .await?
        .ok_or(Error::PaymentNotFound { id: payment_id })?;

    let mut active: payment::ActiveModel = existing.into();
    if let Some(status) = update.status {
        active.status = Set(status);
    }
    if let Some(transaction_no) = update.transaction_no {
        active.transaction_no = Set(Some(transaction_no));
    }
    if let Some(payment_type) = update.payment_type {
        active.payment_type = Set(Some(payment_type));
    }
    if let Some(payee_name) = update.payee_name {
        active.payee_name = Set(Some(payee_name));
    }
    if let Some(reg_no) = update.reg_no {
        active.reg_no = Set(Some(reg_no));
    }

    let updated = active.update(store.db()).await?;
    info!("Updated payment {} (status {})", updated.id, updated.status);
    store.notify(Collection::Payments);
    Ok(updated)
}

/// Removes a payment record.
///
/// # Errors
/// Returns [`Error::PaymentNotFound`] if no payment has this ID.
pub async fn delete_payment(store: &Store, payment_id: i64) -> Result<()> {
    let result = Payment::delete_by_id(payment_id).exec(store.db()).await?;
    if result.rows_affected == 0 {
        return Err(Error::PaymentNotFound { id: payment_id });
    }

    info!("Deleted payment {}", payment_id);
    store.notify(Collection::Payments);
    Ok(())
}
