//! Payment entity - One student's obligation or transaction for a due.
//!
//! Rows are denormalized for display: the amount is a formatted string, date and time
//! are display strings, and the student is referenced by registration number
//! (`student_id`), not by store ID. Placeholder rows use `"N/A"` as the student ID.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Store-assigned identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Academic session label (e.g., "2024/2025")
    pub session: String,
    /// Registration number of the student, or `"N/A"` for placeholders
    pub student_id: String,
    /// Amount formatted with thousands separators and two decimals
    pub amount: String,
    /// Due title, shown as the payment type
    #[sea_orm(column_name = "type")]
    pub due_type: String,
    /// Level label
    pub level: String,
    /// Date display string (e.g., "Apr 1, 2023")
    pub date: String,
    /// Time display string (e.g., "9:00 AM")
    pub time: String,
    /// Raw status as written by whichever flow touched the record last
    pub status: String,
    /// Transaction number attached by the payment flow
    pub transaction_no: Option<String>,
    /// Payment method or origin tag (e.g., `"Due Created"`)
    pub payment_type: Option<String>,
    /// Name of the payee
    pub payee_name: Option<String>,
    /// Registration number of the payee
    pub reg_no: Option<String>,
    /// Due this record was expanded from, if any
    pub due_id: Option<i64>,
    /// Expansion key, unique per (due, student) or (due, placeholder level)
    #[sea_orm(unique)]
    pub idempotency_key: Option<String>,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each expanded payment belongs to one due
    #[sea_orm(
        belongs_to = "super::due::Entity",
        from = "Column::DueId",
        to = "super::due::Column::Id"
    )]
    Due,
}

impl Related<super::due::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Due.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
