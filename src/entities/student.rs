//! Student entity - Represents an enrolled student on the roster.
//!
//! The store assigns `id`; `student_id` is the registration number used as a
//! business key by payments. Creation date and time are kept as display strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Student database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    /// Store-assigned identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full display name
    pub name: String,
    /// Registration number (e.g., "2020/248279"), not enforced unique
    pub student_id: String,
    /// Academic level label (e.g., "100 lvl")
    pub level: String,
    /// Cohort range (e.g., "2020/2024")
    pub year_of_study: String,
    /// Contact email, also the identity account login
    pub email: String,
    /// Contact phone number
    pub phone: String,
    /// Identifier returned by the identity provider
    pub account_id: Option<String>,
    /// Creation date display string (e.g., "Apr 12, 2023")
    pub date_created: String,
    /// Creation time display string (e.g., "9:32 AM")
    pub time_created: String,
    /// When the record was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Student and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One student has many per-level due statuses
    #[sea_orm(has_many = "super::student_due::Entity")]
    StudentDues,
}

impl Related<super::student_due::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentDues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
