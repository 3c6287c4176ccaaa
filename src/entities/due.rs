//! Due entity - A financial obligation definition scoped by academic level.
//!
//! The level to amount map lives in `due_amounts`. Dues are never edited once created.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Due database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dues")]
pub struct Model {
    /// Store-assigned identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Title, copied into each payment's type
    pub title: String,
    /// Whether the due recurs every academic year
    pub is_recurring: bool,
    /// When the due was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Due and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One due has an amount per level
    #[sea_orm(has_many = "super::due_amount::Entity")]
    DueAmounts,
    /// One due expands into many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::due_amount::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DueAmounts.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
