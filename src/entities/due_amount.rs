//! Due amount entity - One level's amount within a due.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Due amount database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "due_amounts")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the due this amount belongs to
    pub due_id: i64,
    /// Level label
    pub level: String,
    /// Positive amount charged to each student at the level
    pub amount: f64,
}

/// Defines relationships between `DueAmount` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each amount belongs to one due
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
