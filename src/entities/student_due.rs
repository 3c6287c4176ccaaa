//! Student due entity - Per-level `PAID`/`UNPAID` standing of one student.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Student due status database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student_dues")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Store ID of the owning student
    pub student_ref: i64,
    /// Level the standing applies to
    pub level: String,
    /// `"PAID"` or `"UNPAID"`
    pub status: String,
}

/// Defines relationships between `StudentDue` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each status belongs to one student
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentRef",
        to = "super::student::Column::Id"
    )]
    Student,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
