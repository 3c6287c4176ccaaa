//! Entity module - Contains all SeaORM entity definitions for the store.
//! These entities represent the collections (students, dues, payments) and the
//! child tables that hold their per-level maps.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod due;
pub mod due_amount;
pub mod payment;
pub mod student;
pub mod student_due;

// Re-export specific types to avoid conflicts
pub use due::{Column as DueColumn, Entity as Due, Model as DueModel};
pub use due_amount::{Column as DueAmountColumn, Entity as DueAmount, Model as DueAmountModel};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
pub use student::{Column as StudentColumn, Entity as Student, Model as StudentModel};
pub use student_due::{
    Column as StudentDueColumn, Entity as StudentDue, Model as StudentDueModel,
};
