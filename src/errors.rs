//! Unified error types for the dues ledger.
//!
//! Every store operation, validation step and export returns [`Result`]. Call sites
//! that face a user convert errors into a display string with [`Error::user_message`].

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The underlying store rejected a read or write
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A due was submitted without a title
    #[error("Due title cannot be empty")]
    EmptyDueTitle,

    /// No level carried a positive amount after parsing
    #[error("At least one level must have a positive amount")]
    NoValidAmount,

    /// A required form field was blank
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the blank field
        field: &'static str,
    },

    /// Password shorter than the configured minimum
    #[error("Password must be at least {min_length} characters")]
    WeakPassword {
        /// Configured minimum length
        min_length: usize,
    },

    /// Email already belongs to a student or an identity account
    #[error("Email already in use: {email}")]
    DuplicateIdentity {
        /// The rejected email
        email: String,
    },

    /// Email is not a valid address
    #[error("Invalid email address: {email}")]
    MalformedIdentity {
        /// The rejected email
        email: String,
    },

    /// The identity provider failed for another reason
    #[error("Account provisioning failed: {message}")]
    Provisioning {
        /// Provider message
        message: String,
    },

    /// Student lookup by store ID failed
    #[error("Student not found: {id}")]
    StudentNotFound {
        /// Store ID
        id: i64,
    },

    /// Due lookup by store ID failed
    #[error("Due not found: {id}")]
    DueNotFound {
        /// Store ID
        id: i64,
    },

    /// Payment lookup by store ID failed
    #[error("Payment not found: {id}")]
    PaymentNotFound {
        /// Store ID
        id: i64,
    },

    /// A payment write failed part way through a due expansion.
    /// The `committed` records written before the failure stay in the store.
    #[error("Expansion of due {due_id} stopped after {committed} payment records: {source}")]
    PartialExpansion {
        /// Due being expanded
        due_id: i64,
        /// Payment records written before the failure
        committed: usize,
        /// The failing write
        #[source]
        source: sea_orm::DbErr,
    },

    /// A snapshot could not be delivered to a subscriber
    #[error("Subscription to {collection} failed: {message}")]
    Subscription {
        /// Collection name
        collection: &'static str,
        /// Underlying failure
        message: String,
    },

    /// CSV serialization failed
    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Converts the error into the message shown inline next to the form or table
    /// that issued the failing operation.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyDueTitle => "Please enter a due title".to_string(),
            Self::NoValidAmount => "Please enter at least one valid amount".to_string(),
            Self::MissingField { field } => format!("Please fill in the {field} field"),
            Self::WeakPassword { min_length } => {
                format!("Password should be at least {min_length} characters")
            }
            Self::DuplicateIdentity { .. } => {
                "A student with this email already exists".to_string()
            }
            Self::MalformedIdentity { .. } => "Please enter a valid email address".to_string(),
            Self::Provisioning { .. } => {
                "Could not create the student account. Please try again.".to_string()
            }
            Self::PartialExpansion { .. } => "Failed to add due. Please try again.".to_string(),
            Self::Subscription { collection, .. } => {
                format!("Failed to load {collection}. Please refresh the page.")
            }
            Self::StudentNotFound { .. } => "Student no longer exists".to_string(),
            Self::DueNotFound { .. } => "Due no longer exists".to_string(),
            Self::PaymentNotFound { .. } => "Payment no longer exists".to_string(),
            Self::Csv(_) | Self::Io(_) => "Export failed. Please try again.".to_string(),
            Self::Config { .. } | Self::Database(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
