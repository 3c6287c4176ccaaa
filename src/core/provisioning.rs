//! Identity provider interface.
//!
//! Creating a student also creates a login account with an external identity provider.
//! The provider is abstracted behind [`AccountProvisioner`]; its rejections map onto the
//! crate's identity errors so each one reaches the user with its own message.

use crate::errors::Error;
use std::future::Future;
use thiserror::Error as ThisError;

/// Ways the identity provider can reject an account.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ProvisionError {
    /// Password does not meet the provider's strength rules
    #[error("weak password")]
    WeakPassword,
    /// An account with this email already exists
    #[error("email already in use")]
    EmailInUse,
    /// The email is not a valid address
    #[error("invalid email")]
    InvalidEmail,
    /// Any other provider failure
    #[error("{0}")]
    Other(String),
}

/// Creates login accounts.
pub trait AccountProvisioner {
    /// Creates an account and returns the provider's account ID.
    fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<String, ProvisionError>> + Send;
}

/// Maps a provider rejection onto the crate error for the given email.
#[must_use]
pub fn provision_error_to_error(error: ProvisionError, email: &str, min_length: usize) -> Error {
    match error {
        ProvisionError::WeakPassword => Error::WeakPassword { min_length },
        ProvisionError::EmailInUse => Error::DuplicateIdentity {
            email: email.to_string(),
        },
        ProvisionError::InvalidEmail => Error::MalformedIdentity {
            email: email.to_string(),
        },
        ProvisionError::Other(message) => Error::Provisioning { message },
    }
}
