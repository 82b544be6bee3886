//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Errors that can occur during signup, login, or logout.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required form field was left blank.
    #[error("Please fill in all fields.")]
    MissingFields,

    /// Email does not look like an address.
    #[error("Invalid email format.")]
    InvalidEmail(#[source] tabletop_core::EmailError),

    /// Password shorter than the backend accepts.
    #[error("Password must be at least {min} characters long.")]
    WeakPassword {
        /// Minimum accepted length.
        min: usize,
    },

    /// Password and confirmation differ.
    #[error("Passwords do not match.")]
    PasswordMismatch,

    /// The backend refused the request or could not be reached.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session could not be saved or restored.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
