//! Public error types for the `infos` module.
//!
//! These errors are safe to expose to other modules and consumers.

use thiserror::Error;

/// Errors that can be returned by the `InfosClient`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InfosError {
    /// Reminder with the specified ID was not found.
    #[error("Entity not found: Info with id {id}")]
    NotFound { id: i64 },

    /// A reminder with the specified ID already exists.
    #[error("Info with id {id} already exists")]
    Conflict { id: i64 },

    /// Validation error with the provided data.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The filter could not be turned into a query.
    #[error("Invalid filter: {message}")]
    InvalidFilter { message: String },

    /// The geocoder returned no candidate for the address.
    #[error("Address not found: {address}")]
    AddressNotFound { address: String },

    /// The geocoder could not be reached.
    #[error("Geocoder unavailable: {message}")]
    GeocoderUnavailable { message: String },

    /// The geocoder answered with an error or an unreadable response.
    #[error("Geocoder error: {message}")]
    Geocoder { message: String },

    /// An internal error occurred.
    #[error("Internal error")]
    Internal,
}

impl InfosError {
    /// Create a `NotFound` error.
    #[must_use]
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    /// Create a `Conflict` error.
    #[must_use]
    pub fn conflict(id: i64) -> Self {
        Self::Conflict { id }
    }

    /// Create a `Validation` error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an `InvalidFilter` error.
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }

    /// Create an `AddressNotFound` error.
    pub fn address_not_found(address: impl Into<String>) -> Self {
        Self::AddressNotFound {
            address: address.into(),
        }
    }

    /// Create a `GeocoderUnavailable` error.
    pub fn geocoder_unavailable(message: impl Into<String>) -> Self {
        Self::GeocoderUnavailable {
            message: message.into(),
        }
    }

    /// Create a `Geocoder` error.
    pub fn geocoder(message: impl Into<String>) -> Self {
        Self::Geocoder {
            message: message.into(),
        }
    }

    /// Create an `Internal` error.
    #[must_use]
    pub fn internal() -> Self {
        Self::Internal
    }
}
