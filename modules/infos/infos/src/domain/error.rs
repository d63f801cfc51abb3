use infos_sdk::{FilterError, InfosError};
use thiserror::Error;

use crate::domain::ports::GeocodeError;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Entity not found: Info with id {id}")]
    NotFound { id: i64 },

    #[error("Info with id {id} already exists")]
    DuplicateId { id: i64 },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid filter: {message}")]
    InvalidFilter { message: String },

    #[error("Address not found: {address}")]
    AddressNotFound { address: String },

    #[error("Geocoder unavailable: {message}")]
    GeocoderUnavailable { message: String },

    #[error("Geocoder error: {message}")]
    Geocoder { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    #[must_use]
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    #[must_use]
    pub fn duplicate_id(id: i64) -> Self {
        Self::DuplicateId { id }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }

    pub fn address_not_found(address: impl Into<String>) -> Self {
        Self::AddressNotFound {
            address: address.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<FilterError> for DomainError {
    fn from(e: FilterError) -> Self {
        Self::invalid_filter(e.to_string())
    }
}

impl From<GeocodeError> for DomainError {
    fn from(e: GeocodeError) -> Self {
        match e {
            GeocodeError::Unavailable(message) => Self::GeocoderUnavailable { message },
            GeocodeError::Upstream(message) => Self::Geocoder { message },
        }
    }
}

/// Convert domain errors to SDK errors for public API consumption.
impl From<DomainError> for InfosError {
    fn from(domain_error: DomainError) -> Self {
        match domain_error {
            DomainError::NotFound { id } => InfosError::not_found(id),
            DomainError::DuplicateId { id } => InfosError::conflict(id),
            DomainError::Validation { field, message } => {
                InfosError::validation(format!("{field}: {message}"))
            }
            DomainError::InvalidFilter { message } => InfosError::invalid_filter(message),
            DomainError::AddressNotFound { address } => InfosError::address_not_found(address),
            DomainError::GeocoderUnavailable { message } => {
                InfosError::geocoder_unavailable(message)
            }
            DomainError::Geocoder { message } => InfosError::geocoder(message),
            DomainError::Database { .. } => InfosError::internal(),
        }
    }
}
