use thiserror::Error;

use crate::sensitivity::SensitivityError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfiguration { field: String, reason: String },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
    #[error("vendor `{vendor_id}` appears more than once in the catalog")]
    DuplicateVendor { vendor_id: String },
}

impl DomainError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration { field: field.into(), reason: reason.into() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("vendor not found: {0}")]
    VendorNotFound(String),
    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("sensitivity analysis failed: {0}")]
    Sensitivity(String),
}

impl From<SensitivityError> for ApplicationError {
    fn from(value: SensitivityError) -> Self {
        match value {
            SensitivityError::DependencyUnavailable => {
                Self::DependencyUnavailable("tco calculator is not wired".to_owned())
            }
            SensitivityError::InvalidConfiguration(error) => Self::Domain(error),
            other => Self::Sensitivity(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The calculation inputs could not be processed. Check inputs and try again."
            }
            Self::NotFound { .. } => "The requested vendor is not part of the selected catalog.",
            Self::Internal { .. } => "The calculation engine is not configured correctly.",
        }
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "bad_request",
            Self::NotFound { .. } => "not_found",
            Self::Internal { .. } => "internal",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error) => {
                Self::BadRequest { message: error.to_string(), correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Sensitivity(message) => {
                Self::BadRequest { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::VendorNotFound(vendor_id) => Self::NotFound {
                message: format!("vendor `{vendor_id}` was not found"),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::DependencyUnavailable(message)
            | ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}
