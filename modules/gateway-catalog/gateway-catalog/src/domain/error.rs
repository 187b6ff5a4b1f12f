//! Domain errors for the gateway catalog.

use gateway_catalog_sdk::{BusinessException, InconsistentGatewayConfig};
use thiserror::Error;

use crate::domain::cipher::CipherError;

/// Domain-level errors for gateway catalog operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Root secret missing, inconsistent type union, unreadable config.
    #[error("invalid configuration: {message}")]
    ConfigurationInvalid { message: String },

    /// Malformed upstream record or response body.
    #[error("invalid data: {message}")]
    DataInvalid { message: String },

    #[error("invalid parameter: {name}")]
    InvalidParameter { name: String },

    #[error("authentication required")]
    AuthRequired,

    /// The upstream rejected the gateway credentials.
    #[error("authentication failed")]
    AuthInvalid,

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: &'static str, id: String },

    /// Timeout, connection error or non-success status from an upstream.
    #[error("transport failure: {message}")]
    Transport { message: String },

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    #[must_use]
    pub fn configuration_invalid(message: impl Into<String>) -> Self {
        Self::ConfigurationInvalid {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn data_invalid(message: impl Into<String>) -> Self {
        Self::DataInvalid {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_parameter(name: impl Into<String>) -> Self {
        Self::InvalidParameter { name: name.into() }
    }

    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

impl From<InconsistentGatewayConfig> for DomainError {
    fn from(e: InconsistentGatewayConfig) -> Self {
        Self::configuration_invalid(e.to_string())
    }
}

/// Convert `DomainError` to the boundary exception.
impl From<DomainError> for BusinessException {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::ConfigurationInvalid { message } => Self::configuration_invalid(message),
            DomainError::DataInvalid { message } => Self::data_invalid(message),
            DomainError::InvalidParameter { name } => Self::invalid_parameter(name),
            DomainError::AuthRequired => Self::auth_required(),
            DomainError::AuthInvalid => Self::auth_invalid(),
            DomainError::NotFound { kind, id } => Self::not_found(kind, id),
            DomainError::AlreadyExists { kind, id } => Self::already_exists(kind, id),
            DomainError::Transport { message } => Self::transport_failure(message),
            DomainError::Cipher(CipherError::RootKeyMissing) => {
                Self::configuration_invalid("encryption root key is not set")
            }
            DomainError::Cipher(CipherError::Decrypt(reason)) => {
                tracing::error!(reason, "stored credential could not be decrypted");
                Self::data_invalid("sealed credential")
            }
            DomainError::Cipher(CipherError::Encrypt) => {
                tracing::error!("credential encryption failed");
                Self::internal()
            }
            DomainError::Internal(message) => {
                tracing::error!(%message, "internal error");
                Self::internal()
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use gateway_catalog_sdk::{ErrorCode, GatewayType};
    use http::StatusCode;

    #[test]
    fn every_variant_maps_to_one_code() {
        let cases = [
            (DomainError::configuration_invalid("x"), ErrorCode::ConfigurationInvalid),
            (DomainError::data_invalid("x"), ErrorCode::DataInvalid),
            (DomainError::invalid_parameter("region"), ErrorCode::InvalidParameter),
            (DomainError::AuthRequired, ErrorCode::AuthRequired),
            (DomainError::AuthInvalid, ErrorCode::AuthInvalid),
            (
                DomainError::NotFound {
                    kind: "gateway",
                    id: "ab".to_owned(),
                },
                ErrorCode::ResourceNotFound,
            ),
            (
                DomainError::AlreadyExists {
                    kind: "gateway",
                    id: "ab".to_owned(),
                },
                ErrorCode::ResourceExist,
            ),
            (DomainError::transport("timeout"), ErrorCode::TransportFailure),
            (DomainError::Cipher(CipherError::RootKeyMissing), ErrorCode::ConfigurationInvalid),
            (DomainError::Cipher(CipherError::Decrypt("tag mismatch")), ErrorCode::DataInvalid),
            (DomainError::Internal("boom".to_owned()), ErrorCode::InternalError),
        ];
        for (err, code) in cases {
            assert_eq!(BusinessException::from(err).code(), code);
        }
    }

    #[test]
    fn inconsistent_union_is_configuration_invalid() {
        let err: DomainError = InconsistentGatewayConfig {
            gateway_type: GatewayType::Higress,
            expected: "higressConfig",
        }
        .into();
        let exc = BusinessException::from(err);
        assert_eq!(exc.code(), ErrorCode::ConfigurationInvalid);
        assert_eq!(exc.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(exc.message().contains("higressConfig"));
    }

    #[test]
    fn messages_carry_parameters() {
        let exc = BusinessException::from(DomainError::invalid_parameter("gatewayId"));
        assert_eq!(exc.message(), "Invalid parameter: gatewayId");
    }
}
