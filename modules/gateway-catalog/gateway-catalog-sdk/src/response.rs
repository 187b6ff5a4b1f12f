//! Uniform `{code, message, data}` envelope emitted at the boundary.

use serde::{Deserialize, Serialize};

use crate::error::BusinessException;

/// Code carried by every successful envelope.
pub const SUCCESS_CODE: &str = "SUCCESS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response<T> {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Response<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            code: SUCCESS_CODE.to_owned(),
            message: None,
            data: Some(data),
        }
    }

    /// Failure envelope; `data` is always omitted.
    #[must_use]
    pub fn fail(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: Some(message.into()),
            data: None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Wrap the outcome of a catalog operation.
    #[must_use]
    pub fn from_result<E>(result: Result<T, E>) -> Self
    where
        E: Into<BusinessException>,
    {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => err.into().into(),
        }
    }
}

impl<T> From<BusinessException> for Response<T> {
    fn from(err: BusinessException) -> Self {
        Self::fail(err.code().code(), err.message())
    }
}
