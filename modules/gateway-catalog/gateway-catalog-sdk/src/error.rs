//! Error catalog and the boundary exception.
//!
//! Every failure leaving the catalog carries a stable code string and a
//! message rendered from that code's template.

use std::fmt;

use http::StatusCode;
use thiserror::Error;

/// Static error definition from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    /// Message template; each `{}` is filled by one positional argument.
    pub template: &'static str,
    pub arity: usize,
}

impl ErrDef {
    /// HTTP status, falling back to 500 for codes outside the valid range.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Fixed enumeration of error kinds surfaced at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Args: parameter name.
    InvalidParameter,
    AuthRequired,
    AuthInvalid,
    /// Args: resource kind, resource id.
    ResourceNotFound,
    /// Args: resource kind, resource id.
    ResourceExist,
    InternalError,
    /// Args: what is misconfigured.
    ConfigurationInvalid,
    /// Args: what is malformed.
    DataInvalid,
    /// Args: failure description.
    TransportFailure,
}

impl ErrorCode {
    pub const ALL: [Self; 9] = [
        Self::InvalidParameter,
        Self::AuthRequired,
        Self::AuthInvalid,
        Self::ResourceNotFound,
        Self::ResourceExist,
        Self::InternalError,
        Self::ConfigurationInvalid,
        Self::DataInvalid,
        Self::TransportFailure,
    ];

    #[must_use]
    pub const fn def(self) -> ErrDef {
        match self {
            Self::InvalidParameter => ErrDef {
                status: 400,
                title: "Bad Request",
                code: "INVALID_PARAMETER",
                template: "Invalid parameter: {}",
                arity: 1,
            },
            Self::AuthRequired => ErrDef {
                status: 401,
                title: "Unauthorized",
                code: "AUTH_REQUIRED",
                template: "Authentication required",
                arity: 0,
            },
            Self::AuthInvalid => ErrDef {
                status: 401,
                title: "Unauthorized",
                code: "AUTH_INVALID",
                template: "Authentication failed",
                arity: 0,
            },
            Self::ResourceNotFound => ErrDef {
                status: 404,
                title: "Not Found",
                code: "RESOURCE_NOT_FOUND",
                template: "{} not found: {}",
                arity: 2,
            },
            Self::ResourceExist => ErrDef {
                status: 409,
                title: "Conflict",
                code: "RESOURCE_EXIST",
                template: "{} already exists: {}",
                arity: 2,
            },
            Self::InternalError => ErrDef {
                status: 500,
                title: "Internal Server Error",
                code: "INTERNAL_ERROR",
                template: "Internal server error",
                arity: 0,
            },
            Self::ConfigurationInvalid => ErrDef {
                status: 500,
                title: "Configuration Invalid",
                code: "CONFIGURATION_INVALID",
                template: "Invalid configuration: {}",
                arity: 1,
            },
            Self::DataInvalid => ErrDef {
                status: 422,
                title: "Unprocessable Entity",
                code: "DATA_INVALID",
                template: "Invalid data: {}",
                arity: 1,
            },
            Self::TransportFailure => ErrDef {
                status: 502,
                title: "Bad Gateway",
                code: "TRANSPORT_FAILURE",
                template: "Upstream call failed: {}",
                arity: 1,
            },
        }
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        self.def().code
    }

    #[must_use]
    pub fn status(self) -> StatusCode {
        self.def().status_code()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An [`ErrorCode`] bound to its rendered message.
///
/// The message is rendered once, at construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct BusinessException {
    code: ErrorCode,
    message: String,
}

impl BusinessException {
    /// Bind `code` to positional template arguments.
    ///
    /// # Panics
    /// Panics if `args.len()` differs from the code's arity. Passing the
    /// wrong number of arguments is a programming error; prefer the typed
    /// constructors below, which cannot get it wrong.
    #[must_use]
    pub fn new(code: ErrorCode, args: &[&dyn fmt::Display]) -> Self {
        let def = code.def();
        assert_eq!(
            args.len(),
            def.arity,
            "{} takes {} argument(s), got {}",
            def.code,
            def.arity,
            args.len()
        );
        Self {
            code,
            message: render(def.template, args),
        }
    }

    #[must_use]
    pub fn invalid_parameter(name: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InvalidParameter, &[&name])
    }

    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, &[])
    }

    #[must_use]
    pub fn auth_invalid() -> Self {
        Self::new(ErrorCode::AuthInvalid, &[])
    }

    #[must_use]
    pub fn not_found(kind: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ResourceNotFound, &[&kind, &id])
    }

    #[must_use]
    pub fn already_exists(kind: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ResourceExist, &[&kind, &id])
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::new(ErrorCode::InternalError, &[])
    }

    #[must_use]
    pub fn configuration_invalid(what: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ConfigurationInvalid, &[&what])
    }

    #[must_use]
    pub fn data_invalid(what: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DataInvalid, &[&what])
    }

    #[must_use]
    pub fn transport_failure(what: impl fmt::Display) -> Self {
        Self::new(ErrorCode::TransportFailure, &[&what])
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

fn render(template: &str, args: &[&dyn fmt::Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;
    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        if let Some(arg) = args.next() {
            out.push_str(&arg.to_string());
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}
