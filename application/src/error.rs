//! [`Error`]-related definitions.

use std::fmt;

use derive_more::Error as StdError;
use itertools::Itertools as _;
use juniper::IntoFieldError;
use service::{error::Kind, infra::database};
use tracerr::{Trace, Traced};

/// Defines a new API error type.
///
/// Every variant gets a stable `code`, a [`Kind`] and a human-readable
/// `message`. The [`http::StatusCode`] of a variant is derived from its
/// [`Kind`], unless it's specified explicitly with `#[status = ...]`.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (@status $kind:ident) => {
        $crate::error::status_code(::service::error::Kind::$kind)
    };
    (@status $kind:ident $status:ident) => {
        ::http::StatusCode::$status
    };

    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[kind = $kind:ident]
                $( #[status = $status:ident] )?
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// API error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            kind: ::service::error::Kind::$kind,
                            status_code: $crate::define_error!(
                                @status $kind $($status)?
                            ),
                            message: $message.to_owned(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// Returns the [`http::StatusCode`] responding to a failure of the provided
/// [`Kind`].
#[must_use]
pub const fn status_code(kind: Kind) -> http::StatusCode {
    match kind {
        Kind::Validation => http::StatusCode::BAD_REQUEST,
        Kind::Auth => http::StatusCode::FORBIDDEN,
        Kind::NotFound => http::StatusCode::NOT_FOUND,
        Kind::Conflict => http::StatusCode::CONFLICT,
        Kind::Storage => http::StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Returns the machine-readable name of the provided [`Kind`].
const fn kind_name(kind: Kind) -> &'static str {
    match kind {
        Kind::Validation => "VALIDATION",
        Kind::Auth => "AUTH",
        Kind::NotFound => "NOT_FOUND",
        Kind::Conflict => "CONFLICT",
        Kind::Storage => "STORAGE",
    }
}

/// GraphQL API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// Stable code of this [`Error`], like `OFFER_NOT_OPEN`.
    pub code: Code,

    /// [`Kind`] of this [`Error`].
    pub kind: Kind,

    /// [`http::StatusCode`] of the response carrying this [`Error`].
    pub status_code: http::StatusCode,

    /// Human-readable message of this [`Error`].
    pub message: String,

    /// [`Trace`] of the failure this [`Error`] originates from, if any.
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,
}

impl Error {
    /// Creates a new [`Error`] of an unexpected failure.
    ///
    /// Its details are only logged, not exposed to the client.
    #[must_use]
    pub fn internal(err: &impl fmt::Display) -> Self {
        tracing::error!("internal error: {err}");
        Self {
            code: "INTERNAL_SERVER_ERROR",
            kind: Kind::Storage,
            status_code: status_code(Kind::Storage),
            message: "Internal server error".to_owned(),
            backtrace: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.kind, self.message)?;
        for trace in &self.backtrace {
            write!(f, "\n{}", trace.iter().format("\n"))?;
        }
        Ok(())
    }
}

impl<S> IntoFieldError<S> for Error
where
    S: From<String>,
{
    fn into_field_error(self) -> juniper::FieldError<S> {
        let Self {
            code,
            kind,
            status_code: _,
            message,
            backtrace,
        } = self;

        let mut ext = juniper::Object::with_capacity(3);
        for (name, value) in [("code", code), ("kind", kind_name(kind))] {
            drop(
                ext.add_field(name, juniper::Value::scalar(value.to_owned())),
            );
        }
        drop(ext.add_field(
            "backtrace",
            juniper::Value::list(
                backtrace
                    .iter()
                    .flat_map(|trace| trace.iter())
                    .map(|frame| juniper::Value::scalar(frame.to_string()))
                    .collect(),
            ),
        ));
        juniper::FieldError::new(message, juniper::Value::object(ext))
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Conversion of failures into API [`Error`]s.
pub trait AsError {
    /// Converts this failure into an API [`Error`].
    ///
    /// [`None`] means the failure is unexpected, so it's not exposed to the
    /// client as is.
    fn try_as_error(&self) -> Option<Error>;

    /// Converts this failure into an API [`Error`], falling back to
    /// [`Error::internal()`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts this failure into an API [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        self.as_ref().try_as_error().map(|e| Error {
            backtrace: Some(self.trace().clone()),
            ..e
        })
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

#[cfg(test)]
mod spec {
    use service::error::Kind;

    use crate::{api, context::AuthError, Error};

    #[test]
    fn status_follows_kind() {
        let not_open = Error::from(api::OfferError::NotOpen);
        assert_eq!(not_open.kind, Kind::Conflict);
        assert_eq!(not_open.status_code, http::StatusCode::CONFLICT);

        let not_exists = Error::from(api::ExchangeError::NotExists);
        assert_eq!(not_exists.kind, Kind::NotFound);
        assert_eq!(not_exists.status_code, http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn status_may_be_overridden() {
        let err = Error::from(AuthError::AuthorizationRequired);

        assert_eq!(err.kind, Kind::Auth);
        assert_eq!(err.status_code, http::StatusCode::UNAUTHORIZED);
        assert_eq!(err.code, "AUTHORIZATION_REQUIRED");
    }

    #[test]
    fn internal_error_hides_details() {
        let err = Error::internal(&"connection reset by peer");

        assert_eq!(err.kind, Kind::Storage);
        assert!(!err.message.contains("connection reset"));
    }
}
