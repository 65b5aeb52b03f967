//! [`Context`]-related definitions.

use std::sync::atomic::{AtomicU16, Ordering};

use axum::{async_trait, extract::FromRequestParts};
use axum_extra::headers::{
    authorization::Bearer, Authorization, HeaderMapExt as _,
};
use common::DateTime;
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use service::{
    command::{self, Command as _},
    domain::user::session,
};
use tokio::sync::OnceCell;

use crate::{api, define_error, AsError, Error, JuniperResponse, Service};

/// Context of a single GraphQL request or subscription connection.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] serving the request.
    service: Service,

    /// [`http::StatusCode`] to respond with if the request fails.
    error_status_code: AtomicU16,

    /// Headers of the HTTP request.
    headers: http::HeaderMap,

    /// Outcome of authenticating the request, resolved once at most.
    session: OnceCell<Result<Session, Error>>,
}

impl Context {
    /// Creates a new [`Context`] of a request with the provided `headers`.
    #[must_use]
    pub fn new(service: Service, headers: http::HeaderMap) -> Self {
        Self {
            service,
            error_status_code: AtomicU16::new(
                http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            ),
            headers,
            session: OnceCell::new(),
        }
    }

    /// Returns the [`Service`] serving the request.
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the [`http::StatusCode`] to respond with if the request fails.
    #[must_use]
    pub fn error_status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(
            self.error_status_code.load(Ordering::Relaxed),
        )
        .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Remembers the [`http::StatusCode`] of the provided [`Error`] to
    /// respond with, and returns the [`Error`] back.
    ///
    /// Meant to be used inside [`Result::map_err()`].
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.error_status_code
                .store(err.status_code.as_u16(), Ordering::Relaxed);
            err
        }
    }

    /// Returns the authenticated [`Session`] of the request, if any.
    ///
    /// # Errors
    ///
    /// If the request carries an invalid or expired token.
    pub async fn try_current_session(&self) -> Result<Option<Session>, Error> {
        match self.current_session().await {
            Ok(session) => Ok(Some(session)),
            Err(e) if e.code == AuthError::AuthorizationRequired.code() => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Returns the authenticated [`Session`] of the request.
    ///
    /// The token is verified on the first call only.
    ///
    /// # Errors
    ///
    /// If the request carries no token, or an invalid or expired one.
    pub async fn current_session(&self) -> Result<Session, Error> {
        self.session
            .get_or_init(|| self.authenticate())
            .await
            .clone()
            .map_err(self.error())
    }

    /// Puts the `authToken` variable provided on a GraphQL subscription
    /// initialization into the `Authorization` header.
    ///
    /// # Errors
    ///
    /// If the `authToken` is not a valid token string.
    pub(crate) fn apply_subscription_variables(
        &mut self,
        vars: &juniper::Variables,
    ) -> Result<(), Error> {
        let Some(token) = vars.get("authToken") else {
            return Ok(());
        };
        let header = token
            .as_string_value()
            .and_then(|t| format!("Bearer {t}").parse().ok())
            .ok_or_else(|| Error::from(AuthError::InvalidVariables))?;
        drop(self.headers.insert(http::header::AUTHORIZATION, header));
        Ok(())
    }

    /// Verifies the bearer token of the request.
    async fn authenticate(&self) -> Result<Session, Error> {
        let bearer = match self
            .headers
            .typed_try_get::<Authorization<Bearer>>()
        {
            Ok(Some(Authorization(bearer))) => bearer,
            Ok(None) => return Err(AuthError::AuthorizationRequired.into()),
            Err(_) => return Err(AuthError::InvalidHeader.into()),
        };
        let token = session::Token::from(bearer.token().to_owned());

        let session = self
            .service
            .execute(command::AuthorizeUserSession {
                token: token.clone(),
            })
            .await
            .map_err(AsError::into_error)?;
        Ok(Session {
            user_id: session.user_id.into(),
            token,
            expires_at: session.expires_at.coerce(),
        })
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = JuniperResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let Some(service) = parts.extensions.get::<Service>().cloned() else {
            return Err(JuniperResponse {
                status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
                response: GraphQLBatchResponse::Single(GraphQLResponse::error(
                    Error::internal(&"missing `Service` extension")
                        .into_field_error(),
                )),
            });
        };
        Ok(Self::new(service, parts.headers.clone()))
    }
}

/// Authenticated session of a user.
#[derive(Clone, Debug)]
pub struct Session {
    /// ID of the authenticated user.
    pub user_id: api::user::Id,

    /// Token the user has been authenticated with.
    pub token: session::Token,

    /// [`DateTime`] when this [`Session`] expires.
    pub expires_at: DateTime,
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::JsonWebTokenDecodeError(_) => {
                Some(AuthError::InvalidToken.into())
            }
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[kind = Auth]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "INVALID_TOKEN"]
        #[kind = Auth]
        #[status = UNAUTHORIZED]
        #[message = "Authorization token is invalid or expired"]
        InvalidToken,

        #[code = "INVALID_AUTHORIZATION_HEADER"]
        #[kind = Auth]
        #[status = BAD_REQUEST]
        #[message = "`Authorization` header is malformed"]
        InvalidHeader,

        #[code = "INVALID_VARIABLES"]
        #[kind = Validation]
        #[message = "Invalid subscription authorization variables"]
        InvalidVariables,
    }
}

impl AuthError {
    /// Returns the [`Error`] code of this [`AuthError`].
    #[must_use]
    pub fn code(self) -> crate::error::Code {
        Error::from(self).code
    }
}
