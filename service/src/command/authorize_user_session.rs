//! [`Command`] for authorizing a user [`Session`].

use derive_more::{Display, Error, From};
use jsonwebtoken::{Algorithm, Validation};
use tracerr::Traced;

use crate::{
    domain::user::{session, Session},
    error::{Kind, Kinded},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a user [`Session`] out of its
/// [`session::Token`] issued by the identity provider.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db> {
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        Ok(session)
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::JsonWebTokenDecodeError(_) => Kind::Auth,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::Handler as _;
    use jsonwebtoken::{EncodingKey, Header};

    use crate::{
        domain::user::{self, session, Session},
        error::{Kind, Kinded as _},
        fixture,
    };

    use super::AuthorizeUserSession;

    fn token(session: &Session, secret: &[u8]) -> session::Token {
        jsonwebtoken::encode(
            &Header::default(),
            session,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
        .into()
    }

    fn session(ttl: Duration, expired: bool) -> Session {
        let now = session::ExpirationDateTime::now();
        let expires_at = if expired {
            session::ExpirationDateTime::from_unix_timestamp(
                now.unix_timestamp() - i64::try_from(ttl.as_secs()).unwrap(),
            )
            .unwrap()
        } else {
            now + ttl
        };
        Session {
            user_id: user::Id::new(),
            expires_at,
        }
    }

    #[tokio::test]
    async fn authorizes_valid_token() {
        let svc = fixture::service();
        let issued = session(Duration::from_secs(3600), false);

        let authorized = svc
            .execute(AuthorizeUserSession {
                token: token(&issued, fixture::JWT_SECRET),
            })
            .await
            .unwrap();

        assert_eq!(authorized.user_id, issued.user_id);
        assert_eq!(
            authorized.expires_at.unix_timestamp(),
            issued.expires_at.unix_timestamp(),
        );
    }

    #[tokio::test]
    async fn rejects_expired_forged_and_malformed_tokens() {
        let svc = fixture::service();
        let expired = session(Duration::from_secs(3600), true);
        let valid = session(Duration::from_secs(3600), false);

        for token in [
            token(&expired, fixture::JWT_SECRET),
            token(&valid, b"another-secret"),
            session::Token::from("not-a-jwt".to_owned()),
        ] {
            let err = svc
                .execute(AuthorizeUserSession { token })
                .await
                .unwrap_err();
            assert_eq!(err.kind(), Kind::Auth);
        }
    }
}
