//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr};
use serde::{Deserialize, Serialize};

use crate::domain::user;

/// Authenticated session of a user.
///
/// Decoded from the claims of a token issued by the identity provider.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Session {
    /// ID of the user this [`Session`] belongs to.
    #[serde(rename = "sub")]
    pub user_id: user::Id,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Access token of a [`Session`], as issued by the identity provider.
///
/// Its contents are verified by the [`AuthorizeUserSession`] command only.
///
/// [`AuthorizeUserSession`]: crate::command::AuthorizeUserSession
#[derive(AsRef, Clone, Debug, Display, From, FromStr)]
#[as_ref(str)]
pub struct Token(String);

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;
