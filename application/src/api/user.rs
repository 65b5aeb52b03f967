//! User-related definitions.
//!
//! Users themselves are managed by the external identity provider, so only
//! their identifiers are exposed.

use derive_more::{Display, From, Into};
use juniper::GraphQLScalar;
use service::domain;
use uuid::Uuid;

/// Unique identifier of a `User`.
#[derive(Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq)]
#[from(domain::user::Id)]
#[into(domain::user::Id)]
#[graphql(name = "UserId", transparent)]
pub struct Id(Uuid);
