//! [`Query`] collection related to a single [`Exchange`].

use common::operations::By;

use crate::domain::{exchange, Exchange};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries an [`Exchange`] by its [`exchange::Id`].
pub type ById = DatabaseQuery<By<Option<Exchange>, exchange::Id>>;
