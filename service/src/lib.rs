//! Exchange Ledger Engine of a time-bank marketplace.
//!
//! Users publish [`Offer`]s of their time, take each other's [`Offer`]s
//! forming [`Exchange`]s, and settle completed [`Exchange`]s into the
//! append-only ledger their balances are derived from.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod error;
#[cfg(test)]
mod fixture;
pub mod infra;
pub mod query;
pub mod read;

use derive_more::Debug;
use smart_default::SmartDefault;
use tokio::sync::broadcast;

#[cfg(doc)]
use crate::domain::{Exchange, Offer};
#[cfg(doc)]
use infra::Database;
use infra::notification;

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] decoding key, used for verifying tokens issued by the external
    /// identity provider.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// Lists configuration.
    pub list: ListConfig,

    /// [`notification::Channel`] configuration.
    pub notifications: notification::Config,
}

/// Configuration of listing queries.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct ListConfig {
    /// Number of items listed when no limit is requested.
    #[default(50)]
    pub default_limit: usize,

    /// Maximum number of items that may be listed at once.
    #[default(200)]
    pub max_limit: usize,
}

impl ListConfig {
    /// Resolves the effective limit out of the requested one.
    ///
    /// Requested limit is clamped into `1..=max_limit`.
    #[must_use]
    pub fn limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`notification::Channel`] of this [`Service`].
    notifications: notification::Channel,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Config, database: Db) -> Self {
        let notifications = notification::Channel::new(config.notifications);
        Self {
            config,
            database,
            notifications,
        }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`notification::Channel`] of this [`Service`].
    #[must_use]
    pub fn notifications(&self) -> &notification::Channel {
        &self.notifications
    }

    /// Subscribes to [`notification::Event`]s about [`Offer`] and
    /// [`Exchange`] transitions happening in this [`Service`].
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<notification::Event> {
        self.notifications.subscribe()
    }
}

#[cfg(test)]
mod spec {
    use super::ListConfig;

    #[test]
    fn resolves_list_limit() {
        let conf = ListConfig::default();

        assert_eq!(conf.limit(None), 50);
        assert_eq!(conf.limit(Some(10)), 10);
        assert_eq!(conf.limit(Some(0)), 1);
        assert_eq!(conf.limit(Some(1000)), 200);
    }
}
