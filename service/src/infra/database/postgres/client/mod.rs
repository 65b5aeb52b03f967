//! Postgres database clients.
//!
//! [`NonTx`] runs every statement on its own pooled connection, while [`Tx`]
//! keeps a single connection with a transaction open until it's committed.

pub mod non_tx;
pub mod tx;

pub use self::{non_tx::NonTx, tx::Tx};
