//! Units distinguishing [`DateTimeOf`] kinds.
//!
//! [`DateTimeOf`]: crate::DateTimeOf

/// Moment an entity was created at.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Moment an entity stops being valid at.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
