//! [`Report`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{exchange, offer, user};
#[cfg(doc)]
use crate::domain::{Exchange, Offer};

/// Complaint of a user about another user's conduct, optionally concerning a
/// specific [`Offer`] or [`Exchange`].
#[derive(Clone, Debug)]
pub struct Report {
    /// ID of this [`Report`].
    pub id: Id,

    /// ID of the user who filed this [`Report`].
    pub reporter_id: user::Id,

    /// ID of the reported user.
    pub target_user_id: user::Id,

    /// ID of the [`Offer`] this [`Report`] concerns, if any.
    pub offer_id: Option<offer::Id>,

    /// ID of the [`Exchange`] this [`Report`] concerns, if any.
    pub exchange_id: Option<exchange::Id>,

    /// [`Reason`] of this [`Report`].
    pub reason: Reason,

    /// Additional [`Note`] of the reporter, if any.
    pub note: Option<Note>,

    /// [`DateTime`] when this [`Report`] was filed.
    pub created_at: CreationDateTime,
}

/// ID of a [`Report`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Short reason of a [`Report`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Reason(String);

impl Reason {
    /// Maximum length of a [`Reason`] (in bytes).
    pub const MAX_LEN: usize = 256;

    /// Creates a new [`Reason`] out of the provided `reason`, trimming it.
    ///
    /// [`None`] is returned if the trimmed `reason` is empty or too long.
    #[must_use]
    pub fn new(reason: impl AsRef<str>) -> Option<Self> {
        let reason = reason.as_ref().trim();
        (!reason.is_empty() && reason.len() <= Self::MAX_LEN)
            .then(|| Self(reason.to_owned()))
    }
}

/// Free-form note attached to a [`Report`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Note(String);

impl Note {
    /// Creates a new [`Note`] out of the provided `text`, trimming it.
    ///
    /// [`None`] is returned if the trimmed `text` is empty.
    #[must_use]
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let text = text.as_ref().trim();
        (!text.is_empty()).then(|| Self(text.to_owned()))
    }
}

/// [`DateTime`] when a [`Report`] was filed.
pub type CreationDateTime = DateTimeOf<(Report, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Note, Reason};

    #[test]
    fn reason_is_trimmed_and_bounded() {
        let reason = Reason::new(" Rude behaviour\n").unwrap();

        assert_eq!(AsRef::<str>::as_ref(&reason), "Rude behaviour");
        assert!(Reason::new(" \t ").is_none());
        assert!(Reason::new("x".repeat(Reason::MAX_LEN + 1)).is_none());
    }

    #[test]
    fn blank_note_is_absent() {
        assert!(Note::new("   ").is_none());
        assert_eq!(
            Note::new(" came late ").as_ref().map(AsRef::<str>::as_ref),
            Some("came late"),
        );
    }
}
