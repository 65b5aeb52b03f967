//! [`Exchange`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{offer, user};
#[cfg(doc)]
use crate::domain::Offer;

/// Agreement between a requester and a provider to fulfill an [`Offer`].
#[derive(Clone, Debug)]
pub struct Exchange {
    /// ID of this [`Exchange`].
    pub id: Id,

    /// ID of the [`Offer`] this [`Exchange`] fulfills.
    pub offer_id: offer::Id,

    /// ID of the user who took the [`Offer`].
    pub requester_id: user::Id,

    /// ID of the user who owned the [`Offer`] when it was taken.
    pub provider_id: user::Id,

    /// Time value of this [`Exchange`], copied from the [`Offer`] when it
    /// was taken.
    pub minutes: offer::Duration,

    /// [`Status`] of this [`Exchange`].
    pub status: Status,

    /// [`Cancellation`] details, if this [`Exchange`] was cancelled.
    pub cancellation: Option<Cancellation>,

    /// [`NoShow`] details, if this [`Exchange`] was marked as a no-show.
    pub no_show: Option<NoShow>,

    /// [`DateTime`] when this [`Exchange`] was created.
    pub created_at: CreationDateTime,
}

impl Exchange {
    /// Indicates whether the provided user participates in this
    /// [`Exchange`], either as its requester or its provider.
    #[must_use]
    pub fn is_participant(&self, user_id: user::Id) -> bool {
        self.requester_id == user_id || self.provider_id == user_id
    }

    /// Returns the participant of this [`Exchange`] opposite to the provided
    /// one.
    ///
    /// [`None`] is returned if the provided user doesn't participate in this
    /// [`Exchange`].
    #[must_use]
    pub fn counterparty_of(&self, user_id: user::Id) -> Option<user::Id> {
        if self.requester_id == user_id {
            Some(self.provider_id)
        } else if self.provider_id == user_id {
            Some(self.requester_id)
        } else {
            None
        }
    }

    /// Returns both participants of this [`Exchange`]: the requester first,
    /// then the provider.
    #[must_use]
    pub fn participants(&self) -> [user::Id; 2] {
        [self.requester_id, self.provider_id]
    }
}

/// ID of an [`Exchange`].
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

/// Details of an [`Exchange`] cancellation.
#[derive(Clone, Debug)]
pub struct Cancellation {
    /// ID of the participant who cancelled the [`Exchange`].
    pub by: user::Id,

    /// [`CancellationReason`] provided by the participant, if any.
    pub reason: Option<CancellationReason>,
}

/// Free-form reason of an [`Exchange`] cancellation.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct CancellationReason(String);

impl CancellationReason {
    /// Creates a new [`CancellationReason`] out of the provided `reason`,
    /// trimming it.
    ///
    /// [`None`] is returned if the trimmed `reason` is empty.
    #[must_use]
    pub fn new(reason: impl AsRef<str>) -> Option<Self> {
        let reason = reason.as_ref().trim();
        (!reason.is_empty()).then(|| Self(reason.to_owned()))
    }
}

/// Details of marking an [`Exchange`] as a no-show.
#[derive(Clone, Copy, Debug)]
pub struct NoShow {
    /// ID of the participant who reported the no-show.
    pub by: user::Id,

    /// ID of the participant who didn't show up.
    pub against: user::Id,
}

define_kind! {
    #[doc = "Status of an [`Exchange`]."]
    enum Status {
        #[doc = "[`Exchange`] awaits the provider's acceptance."]
        Pending = 1,

        #[doc = "[`Exchange`] has been accepted by the provider."]
        Accepted = 2,

        #[doc = "[`Exchange`] has been fulfilled and settled."]
        Completed = 3,

        #[doc = "[`Exchange`] has been cancelled by one of its participants."]
        Cancelled = 4,

        #[doc = "One of the [`Exchange`] participants didn't show up."]
        NoShow = 5,
    }
}

impl Status {
    /// Indicates whether this [`Status`] is terminal, so no further
    /// transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }

    /// Indicates whether an [`Exchange`] may transition from this [`Status`]
    /// into the provided one.
    #[must_use]
    pub const fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted | Self::Cancelled)
                | (
                    Self::Accepted,
                    Self::Completed | Self::Cancelled | Self::NoShow,
                )
        )
    }
}

/// [`DateTime`] when an [`Exchange`] was created.
pub type CreationDateTime = DateTimeOf<(Exchange, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::Status;

    #[test]
    fn transitions_follow_lifecycle() {
        use Status as S;

        let allowed = [
            (S::Pending, S::Accepted),
            (S::Pending, S::Cancelled),
            (S::Accepted, S::Completed),
            (S::Accepted, S::Cancelled),
            (S::Accepted, S::NoShow),
        ];
        for &from in S::ALL {
            for &to in S::ALL {
                assert_eq!(
                    from.can_become(to),
                    allowed.contains(&(from, to)),
                    "`{from} -> {to}` transition",
                );
            }
        }
    }

    #[test]
    fn terminal_statuses_never_transition() {
        for &from in Status::ALL.iter().filter(|s| s.is_terminal()) {
            assert!(Status::ALL.iter().all(|&to| !from.can_become(to)));
        }
        assert!(!Status::Pending.is_terminal());
        assert!(!Status::Accepted.is_terminal());
        assert_eq!(Status::NoShow.to_string(), "no_show");
    }
}
