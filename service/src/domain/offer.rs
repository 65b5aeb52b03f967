//! [`Offer`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Minutes};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;

/// Time-based service a user is willing to provide.
#[derive(Clone, Debug)]
pub struct Offer {
    /// ID of this [`Offer`].
    pub id: Id,

    /// ID of the user who published this [`Offer`].
    pub owner_id: user::Id,

    /// [`Title`] of this [`Offer`].
    pub title: Title,

    /// [`Description`] of this [`Offer`], if any.
    pub description: Option<Description>,

    /// [`Category`] of this [`Offer`], if any.
    pub category: Option<Category>,

    /// [`LocationHint`] of this [`Offer`], if any.
    pub location_hint: Option<LocationHint>,

    /// [`Duration`] of the service, being the time value of any exchange
    /// taking this [`Offer`].
    pub duration: Duration,

    /// [`Status`] of this [`Offer`].
    pub status: Status,

    /// [`DateTime`] when this [`Offer`] was created.
    pub created_at: CreationDateTime,
}

impl Offer {
    /// Indicates whether the provided user owns this [`Offer`].
    #[must_use]
    pub fn is_owned_by(&self, user_id: user::Id) -> bool {
        self.owner_id == user_id
    }

    /// Returns a copy of this [`Offer`] in the provided [`Status`].
    #[must_use]
    pub fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

/// ID of an [`Offer`].
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

/// Title of an [`Offer`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Title(String);

impl Title {
    /// Maximum length of a [`Title`] (in bytes).
    pub const MAX_LEN: usize = 256;

    /// Creates a new [`Title`] out of the provided `title`, trimming it.
    ///
    /// [`None`] is returned if the trimmed `title` is empty or too long.
    #[must_use]
    pub fn new(title: impl AsRef<str>) -> Option<Self> {
        let title = title.as_ref().trim();
        (!title.is_empty() && title.len() <= Self::MAX_LEN)
            .then(|| Self(title.to_owned()))
    }
}

/// Description of an [`Offer`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] out of the provided `text`, trimming it.
    ///
    /// [`None`] is returned if the trimmed `text` is empty.
    #[must_use]
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let text = text.as_ref().trim();
        (!text.is_empty()).then(|| Self(text.to_owned()))
    }
}

/// Category of an [`Offer`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Category(String);

impl Category {
    /// Creates a new [`Category`] out of the provided `name`, trimming it.
    ///
    /// [`None`] is returned if the trimmed `name` is empty.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Option<Self> {
        let name = name.as_ref().trim();
        (!name.is_empty()).then(|| Self(name.to_owned()))
    }
}

/// Free-form hint about where an [`Offer`] takes place.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct LocationHint(String);

impl LocationHint {
    /// Creates a new [`LocationHint`] out of the provided `hint`, trimming it.
    ///
    /// [`None`] is returned if the trimmed `hint` is empty.
    #[must_use]
    pub fn new(hint: impl AsRef<str>) -> Option<Self> {
        let hint = hint.as_ref().trim();
        (!hint.is_empty()).then(|| Self(hint.to_owned()))
    }
}

/// Strictly positive amount of [`Minutes`] an [`Offer`] is worth, capped at
/// [`Duration::MAX`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Duration(Minutes);

impl Duration {
    /// Maximum [`Duration`]: one year of continuous work.
    pub const MAX: Minutes = Minutes::new(365 * 24 * 60);

    /// Creates a new [`Duration`] out of the provided [`Minutes`].
    ///
    /// [`None`] is returned if the [`Minutes`] are not positive, or exceed
    /// [`Duration::MAX`].
    #[must_use]
    pub fn new(minutes: Minutes) -> Option<Self> {
        (minutes.is_positive() && minutes <= Self::MAX)
            .then_some(Self(minutes))
    }

    /// Returns the [`Minutes`] of this [`Duration`].
    #[must_use]
    pub const fn minutes(self) -> Minutes {
        self.0
    }
}

define_kind! {
    #[doc = "Status of an [`Offer`]."]
    enum Status {
        #[doc = "[`Offer`] can be taken."]
        Open = 1,

        #[doc = "[`Offer`] has been taken by someone."]
        Taken = 2,

        #[doc = "[`Offer`] has been closed after being fulfilled."]
        Closed = 3,

        #[doc = "[`Offer`] has been withdrawn by its owner."]
        Cancelled = 4,
    }
}

/// [`DateTime`] when an [`Offer`] was created.
pub type CreationDateTime = DateTimeOf<(Offer, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::Minutes;

    use super::{Duration, Status, Title};

    #[test]
    fn title_is_trimmed_and_required() {
        let title = Title::new("  Guitar lessons ").unwrap();

        assert_eq!(AsRef::<str>::as_ref(&title), "Guitar lessons");
        assert!(Title::new("").is_none());
        assert!(Title::new("   ").is_none());
        assert!(Title::new("x".repeat(Title::MAX_LEN + 1)).is_none());
    }

    #[test]
    fn duration_is_positive_and_bounded() {
        let minutes = Minutes::new(60);
        assert_eq!(Duration::new(minutes).unwrap().minutes(), minutes);
        assert_eq!(
            Duration::new(Duration::MAX).unwrap().minutes(),
            Duration::MAX,
        );

        assert!(Duration::new(Minutes::ZERO).is_none());
        assert!(Duration::new(Minutes::new(-30)).is_none());
        assert!(Duration::new(Minutes::new(Duration::MAX.get() + 1)).is_none());
        assert!(Duration::new(Minutes::new(i32::MAX.into())).is_none());
    }

    #[test]
    fn status_renders_in_snake_case() {
        assert_eq!(Status::Open.to_string(), "open");
        assert_eq!("cancelled".parse::<Status>().unwrap(), Status::Cancelled);
    }
}
