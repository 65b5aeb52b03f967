//! [`DateTime`]-related definitions.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{cmp::Ordering, fmt, marker::PhantomData, ops, time::Duration};

#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{format_description::well_known::Rfc3339, OffsetDateTime, UtcOffset};

/// [`DateTimeOf`] not bound to any particular kind.
pub type DateTime = DateTimeOf;

/// Point in time in UTC, with a microsecond precision.
///
/// `Of` marks what this point in time describes, so the creation time of one
/// entity can't be mistaken for the expiration time of another. Use
/// [`DateTimeOf::coerce()`] to convert between the kinds explicitly.
pub struct DateTimeOf<Of: ?Sized = ()> {
    /// Normalized [`OffsetDateTime`].
    inner: OffsetDateTime,

    /// Kind of this [`DateTimeOf`].
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateTimeOf<Of> {
    /// Wraps the provided [`OffsetDateTime`], converting it into UTC and
    /// truncating it to microseconds, as Postgres stores them.
    fn normalized(dt: OffsetDateTime) -> Self {
        let utc = dt.to_offset(UtcOffset::UTC);
        Self {
            inner: utc.replace_microsecond(utc.microsecond()).unwrap_or(utc),
            _of: PhantomData,
        }
    }

    /// Returns the current [`DateTimeOf`].
    #[must_use]
    pub fn now() -> Self {
        Self::normalized(OffsetDateTime::now_utc())
    }

    /// Creates a [`DateTimeOf`] out of the provided Unix timestamp (in
    /// seconds).
    ///
    /// [`None`] is returned if the timestamp is out of the supported range.
    #[must_use]
    pub fn from_unix_timestamp(timestamp: i64) -> Option<Self> {
        OffsetDateTime::from_unix_timestamp(timestamp)
            .ok()
            .map(Self::normalized)
    }

    /// Returns the Unix timestamp (in seconds) of this [`DateTimeOf`].
    #[must_use]
    pub fn unix_timestamp(&self) -> i64 {
        self.inner.unix_timestamp()
    }

    /// Parses a [`DateTimeOf`] out of the provided [RFC 3339] string.
    ///
    /// # Errors
    ///
    /// If the `input` is not an [RFC 3339] date and time.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub fn from_rfc3339(input: &str) -> Result<Self, time::error::Parse> {
        OffsetDateTime::parse(input, &Rfc3339).map(Self::normalized)
    }

    /// Renders this [`DateTimeOf`] as an [RFC 3339] string.
    ///
    /// Years beyond the [RFC 3339] range are rendered in the ISO 8601
    /// extended format instead.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.inner
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.inner.to_string())
    }

    /// Converts this [`DateTimeOf`] into another kind.
    #[must_use]
    pub fn coerce<NewOf: ?Sized>(self) -> DateTimeOf<NewOf> {
        DateTimeOf {
            inner: self.inner,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> fmt::Debug for DateTimeOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DateTime({})", self.to_rfc3339())
    }
}

impl<Of: ?Sized> fmt::Display for DateTimeOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl<Of: ?Sized> Copy for DateTimeOf<Of> {}
impl<Of: ?Sized> Clone for DateTimeOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateTimeOf<Of> {}
impl<Of: ?Sized> PartialEq for DateTimeOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<Of: ?Sized> Ord for DateTimeOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<Of: ?Sized> PartialOrd for DateTimeOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of: ?Sized> ops::Add<Duration> for DateTimeOf<Of> {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self::normalized(self.inner + rhs)
    }
}

/// Time elapsed from `rhs` till `self`.
///
/// [`Duration::ZERO`] if `rhs` is later than `self`.
impl<Of: ?Sized> ops::Sub for DateTimeOf<Of> {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        (self.inner - rhs.inner).try_into().unwrap_or(Duration::ZERO)
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> FromSql<'_> for DateTimeOf<Of> {
    accepts!(TIMESTAMPTZ);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        OffsetDateTime::from_sql(ty, raw).map(Self::normalized)
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> ToSql for DateTimeOf<Of> {
    accepts!(TIMESTAMPTZ);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.inner.to_sql(ty, w)
    }
}

#[cfg(feature = "serde")]
pub mod serde {
    //! [`serde`] representations of [`DateTimeOf`].

    pub mod unix_timestamp {
        //! [`DateTimeOf`] represented as a Unix timestamp in seconds, like
        //! in the `exp` claim of a JSON Web Token.
        //!
        //! [`DateTimeOf`]: super::super::DateTimeOf

        use serde::{de::Error as _, Deserialize as _, Deserializer, Serializer};

        use crate::DateTimeOf;

        /// Serializes the provided [`DateTimeOf`] as a Unix timestamp.
        ///
        /// # Errors
        ///
        /// If the `serializer` fails.
        pub fn serialize<Of, S>(
            dt: &DateTimeOf<Of>,
            serializer: S,
        ) -> Result<S::Ok, S::Error>
        where
            Of: ?Sized,
            S: Serializer,
        {
            serializer.serialize_i64(dt.unix_timestamp())
        }

        /// Deserializes a [`DateTimeOf`] out of a Unix timestamp.
        ///
        /// # Errors
        ///
        /// If the timestamp is not an integer or is out of range.
        pub fn deserialize<'de, Of, D>(
            deserializer: D,
        ) -> Result<DateTimeOf<Of>, D::Error>
        where
            Of: ?Sized,
            D: Deserializer<'de>,
        {
            let timestamp = i64::deserialize(deserializer)?;
            DateTimeOf::from_unix_timestamp(timestamp).ok_or_else(|| {
                D::Error::custom(format!("timestamp out of range: {timestamp}"))
            })
        }
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Date and time in a [RFC 3339] format with a microsecond precision.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[graphql_scalar(with = Self, parse_token(String))]
    type DateTime = crate::DateTime;

    impl DateTime {
        fn to_output<S: ScalarValue>(dt: &DateTime) -> Value<S> {
            Value::scalar(dt.to_rfc3339())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            let s = input.as_string_value().ok_or_else(|| {
                format!("Expected `DateTime` string, found: {input}")
            })?;
            Self::from_rfc3339(s)
                .map_err(|e| format!("Invalid `DateTime` string: {e}"))
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use super::DateTime;

    #[test]
    fn sub_saturates_in_the_past() {
        let earlier = DateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let later = earlier + Duration::from_secs(90);

        assert_eq!(later - earlier, Duration::from_secs(90));
        assert_eq!(earlier - later, Duration::ZERO);
    }

    #[test]
    fn parses_rfc3339_in_utc() {
        let dt = DateTime::from_rfc3339("2024-03-01T12:00:00+03:00").unwrap();

        assert_eq!(dt.to_rfc3339(), "2024-03-01T09:00:00Z");
        assert!(DateTime::from_rfc3339("yesterday").is_err());
    }

    #[test]
    fn truncates_to_microseconds() {
        let dt = DateTime::from_rfc3339("2024-03-01T09:00:00.123456789Z")
            .unwrap();

        assert_eq!(dt.to_rfc3339(), "2024-03-01T09:00:00.123456Z");
        assert!(dt < dt + Duration::from_micros(1));
    }
}
