//! [`Minutes`]-related definitions.

use std::{iter, ops, str::FromStr};

use derive_more::{Display, From, Into};

/// Signed amount of time, measured in whole minutes.
///
/// Negative values represent debits, positive ones represent credits.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[display("{_0}min")]
pub struct Minutes(i64);

impl Minutes {
    /// Zero [`Minutes`].
    pub const ZERO: Self = Self(0);

    /// Number of [`Minutes`] in one hour.
    const PER_HOUR: i64 = 60;

    /// Creates new [`Minutes`] out of the provided raw amount.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Returns the raw amount of these [`Minutes`].
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Indicates whether these [`Minutes`] are strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns these [`Minutes`] as `i32`, saturating at its bounds.
    #[must_use]
    pub fn saturating_i32(self) -> i32 {
        i32::try_from(self.0)
            .unwrap_or(if self.0 < 0 { i32::MIN } else { i32::MAX })
    }

    /// Converts these [`Minutes`] into fractional hours.
    ///
    /// Exact while the amount stays within `2^53`.
    #[expect(clippy::cast_precision_loss, reason = "exact below 2^53")]
    #[must_use]
    pub fn hours(self) -> f64 {
        self.0 as f64 / Self::PER_HOUR as f64
    }

    /// Converts these [`Minutes`] into fractional minutes, exact while the
    /// amount stays within `2^53`.
    #[expect(clippy::cast_precision_loss, reason = "exact below 2^53")]
    #[must_use]
    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }

    /// Renders these [`Minutes`] as hours with two decimal places and an
    /// explicit sign, like `+1.50` or `-0.25`.
    #[must_use]
    pub fn to_hours_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "+" };
        let abs = self.0.unsigned_abs();
        let per_hour = Self::PER_HOUR.unsigned_abs();
        let (whole, rest) = (abs / per_hour, abs % per_hour);
        // Hundredths of an hour, rounded half up. Never reaches `100`, as
        // `rest` is at most `59`.
        let hundredths = (rest * 100 * 2 + per_hour) / (per_hour * 2);
        format!("{sign}{whole}.{hundredths:02}")
    }

    /// Adds the provided [`Minutes`], returning [`None`] on overflow.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

impl FromStr for Minutes {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let amount = s.strip_suffix("min").unwrap_or(s).trim_end();
        if amount.is_empty() {
            return Err("empty amount");
        }
        amount.parse().map(Self).map_err(|_| "invalid amount")
    }
}

impl ops::Neg for Minutes {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl ops::Add for Minutes {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl iter::Sum for Minutes {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, ops::Add::add)
    }
}

impl<'a> iter::Sum<&'a Minutes> for Minutes {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(feature = "postgres")]
mod postgres {
    //! Module providing integration with [`postgres_types`] crate.

    use std::error::Error as StdError;

    use postgres_types::{
        accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql,
        Type,
    };

    use super::Minutes;

    impl FromSql<'_> for Minutes {
        accepts!(INT8);

        fn from_sql(
            ty: &Type,
            raw: &[u8],
        ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
            i64::from_sql(ty, raw).map(Self)
        }
    }

    impl ToSql for Minutes {
        accepts!(INT8);
        to_sql_checked!();

        fn to_sql(
            &self,
            ty: &Type,
            w: &mut BytesMut,
        ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
            self.0.to_sql(ty, w)
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use super::Minutes;

    #[test]
    fn from_str() {
        assert_eq!(Minutes::from_str("60min").unwrap(), Minutes::new(60));
        assert_eq!(Minutes::from_str("-15min").unwrap(), Minutes::new(-15));
        assert_eq!(Minutes::from_str("90").unwrap(), Minutes::new(90));
        assert_eq!(Minutes::from_str(" 45 min ").unwrap(), Minutes::new(45));

        assert!(Minutes::from_str("").is_err());
        assert!(Minutes::from_str("min").is_err());
        assert!(Minutes::from_str("1.5min").is_err());
        assert!(Minutes::from_str("an hour").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(Minutes::new(60).to_string(), "60min");
        assert_eq!(Minutes::new(-60).to_string(), "-60min");
        assert_eq!(Minutes::ZERO.to_string(), "0min");
    }

    #[test]
    fn to_hours_string() {
        assert_eq!(Minutes::new(60).to_hours_string(), "+1.00");
        assert_eq!(Minutes::new(90).to_hours_string(), "+1.50");
        assert_eq!(Minutes::new(-15).to_hours_string(), "-0.25");
        assert_eq!(Minutes::new(1).to_hours_string(), "+0.02");
        assert_eq!(Minutes::new(59).to_hours_string(), "+0.98");
        assert_eq!(Minutes::ZERO.to_hours_string(), "+0.00");
    }

    #[test]
    fn sums_signed_amounts() {
        let total: Minutes = [60, -15, -45, 30]
            .into_iter()
            .map(Minutes::new)
            .sum();

        assert_eq!(total, Minutes::new(30));
        assert!((Minutes::new(-90).hours() + 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn exceeds_i32_range() {
        let max = Minutes::new(i32::MAX.into());

        let total = max.checked_add(max).unwrap();

        assert_eq!(total.get(), 2 * i64::from(i32::MAX));
        assert_eq!(total.saturating_i32(), i32::MAX);
        assert_eq!((-total).saturating_i32(), i32::MIN);
        assert_eq!(Minutes::new(-5).saturating_i32(), -5);
        assert!(Minutes::new(i64::MAX).checked_add(Minutes::new(1)).is_none());
    }
}
