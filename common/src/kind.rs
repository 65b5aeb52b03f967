//! Macros for defining status enums.

/// Defines a status enum with explicit [`u8`] codes.
///
/// Statuses are rendered and parsed in `snake_case`, and stored in Postgres
/// as `INT2` codes (when the calling crate has its `postgres` feature on).
///
/// # Example
///
/// ```rust
/// use common::define_kind;
///
/// define_kind! {
///     #[doc = "Door status."]
///     enum Status {
///         #[doc = "Door is open."]
///         Open = 1,
///
///         #[doc = "Door is locked."]
///         Locked = 2,
///     }
/// }
///
/// assert_eq!(Status::Locked.to_string(), "locked");
/// assert_eq!(Status::from_code(1), Some(Status::Open));
/// assert_eq!(Status::from_code(3), None);
/// ```
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident = $code:literal
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::EnumString,
            Eq,
            Hash,
            PartialEq,
        )]
        #[doc = $doc]
        #[repr(u8)]
        #[strum(serialize_all = "snake_case")]
        pub enum $name {
            $(
                #[doc = $variant_doc]
                $variant = $code,
            )*
        }

        impl $name {
            /// All the variants, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Returns the code of this status.
            #[must_use]
            pub const fn code(self) -> u8 {
                self as u8
            }

            /// Looks up the status having the provided code.
            #[must_use]
            pub const fn from_code(code: u8) -> Option<Self> {
                match code {
                    $( $code => Some(Self::$variant), )*
                    _ => None,
                }
            }
        }

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            $crate::private::postgres_types::accepts!(INT2);

            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &[u8],
            ) -> Result<
                Self,
                Box<dyn ::std::error::Error
                    + ::core::marker::Sync
                    + ::core::marker::Send>,
            > {
                let code = u8::try_from(i16::from_sql(ty, raw)?)?;
                Self::from_code(code).ok_or_else(|| {
                    ::std::format!(
                        "unknown `{}` code: {code}",
                        ::core::stringify!($name),
                    )
                    .into()
                })
            }
        }

        #[cfg(feature = "postgres")]
        impl $crate::private::postgres_types::ToSql for $name {
            $crate::private::postgres_types::accepts!(INT2);
            $crate::private::postgres_types::to_sql_checked!();

            fn to_sql(
                &self,
                ty: &$crate::private::postgres_types::Type,
                w: &mut $crate::private::postgres_types::private::BytesMut,
            ) -> Result<
                $crate::private::postgres_types::IsNull,
                ::std::boxed::Box<
                    dyn ::std::error::Error
                        + ::core::marker::Sync
                        + ::core::marker::Send
                >,
            > {
                i16::from(self.code()).to_sql(ty, w)
            }
        }
    };
}
