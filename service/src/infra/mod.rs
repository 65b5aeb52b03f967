//! Infrastructure layer.

pub mod database;
pub mod notification;

pub use self::database::Database;
#[cfg(any(feature = "memory", test))]
pub use self::database::{memory, Memory};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
