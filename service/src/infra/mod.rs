//! Infrastructure layer.

pub mod database;
pub mod notifier;

pub use self::database::Database;
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
pub use self::notifier::Notifier;
