//! Infrastructure layer.

pub mod database;
pub mod mailer;

#[cfg(any(test, feature = "memory"))]
pub use self::database::Memory;
pub use self::{database::Database, mailer::Mailer};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
