//! Infrastructure layer.

pub mod database;
pub mod email;

pub use self::{database::Database, email::Mailer};
