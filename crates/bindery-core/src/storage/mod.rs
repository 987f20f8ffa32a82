pub mod models;
mod queries;
mod sqlite;

pub use queries::AttachOutcome;
pub use sqlite::Database;
