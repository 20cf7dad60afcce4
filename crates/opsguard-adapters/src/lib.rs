pub mod memory;
pub mod notify;
pub mod persistence;

pub use persistence::sqlite::SqliteDb;
