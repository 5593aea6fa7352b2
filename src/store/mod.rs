//! Embedded key-value engine shared by the reference backends.

mod schema;
mod sqlite;

pub use sqlite::{Bucket, SqliteKv};
