//! Persistence layer: the `Database` trait, its libSQL implementation,
//! schema migrations, and the built-in catalog seed.

pub mod libsql_backend;
pub mod migrations;
pub mod seed;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::Database;
