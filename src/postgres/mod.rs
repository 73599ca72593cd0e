// ABOUTME: PostgreSQL driver access for probes and diagnostics
// ABOUTME: Exports connection helpers, the connectivity prober, and the info reporter

pub mod connection;
pub mod info;

pub use connection::{connect, test_connection, PgProber};
pub use info::{database_info, fetch_database_info, DatabaseInfo};
