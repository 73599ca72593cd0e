// ABOUTME: Command implementations for each CLI action
// ABOUTME: Exports backup, restore, migrate, info, test, and deploy commands

pub mod backup;
pub mod deploy;
pub mod info;
pub mod migrate;
pub mod restore;
pub mod test_connections;

pub use backup::backup;
pub use deploy::{deploy_instructions, Platform};
pub use info::info;
pub use migrate::migrate;
pub use restore::restore;
pub use test_connections::test_connections;
