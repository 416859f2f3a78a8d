//! CLI command implementations

pub mod cleanup;
pub mod delete;
pub mod history;
pub mod init;
pub mod list;
pub mod load;
pub mod save;
pub mod tree;
pub mod wipe;
