pub mod add;
pub mod completions;
pub mod config;
pub mod init;
pub mod log;
pub mod show;
pub mod status;
pub mod update;
