pub mod config;
pub mod contact;
pub mod init;
pub mod list;
pub mod ranges;
