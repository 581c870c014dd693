pub mod birthday;
pub mod config;
pub mod contact;
pub mod dialog;
pub mod error;
pub mod filter;
pub mod io;
pub mod machine;
pub mod paths;
pub mod storage;
pub mod types;
pub mod webhook;

pub use error::{PhonebookError, Result};
