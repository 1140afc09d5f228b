//! Command handlers: translate parsed arguments into service calls and
//! render the results. No business logic lives here.

pub mod completions;
pub mod config;
pub mod generate;
pub mod init;
pub mod provider;
