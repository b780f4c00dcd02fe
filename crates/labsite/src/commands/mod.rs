pub mod build;
pub mod config;
pub mod deploy;
pub mod init;
pub mod serve;
