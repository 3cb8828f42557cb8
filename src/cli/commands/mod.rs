pub mod config;
pub mod migrate;
pub mod token;
pub mod user;
