// nacosctl - Library root for testing

pub mod auth;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod http_client;
pub mod models;
