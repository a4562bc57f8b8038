pub mod api_client;
pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod poller;
pub mod session;
pub mod ui;
pub mod utils;
