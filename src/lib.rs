pub mod capture;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod kiosk;
pub mod ledger;
pub mod notify;
pub mod render;
pub mod session;
