pub mod backend;
pub mod capture;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod request;
pub mod transport;
pub mod ui;
