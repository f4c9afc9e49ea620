pub mod app;
pub mod availability;
pub mod cli;
pub mod config;
pub mod fmt;
pub mod logging;
pub mod ombi;
pub mod render;
pub mod store;
pub mod utils;
