pub mod config;
pub mod engine;
pub mod formatter;
pub mod gateway;
pub mod logging;
pub mod models;
