pub mod config_cmd;
pub mod keys_cmd;
pub mod listing;
pub mod output;
pub mod renderer;
