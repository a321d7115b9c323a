pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod player;
pub mod protocol;
pub mod server_utils;
pub mod sink;
pub mod sync;
pub mod types;
pub mod world;
