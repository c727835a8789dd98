pub mod config;
pub mod enemy;
pub mod grid;
pub mod maze;
pub mod placement;
pub mod rng;
pub mod server_protocol;
pub mod server_utils;
pub mod session;
pub mod types;
