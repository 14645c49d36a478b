pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod export;
pub mod interactive;
pub mod join;
pub mod loader;
pub mod store;
pub mod view;
