pub mod config;
pub mod relay;
pub mod startup;
pub mod state;
