pub mod config;
pub mod renderer;
pub mod runner;
