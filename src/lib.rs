// src/lib.rs
pub mod classifier;
pub mod config;
pub mod health;
pub mod metrics;
pub mod prediction;
pub mod server;
