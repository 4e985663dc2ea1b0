// Scorelink - live match score companion
// Library exports

pub mod cli;
pub mod config;
pub mod score;
pub mod service;
