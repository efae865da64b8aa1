//! Clock and configuration

pub mod config;
pub mod time;
