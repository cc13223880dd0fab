//! Service settings generated from `config.rs`.

#[cfg(layercfg)]
mod config;
#[cfg(not(layercfg))]
mod config_gen;

#[cfg(not(layercfg))]
pub use config_gen::{Config, sections};
