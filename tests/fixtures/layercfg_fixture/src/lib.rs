//! Sample package whose settings are generated by `cargo-layercfg`.

pub mod settings;
