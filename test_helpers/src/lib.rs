//! Test helpers shared across crates.
//!
//! [`fixture`] builds scratch Cargo packages on disk for generator tests and
//! [`figment`] wraps `figment::Jail` for runtime loader tests.

pub mod figment;
pub mod fixture;
