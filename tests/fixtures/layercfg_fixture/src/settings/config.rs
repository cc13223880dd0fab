#![cfg(layercfg)]

use layercfg::presets;
use serde::{Deserialize, Serialize};

/// Identity provider settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OidcConfig {
    /// Issuer URL.
    pub issuer: String,
    /// OAuth client identifier.
    #[serde(default)]
    pub client_id: String,
    /// Requested scopes.
    pub scopes: Vec<String>,
}

/// Toggles that are not part of the layered configuration.
#[derive(Debug, Default)]
pub struct FeatureFlags {
    pub beta: bool,
}

fn main() {
    layercfg::build_configs!(
        presets::HttpServerConfig {
            host: "0.0.0.0".to_owned(),
            port: "8080".to_owned(),
        },
        &presets::RedisConfig {
            host: "localhost".to_owned(),
            port: "6379".to_owned(),
            db: 1,
            ..Default::default()
        },
        OidcConfig {
            issuer: "https://id.example.com".to_owned(),
            ..Default::default()
        },
        FeatureFlags::default(),
    );
}
