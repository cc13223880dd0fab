// Code generated by cargo-layercfg 0.1.0: DO NOT EDIT.
// source: src/settings/config.rs
// module: layercfg_fixture::settings
#![cfg(not(layercfg))]
#![allow(unused_imports)]

use layercfg::presets;
use serde::{Deserialize, Serialize};

/// Sections merged into [`Config`].
pub mod sections {
    use super::*;

    /// Copy of `layercfg::presets::HttpServerConfig`.
    #[derive(Debug, Clone, Default, ::serde::Deserialize, ::serde::Serialize)]
    pub struct HttpServerConfig {
        /// Host name or address to bind.
        #[serde(rename = "host")]
        pub host: String,
        /// Port to bind.
        #[serde(rename = "port")]
        pub port: String,
    }

    /// Copy of `layercfg::presets::RedisConfig`.
    #[derive(Debug, Clone, Default, ::serde::Deserialize, ::serde::Serialize)]
    pub struct RedisConfig {
        /// Redis host.
        #[serde(rename = "host")]
        pub host: String,
        /// Redis port.
        #[serde(rename = "port")]
        pub port: String,
        /// ACL user.
        #[serde(rename = "user")]
        pub user: String,
        /// ACL password.
        #[serde(rename = "password")]
        pub password: String,
        /// Logical database index.
        #[serde(rename = "db")]
        pub db: i64,
    }

    /// Copy of `layercfg_fixture::settings::OidcConfig`.
    #[derive(Debug, Clone, Default, ::serde::Deserialize, ::serde::Serialize)]
    pub struct OidcConfig {
        /// Issuer URL.
        #[serde(rename = "issuer")]
        pub issuer: String,
        /// OAuth client identifier.
        #[serde(default)]
        #[serde(rename = "client_id")]
        pub client_id: String,
        /// Requested scopes.
        #[serde(rename = "scopes")]
        pub scopes: Vec<String>,
    }
}

/// Configuration assembled from the sections declared in `config.rs`.
#[derive(Debug, Clone, ::serde::Deserialize, ::serde::Serialize)]
pub struct Config {
    /// Layer sources applied by `Config::new`.
    #[serde(skip)]
    pub embedding: ::layercfg::Embedding,

    /// The `HttpServerConfig` section.
    #[serde(rename = "http_server_config")]
    pub http_server_config: sections::HttpServerConfig,

    /// The `RedisConfig` section.
    #[serde(rename = "redis_config")]
    pub redis_config: sections::RedisConfig,

    /// The `OidcConfig` section.
    #[serde(rename = "oidc_config")]
    pub oidc_config: sections::OidcConfig,
}

impl ::layercfg::Embedded for Config {
    fn embedding(&self) -> &::layercfg::Embedding {
        &self.embedding
    }

    fn embedding_mut(&mut self) -> &mut ::layercfg::Embedding {
        &mut self.embedding
    }
}

impl Config {
    /// Builds the configuration from its defaults, then the layers selected
    /// by `opts`.
    ///
    /// # Errors
    ///
    /// Returns `LayerError` when a layer cannot be read or merged.
    pub fn new<I>(opts: I) -> ::core::result::Result<Self, ::layercfg::LayerError>
    where
        I: ::core::iter::IntoIterator<Item = ::layercfg::ConfigOption>,
    {
        let mut config = Self::new_default();
        ::layercfg::Embedding::init(&mut config, opts)?;
        ::core::result::Result::Ok(config)
    }

    /// Returns the defaults written in `config.rs`.
    #[must_use]
    pub fn new_default() -> Self {
        Self {
            embedding: ::layercfg::Embedding::default(),
            http_server_config: sections::HttpServerConfig {
                host: "0.0.0.0".to_owned(),
                port: "8080".to_owned(),
            },
            redis_config: sections::RedisConfig {
                host: "localhost".to_owned(),
                port: "6379".to_owned(),
                db: 1,
                ..Default::default()
            },
            oidc_config: sections::OidcConfig {
                issuer: "https://id.example.com".to_owned(),
                ..Default::default()
            },
        }
    }
}

impl ::core::default::Default for Config {
    fn default() -> Self {
        Self::new_default()
    }
}
