//! Ready-made sections for common services.
//!
//! Import the module in a build script and pass the types to
//! [`build_configs!`](crate::build_configs):
//!
//! ```
//! use layercfg::presets;
//!
//! layercfg::build_configs!(presets::PostgresConfig {
//!     host: "localhost".to_owned(),
//!     port: "5432".to_owned(),
//!     ..Default::default()
//! });
//! ```

use serde::{Deserialize, Serialize};

/// HTTP listener settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host name or address to bind.
    pub host: String,
    /// Port to bind.
    pub port: String,
}

/// gRPC listener settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrpcServerConfig {
    /// Host name or address to bind.
    pub host: String,
    /// Port to bind.
    pub port: String,
}

/// `PostgreSQL` connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgresConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: String,
    /// Login role.
    pub user: String,
    /// Login password.
    pub password: String,
    /// Database name.
    pub database: String,
}

/// Redis connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis host.
    pub host: String,
    /// Redis port.
    pub port: String,
    /// ACL user.
    pub user: String,
    /// ACL password.
    pub password: String,
    /// Logical database index.
    pub db: i64,
}

/// `RabbitMQ` broker settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RabbitMqConfig {
    /// Broker host.
    pub host: String,
    /// Broker port.
    pub port: String,
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Minimum level, for example `info` or `debug`.
    pub level: String,
}
