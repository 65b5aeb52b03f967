//! [`Config`]-related definitions.

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use service::infra::postgres;
use smart_default::SmartDefault;

/// Configuration of the whole server.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: Server,

    /// Business rules and limits of the [`Service`].
    ///
    /// [`Service`]: service::Service
    pub service: Service,

    /// Database settings.
    pub postgres: Postgres,

    /// Logging settings.
    pub log: Log,
}

impl Config {
    /// Loads the [`Config`] from the TOML file at the provided `path`.
    ///
    /// The file is optional. Any field may be overridden with a `CONF.`
    /// prefixed environment variable (`CONF.server.port=8081`, for example),
    /// and missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// If the file or the environment hold malformed values.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// HTTP server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Address to listen on.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to listen on.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// Origins allowed to call the API.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// [JWT] secret shared with the identity provider issuing the tokens.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default("secret".to_owned())]
    pub jwt_secret: String,

    /// Notifications configuration.
    pub notifications: Notifications,

    /// Lists configuration.
    pub list: List,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service {
            jwt_secret,
            notifications: Notifications { capacity },
            list:
                List {
                    default_limit,
                    max_limit,
                },
        } = value;
        Self {
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            list: service::ListConfig {
                default_limit,
                max_limit,
            },
            notifications: service::infra::notification::Config { capacity },
        }
    }
}

/// Notifications configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Notifications {
    /// Number of events retained for lagging subscribers.
    #[default(1024)]
    pub capacity: usize,
}

/// Lists configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct List {
    /// Number of items listed when the client requests no limit.
    #[default(50)]
    pub default_limit: usize,

    /// Maximum number of items the client may request at once.
    #[default(200)]
    pub max_limit: usize,
}

/// Postgres connection pool configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host of the Postgres server.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port of the Postgres server.
    #[default(5432)]
    pub port: u16,

    /// Role to authenticate as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password of the `user` role.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Name of the database holding offers, exchanges and the ledger.
    #[default("timebank".to_owned())]
    pub dbname: String,

    /// Maximum number of pooled connections.
    #[default(16)]
    pub pool_size: usize,
}

impl From<Postgres> for postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
            pool_size,
        } = value;
        let mut conf = Self::new();
        conf.host = Some(host);
        conf.port = Some(port);
        conf.user = Some(user);
        conf.password = Some(password);
        conf.dbname = Some(dbname);
        conf.pool = Some(postgres::PoolConfig::new(pool_size));
        conf
    }
}

/// Logging configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Most verbose [`LogLevel`] to output.
    pub level: LogLevel,
}

/// Verbosity of logs.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Everything, including per-statement details.
    Trace,

    /// Diagnostics useful while developing.
    Debug,

    /// Lifecycle events and requests.
    #[default]
    Info,

    /// Recoverable problems only.
    Warn,

    /// Failures only.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use service::infra::postgres;

    use super::{Config, Postgres};

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let conf = Config::new("does-not-exist.toml").unwrap();

        assert_eq!(conf.server.port, 8080);
        assert_eq!(conf.service.list.default_limit, 50);
        assert_eq!(conf.service.list.max_limit, 200);
        assert_eq!(conf.service.notifications.capacity, 1024);
    }

    #[test]
    fn postgres_pool_is_sized() {
        let conf = postgres::Config::from(Postgres {
            pool_size: 4,
            ..Postgres::default()
        });

        assert_eq!(conf.dbname.as_deref(), Some("timebank"));
        assert_eq!(conf.pool.map(|p| p.max_size), Some(4));
    }
}
