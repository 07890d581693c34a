//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, or if secure
    /// sessions are signed with the default [`Service::secret`].
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        let config: Self = ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()?;
        config.ensure_secret()?;
        Ok(config)
    }

    /// Ensures the default [`Service::secret`] is not used along with secure
    /// session cookies.
    fn ensure_secret(&self) -> Result<(), ConfigError> {
        if self.server.session.secure
            && self.service.secret.expose_secret() == Service::DEFAULT_SECRET
        {
            return Err(ConfigError::Message(
                "`service.secret` must be set when `server.session.secure` \
                 is enabled"
                    .into(),
            ));
        }
        Ok(())
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,

    /// Session cookie configuration.
    pub session: Session,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    ///
    /// Credentials are allowed, so a wildcard origin cannot be used here.
    pub origins: Vec<String>,
}

/// Session cookie configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Session {
    /// Name of the cookie.
    #[default("meet-session".to_owned())]
    pub name: String,

    /// Indicator whether the cookie is sent over HTTPS only.
    pub secure: bool,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// Secret used for sealing sessions and links.
    #[default(SecretString::from(Service::DEFAULT_SECRET))]
    pub secret: SecretString,

    /// Public URL of the application, used in links sent by email.
    #[default("http://localhost:8080".to_owned())]
    pub base_url: String,

    /// Email address people may contact for support.
    #[default("support@localhost".to_owned())]
    pub support_email: String,

    /// Lifetime of login and registration links.
    #[default(service::Config::DEFAULT_VERIFICATION_TTL)]
    #[serde(with = "humantime_serde")]
    pub verification_ttl: time::Duration,
}

impl Service {
    /// Default [`Service::secret`], suitable for local development only.
    pub const DEFAULT_SECRET: &'static str = "secret";
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service {
            secret,
            base_url,
            support_email,
            verification_ttl,
        } = value;

        Self {
            verification_ttl,
            ..Self::new(
                secret.expose_secret().as_bytes(),
                base_url,
                support_email,
            )
        }
    }
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
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
    use std::time::Duration;

    use secrecy::SecretString;

    use super::{Config, Server, Service, Session};

    #[test]
    fn defaults_without_file() {
        let config = Config::new("non-existent.toml").unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.session.name, "meet-session");
        assert!(!config.server.session.secure);
        assert!(config.server.cors.origins.is_empty());
        assert_eq!(
            config.service.verification_ttl,
            Duration::from_secs(15 * 60),
        );
    }

    #[test]
    fn converts_into_service_config() {
        let config = service::Config::from(Service {
            base_url: "https://meet.example.com/".into(),
            verification_ttl: Duration::from_secs(60),
            ..Service::default()
        });

        assert_eq!(config.base_url, "https://meet.example.com");
        assert_eq!(config.support_email, "support@localhost");
        assert_eq!(config.verification_ttl, Duration::from_secs(60));
    }

    #[test]
    fn requires_secret_for_secure_sessions() {
        let mut config = Config {
            server: Server {
                session: Session {
                    secure: true,
                    ..Session::default()
                },
                ..Server::default()
            },
            ..Config::default()
        };

        assert!(config.ensure_secret().is_err());

        config.service.secret = SecretString::from("s3cr3t-from-env");
        assert!(config.ensure_secret().is_ok());

        config.server.session.secure = false;
        config.service.secret = SecretString::from(Service::DEFAULT_SECRET);
        assert!(config.ensure_secret().is_ok());
    }
}
