//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod seal;

use std::time::Duration;

use derive_more::Debug;

#[cfg(doc)]
use infra::{Database, Mailer};

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key used for sealing [`seal::Token`]s.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key used for unsealing [`seal::Token`]s.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// Public URL the application is served on, without a trailing slash.
    ///
    /// Links in emails are built upon it.
    pub base_url: String,

    /// Email address people may contact for support.
    pub support_email: String,

    /// Lifetime of login and registration links.
    pub verification_ttl: Duration,
}

impl Config {
    /// Default lifetime of login and registration links.
    pub const DEFAULT_VERIFICATION_TTL: Duration = Duration::from_secs(15 * 60);

    /// Creates a new [`Config`] signing [`seal::Token`]s with the provided
    /// `secret`.
    #[must_use]
    pub fn new(
        secret: &[u8],
        base_url: impl Into<String>,
        support_email: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(secret),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(secret),
            base_url: base_url.trim_end_matches('/').to_owned(),
            support_email: support_email.into(),
            verification_ttl: Self::DEFAULT_VERIFICATION_TTL,
        }
    }

    /// Builds an absolute URL of the provided `path`.
    #[must_use]
    pub fn url(&self, path: impl AsRef<str>) -> String {
        format!("{}/{}", self.base_url, path.as_ref().trim_start_matches('/'))
    }
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, Ml> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Mailer`] of this [`Service`].
    mailer: Ml,
}

impl<Db, Ml> Service<Db, Ml> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Config, database: Db, mailer: Ml) -> Self {
        Self {
            config,
            database,
            mailer,
        }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Mailer`] of this [`Service`].
    #[must_use]
    pub fn mailer(&self) -> &Ml {
        &self.mailer
    }
}

#[cfg(test)]
pub(crate) mod spec {
    //! Helpers shared by unit tests.

    use std::sync::{Arc, Mutex, PoisonError};

    use common::operations::Deliver;
    use tracerr::Traced;

    use crate::{
        domain::Email,
        infra::{database::Memory, mailer},
        Config, Service,
    };

    /// [`Service`] used in tests.
    pub(crate) type TestService = Service<Memory, Outbox>;

    /// Creates a new [`TestService`] on top of the provided [`Memory`].
    pub(crate) fn service(db: Memory) -> TestService {
        service_with_secret(db, "secret")
    }

    /// Creates a new [`TestService`] sealing with the provided `secret`.
    pub(crate) fn service_with_secret(db: Memory, secret: &str) -> TestService {
        service_with(db, secret, Outbox::default())
    }

    /// Creates a new [`TestService`] delivering into the provided [`Outbox`].
    pub(crate) fn service_with_outbox(db: Memory, outbox: Outbox) -> TestService {
        service_with(db, "secret", outbox)
    }

    /// Creates a new [`TestService`] out of the provided parts.
    fn service_with(db: Memory, secret: &str, outbox: Outbox) -> TestService {
        Service::new(
            Config::new(
                secret.as_bytes(),
                "https://meet.example.com/",
                "support@meet.example.com",
            ),
            db,
            outbox,
        )
    }

    /// Extracts the sealed token from a link in the provided [`Email`].
    pub(crate) fn token_from(email: &Email) -> String {
        let (_, rest) = email
            .html
            .split_once("?token=")
            .expect("no link with a token");
        rest.chars()
            .take_while(|c| {
                c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
            })
            .collect()
    }

    /// Mailer collecting delivered [`Email`]s.
    #[derive(Clone, Debug, Default)]
    pub(crate) struct Outbox {
        /// Delivered [`Email`]s.
        sent: Arc<Mutex<Vec<Email>>>,

        /// Indicator whether deliveries should fail.
        broken: bool,
    }

    impl Outbox {
        /// Creates a new [`Outbox`] failing every delivery.
        pub(crate) fn broken() -> Self {
            Self {
                broken: true,
                ..Self::default()
            }
        }

        /// Returns all the [`Email`]s delivered so far.
        pub(crate) fn sent(&self) -> Vec<Email> {
            self.sent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl mailer::Mailer<Deliver<Email>> for Outbox {
        type Ok = ();
        type Err = Traced<mailer::Error>;

        async fn execute(
            &self,
            Deliver(email): Deliver<Email>,
        ) -> Result<Self::Ok, Self::Err> {
            if self.broken {
                return Err(tracerr::new!(mailer::Error::new("outbox is broken")));
            }
            self.sent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(email);
            Ok(())
        }
    }
}

#[cfg(test)]
mod config_spec {
    use super::Config;

    #[test]
    fn builds_urls() {
        let config = Config::new(b"secret", "https://meet.example.com/", "");

        assert_eq!(config.base_url, "https://meet.example.com");
        assert_eq!(
            config.url("/poll/1"),
            "https://meet.example.com/poll/1",
        );
        assert_eq!(config.url("poll/1"), "https://meet.example.com/poll/1");
    }
}
