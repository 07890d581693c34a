//! Sealing of payloads into signed [`Token`]s.
//!
//! A sealed [`Token`] carries its payload across a redirect or a cookie
//! without any server-side storage: it's a [JWT] signed with the secret of
//! the [`Service`], optionally expiring.
//!
//! [JWT]: https://datatracker.ietf.org/doc/html/rfc7519

use std::{fmt, marker::PhantomData, str::FromStr, time::Duration};

use common::{unit, DateTime, DateTimeOf};
use derive_more::{Display, Error, From};
use jsonwebtoken::{Algorithm, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracerr::Traced;

use crate::Service;

/// Signed token sealing a `T` payload.
pub struct Token<T> {
    /// Encoded representation of this [`Token`].
    encoded: String,

    /// Type of the sealed payload.
    _payload: PhantomData<fn() -> T>,
}

impl<T> Token<T> {
    /// Creates a new [`Token`] from its encoded representation.
    ///
    /// Nothing is checked here: a malformed [`Token`] fails to be unsealed.
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self {
            encoded: encoded.into(),
            _payload: PhantomData,
        }
    }
}

impl<T> Clone for Token<T> {
    fn clone(&self) -> Self {
        Self::new(self.encoded.clone())
    }
}

impl<T> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&self.encoded).finish()
    }
}

impl<T> fmt::Display for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl<T> PartialEq for Token<T> {
    fn eq(&self, other: &Self) -> bool {
        self.encoded == other.encoded
    }
}

impl<T> Eq for Token<T> {}

impl<T> AsRef<str> for Token<T> {
    fn as_ref(&self) -> &str {
        &self.encoded
    }
}

impl<T> FromStr for Token<T> {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("empty `Token`");
        }
        Ok(Self::new(s))
    }
}

/// [`DateTime`] when a [`Token`] expires.
pub type ExpirationDateTime = DateTimeOf<(Token<()>, unit::Expiration)>;

/// Claims actually encoded into a [`Token`].
#[derive(Deserialize, Serialize)]
struct Claims<T> {
    /// Sealed payload.
    #[serde(flatten)]
    payload: T,

    /// Unix timestamp of the expiration, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

impl<Db, Ml> Service<Db, Ml> {
    /// Seals the provided `payload` into a [`Token`] expiring in `ttl`, or
    /// never expiring if [`None`].
    ///
    /// # Errors
    ///
    /// If the `payload` cannot be encoded.
    pub fn seal<T: Serialize>(
        &self,
        payload: T,
        ttl: Option<Duration>,
    ) -> Result<Token<T>, Traced<SealError>> {
        self.seal_until(payload, ttl.map(|ttl| (DateTime::now() + ttl).coerce()))
    }

    /// Seals the provided `payload` into a [`Token`] expiring at the
    /// provided [`DateTime`], or never expiring if [`None`].
    ///
    /// # Errors
    ///
    /// If the `payload` cannot be encoded.
    pub fn seal_until<T: Serialize>(
        &self,
        payload: T,
        expires_at: Option<ExpirationDateTime>,
    ) -> Result<Token<T>, Traced<SealError>> {
        let claims = Claims {
            payload,
            exp: expires_at.map(|at| at.unix_timestamp()),
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.config().jwt_encoding_key,
        )
        .map(Token::new)
        .map_err(tracerr::from_and_wrap!(=> SealError))
    }

    /// Unseals the payload of the provided [`Token`].
    ///
    /// # Errors
    ///
    /// With [`UnsealError::InvalidOrExpiredToken`] if the signature doesn't
    /// verify, the payload doesn't decode, or the [`Token`] has expired.
    pub fn unseal<T: DeserializeOwned>(
        &self,
        token: &Token<T>,
    ) -> Result<T, Traced<UnsealError>> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.leeway = 0;

        jsonwebtoken::decode::<Claims<T>>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &validation,
        )
        .map(|data| data.claims.payload)
        .map_err(tracerr::from_and_wrap!(=> UnsealError))
    }
}

/// Error of sealing a [`Token`].
#[derive(Debug, Display, Error, From)]
#[display("Failed to seal a `Token`: {_0}")]
pub struct SealError(jsonwebtoken::errors::Error);

/// Error of unsealing a [`Token`].
#[derive(Debug, Display, Error, From)]
pub enum UnsealError {
    /// [`Token`] is malformed, forged, or expired.
    #[display("Invalid or expired `Token`: {_0}")]
    InvalidOrExpiredToken(jsonwebtoken::errors::Error),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;
    use serde::{Deserialize, Serialize};

    use crate::{
        infra::database::Memory,
        spec::{service, service_with_secret},
    };

    use super::{Token, UnsealError};

    #[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
    struct Payload {
        email: String,
        attempt: u8,
    }

    fn payload() -> Payload {
        Payload {
            email: "alice@example.com".into(),
            attempt: 1,
        }
    }

    #[test]
    fn round_trips_before_expiration() {
        let svc = service(Memory::default());

        let token = svc
            .seal(payload(), Some(Duration::from_secs(15 * 60)))
            .unwrap();

        assert_eq!(svc.unseal(&token).unwrap(), payload());
    }

    #[test]
    fn round_trips_without_expiration() {
        let svc = service(Memory::default());

        let token = svc.seal(payload(), None).unwrap();

        assert_eq!(svc.unseal(&token).unwrap(), payload());
    }

    #[test]
    fn rejects_expired() {
        let svc = service(Memory::default());

        let token = svc
            .seal_until(
                payload(),
                Some((DateTime::now() - Duration::from_secs(5)).coerce()),
            )
            .unwrap();

        assert!(matches!(
            svc.unseal(&token).unwrap_err().into_inner(),
            UnsealError::InvalidOrExpiredToken(_),
        ));
    }

    #[tokio::test]
    async fn rejects_once_ttl_elapsed() {
        let svc = service(Memory::default());

        let token = svc.seal(payload(), Some(Duration::from_secs(1))).unwrap();
        tokio::time::sleep(Duration::from_millis(2100)).await;

        assert!(svc.unseal(&token).is_err());
    }

    #[test]
    fn rejects_tampered() {
        let svc = service(Memory::default());

        let token = svc.seal(payload(), None).unwrap().to_string();
        let other = svc
            .seal(
                Payload {
                    attempt: 2,
                    ..payload()
                },
                None,
            )
            .unwrap()
            .to_string();
        let (token, other) = (
            token.split('.').collect::<Vec<_>>(),
            other.split('.').collect::<Vec<_>>(),
        );
        let forged = format!("{}.{}.{}", token[0], other[1], token[2]);

        assert!(svc.unseal(&Token::<Payload>::new(forged)).is_err());
        assert!(svc.unseal(&Token::<Payload>::new("garbage")).is_err());
    }

    #[test]
    fn rejects_foreign_secret() {
        let svc = service(Memory::default());
        let other = service_with_secret(Memory::default(), "other");

        let token = other.seal(payload(), None).unwrap();

        assert!(svc.unseal(&token).is_err());
    }
}
