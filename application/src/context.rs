//! [`Context`]-related definitions.

use std::sync::{
    atomic::{self, AtomicU16},
    Mutex, PoisonError,
};

use axum::{async_trait, extract::FromRequestParts};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use service::{
    command::{self, Command as _},
    domain::user::{session, Identity, Session},
};
use tokio::sync::OnceCell;

use crate::{config, AsError, Error, JuniperResponse, Service};

/// Application context.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// Error status code.
    error_status_code: AtomicU16,

    /// [`session::Token`] presented by the client, if any.
    token: Option<session::Token>,

    /// [`Session`] resolved from the presented [`session::Token`].
    resolved: OnceCell<Session>,

    /// State of the [`Session`] changed while handling the request.
    changes: Mutex<Changes>,
}

/// Changes of the [`Session`] made while handling a request.
#[derive(Debug, Default)]
struct Changes {
    /// [`Identity`] replacing the resolved one.
    identity: Option<Identity>,

    /// [`SessionUpdate`] to apply to the response.
    update: Option<SessionUpdate>,
}

impl Changes {
    /// Records the [`session::Token`] of a freshly resolved [`Session`].
    ///
    /// Never overrides an explicit [`Changes::persist()`] or
    /// [`Changes::destroy()`].
    fn resolved(&mut self, token: session::Token) {
        _ = self.update.get_or_insert(SessionUpdate::Persist(token));
    }

    /// Replaces the [`Identity`] and persists its [`session::Token`].
    fn persist(&mut self, identity: Identity, token: session::Token) {
        self.identity = Some(identity);
        self.update = Some(SessionUpdate::Persist(token));
    }

    /// Replaces the [`Identity`] with a new guest and removes the cookie.
    fn destroy(&mut self) {
        self.identity = Some(Identity::guest());
        self.update = Some(SessionUpdate::Destroy);
    }
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the error status code of this [`Context`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn error_status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(
            self.error_status_code.load(atomic::Ordering::Relaxed),
        )
        .expect("invalid status code")
    }

    /// Sets the error status code for this [`Context`].
    ///
    /// Provided [`http::StatusCode`] will be applied to the response.
    pub fn set_error_status_code(&self, status_code: http::StatusCode) {
        self.error_status_code
            .store(status_code.as_u16(), atomic::Ordering::Relaxed);
    }

    /// Helper method calling [`Context::set_error_status_code()`] inside
    /// [`Result::map_err()`] closure.
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.set_error_status_code(err.status_code);
            err
        }
    }

    /// Returns the [`Identity`] of the current [`Session`].
    ///
    /// Resolves it on the first call, so a client without a valid
    /// [`Session`] becomes a new guest.
    ///
    /// # Errors
    ///
    /// Errors if the [`Identity`] cannot be resolved.
    pub async fn identity(&self) -> Result<Identity, Error> {
        let changed = self.changes().identity.clone();
        if let Some(identity) = changed {
            return Ok(identity);
        }

        let session = self
            .resolved
            .get_or_try_init(|| async {
                let output = self
                    .service
                    .execute(command::ResolveIdentity {
                        token: self.token.clone(),
                    })
                    .await
                    .map_err(AsError::into_error)
                    .map_err(self.error())?;
                if let Some(token) = output.persist {
                    self.changes().resolved(token);
                }
                Ok::<_, Error>(Session::new(output.identity))
            })
            .await?;
        session
            .current_user()
            .cloned()
            .map_err(AsError::into_error)
            .map_err(self.error())
    }

    /// Replaces the [`Identity`] of the current [`Session`] with the provided
    /// one, persisting it into the response.
    ///
    /// # Errors
    ///
    /// Errors if the new [`Session`] cannot be sealed.
    pub fn persist_identity(&self, identity: Identity) -> Result<(), Error> {
        let token = self
            .service
            .seal(Session::new(identity.clone()), None)
            .map_err(AsError::into_error)
            .map_err(self.error())?;

        self.changes().persist(identity, token);
        Ok(())
    }

    /// Destroys the current [`Session`].
    ///
    /// The rest of the request is handled on behalf of a new guest, which is
    /// not persisted.
    pub fn destroy_session(&self) {
        self.changes().destroy();
    }

    /// Takes the [`SessionUpdate`] to apply to the response, if any.
    pub fn take_session_update(&self) -> Option<SessionUpdate> {
        self.changes().update.take()
    }

    /// Locks the [`Changes`] of this [`Context`].
    fn changes(&self) -> std::sync::MutexGuard<'_, Changes> {
        self.changes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = JuniperResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let rejection = |msg: &'static str| JuniperResponse {
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            response: GraphQLBatchResponse::Single(GraphQLResponse::error(
                Error::internal(&msg).into_field_error(),
            )),
        };

        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| rejection("missing `Service` extension"))?;
        let cookie = parts
            .extensions
            .get::<SessionCookie>()
            .ok_or_else(|| rejection("missing `SessionCookie` extension"))?;

        let token = CookieJar::from_headers(&parts.headers)
            .get(&cookie.name)
            .map(|c| session::Token::new(c.value()));

        Ok(Self {
            service,
            error_status_code: AtomicU16::new(
                http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            ),
            token,
            resolved: OnceCell::new(),
            changes: Mutex::new(Changes::default()),
        })
    }
}

/// Settings of the cookie carrying a [`session::Token`].
#[derive(Clone, Debug)]
pub struct SessionCookie {
    /// Name of the cookie.
    pub name: String,

    /// Indicator whether the cookie is sent over HTTPS only.
    pub secure: bool,
}

impl From<config::Session> for SessionCookie {
    fn from(config: config::Session) -> Self {
        let config::Session { name, secure } = config;
        Self { name, secure }
    }
}

/// Change of a [`Session`] to apply to the response.
#[derive(Clone, Debug)]
pub enum SessionUpdate {
    /// Store the [`session::Token`] in the cookie.
    Persist(session::Token),

    /// Remove the cookie.
    Destroy,
}

impl SessionUpdate {
    /// Applies this [`SessionUpdate`] to the provided [`CookieJar`].
    #[must_use]
    pub fn apply(self, jar: CookieJar, cookie: &SessionCookie) -> CookieJar {
        match self {
            Self::Persist(token) => jar.add(
                Cookie::build((cookie.name.clone(), token.to_string()))
                    .http_only(true)
                    .path("/")
                    .same_site(SameSite::Lax)
                    .secure(cookie.secure),
            ),
            Self::Destroy => {
                jar.remove(Cookie::build((cookie.name.clone(), "")).path("/"))
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use axum_extra::extract::{cookie::SameSite, CookieJar};
    use service::domain::user::{session, Identity};

    use super::{Changes, SessionCookie, SessionUpdate};

    fn cookie(secure: bool) -> SessionCookie {
        SessionCookie {
            name: "meet-session".into(),
            secure,
        }
    }

    #[test]
    fn persists_session_cookie() {
        let jar = SessionUpdate::Persist(session::Token::new("sealed"))
            .apply(CookieJar::default(), &cookie(true));

        let c = jar.get("meet-session").unwrap();
        assert_eq!(c.value(), "sealed");
        assert_eq!(c.http_only(), Some(true));
        assert_eq!(c.path(), Some("/"));
        assert_eq!(c.same_site(), Some(SameSite::Lax));
        assert_eq!(c.secure(), Some(true));
        assert!(c.expires().is_none());
    }

    fn persisted(changes: &mut Changes) -> Option<String> {
        match changes.update.take() {
            Some(SessionUpdate::Persist(token)) => Some(token.to_string()),
            Some(SessionUpdate::Destroy) | None => None,
        }
    }

    #[test]
    fn persists_freshly_resolved_session() {
        let mut changes = Changes::default();

        changes.resolved(session::Token::new("fresh"));

        assert!(changes.identity.is_none());
        assert_eq!(persisted(&mut changes).as_deref(), Some("fresh"));
        assert!(changes.update.is_none());
    }

    #[test]
    fn login_overrides_resolved_session() {
        let mut changes = Changes::default();
        let guest = Identity::guest();

        changes.resolved(session::Token::new("fresh"));
        changes.persist(guest.clone(), session::Token::new("logged-in"));

        assert_eq!(changes.identity, Some(guest));
        assert_eq!(persisted(&mut changes).as_deref(), Some("logged-in"));
    }

    #[test]
    fn late_resolution_keeps_explicit_update() {
        let mut changes = Changes::default();

        changes.persist(Identity::guest(), session::Token::new("logged-in"));
        changes.resolved(session::Token::new("fresh"));

        assert_eq!(persisted(&mut changes).as_deref(), Some("logged-in"));

        changes.destroy();
        changes.resolved(session::Token::new("fresh"));

        assert!(matches!(changes.update, Some(SessionUpdate::Destroy)));
        assert!(matches!(changes.identity, Some(Identity::Guest { .. })));
    }

    #[test]
    fn logout_overrides_resolved_session() {
        let mut changes = Changes::default();

        changes.resolved(session::Token::new("fresh"));
        changes.destroy();

        assert!(matches!(changes.update, Some(SessionUpdate::Destroy)));
    }

    #[test]
    fn destroys_session_cookie() {
        let jar = SessionUpdate::Persist(session::Token::new("sealed"))
            .apply(CookieJar::default(), &cookie(false));

        let jar = SessionUpdate::Destroy.apply(jar, &cookie(false));

        assert!(jar.get("meet-session").is_none());
    }
}
