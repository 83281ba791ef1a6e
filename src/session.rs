//! Session lifecycle and transparent re-authentication.
//!
//! The manager owns the one live session (token, identity, credential) and
//! exposes an HTTP client whose request pipeline carries the 401-recovery
//! policy as a single middleware stage: attach the bearer token, and on a
//! 401 re-authenticate once and replay the original request once. Callers
//! never attach auth headers and never retry themselves.
//!
//! Session restore is lazy: a persisted triple makes the session live
//! without a validation round trip, and the first authorized request either
//! succeeds or walks the 401 path above.

use std::sync::Arc;

use http::Extensions;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Request, Response, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Middleware, Next};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::credentials::{CredentialStore, StoredCredentials};
use crate::error::{AuthError, SessionError};

/// The live session. All three fields live and die together.
#[derive(Debug, Clone)]
struct Session {
    access_token: String,
    user_id: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    user_id: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

struct SessionCore {
    api_url: String,
    /// Plain client for the login endpoint: no bearer, no retry policy.
    login_client: Client,
    store: Arc<dyn CredentialStore>,
    session: RwLock<Option<Session>>,
}

impl SessionCore {
    async fn bearer(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// POST the login request. Does not touch session state; callers decide
    /// what a success or failure means for the session.
    async fn post_login(&self, user_id: &str, password: &str) -> Result<String, AuthError> {
        let url = format!("{}/api/admin/login", self.api_url);
        let response = self
            .login_client
            .post(&url)
            .json(&LoginRequest { user_id, password })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: LoginResponse = response.json().await.map_err(|_| AuthError::Server {
                status: status.as_u16(),
                message: "malformed login response".to_string(),
            })?;
            return Ok(body.access_token);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(AuthError::InvalidCredentials { message })
        } else {
            Err(AuthError::Server {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// The single re-authentication path.
    ///
    /// On success only the token changes; identity and credential stay as
    /// they were. On any failure the session is cleared completely — token,
    /// identity and credential together, in memory and in the store.
    async fn re_authenticate(&self) -> bool {
        let Some((user_id, password)) = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| (s.user_id.clone(), s.password.clone()))
        else {
            self.clear_all().await;
            return false;
        };

        match self.post_login(&user_id, &password).await {
            Ok(token) => {
                {
                    let mut guard = self.session.write().await;
                    if let Some(session) = guard.as_mut() {
                        session.access_token = token.clone();
                    }
                }
                self.persist(StoredCredentials {
                    access_token: token,
                    user_id,
                    password,
                })
                .await;
                info!("Token refreshed successfully");
                true
            }
            Err(err) => {
                warn!("Re-authentication failed: {err}");
                self.clear_all().await;
                false
            }
        }
    }

    /// Drop the in-memory session and the stored triple.
    async fn clear_all(&self) {
        *self.session.write().await = None;

        let store = self.store.clone();
        match tokio::task::spawn_blocking(move || store.clear()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!("Failed to clear stored credentials: {err:#}"),
            Err(err) => error!("spawn_blocking panicked while clearing credentials: {err}"),
        }
    }

    async fn persist(&self, credentials: StoredCredentials) {
        let store = self.store.clone();
        match tokio::task::spawn_blocking(move || store.save(&credentials)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!("Failed to persist credentials: {err:#}"),
            Err(err) => error!("spawn_blocking panicked while persisting credentials: {err}"),
        }
    }
}

/// Middleware stage owning the 401-retry policy.
///
/// Composed exactly once onto the authorized client, so the policy cannot
/// be duplicated or forgotten per call site.
struct ReauthMiddleware {
    core: Arc<SessionCore>,
}

fn expired() -> reqwest_middleware::Error {
    reqwest_middleware::Error::Middleware(SessionError::Expired.into())
}

fn set_bearer(req: &mut Request, token: &str) -> reqwest_middleware::Result<()> {
    let value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| reqwest_middleware::Error::Middleware(e.into()))?;
    req.headers_mut().insert(AUTHORIZATION, value);
    Ok(())
}

#[async_trait::async_trait]
impl Middleware for ReauthMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let token = self.core.bearer().await.ok_or_else(expired)?;
        set_bearer(&mut req, &token)?;

        // Clone before the first send; the retry must replay the original
        // request, not rebuild it.
        let retry_req = req.try_clone();

        // A transport-level failure propagates as-is: no response means no
        // verdict on the token, so no retry.
        let response = next.clone().run(req, extensions).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        info!("Token rejected (401), re-authenticating");
        if !self.core.re_authenticate().await {
            return Err(expired());
        }

        let Some(mut retry_req) = retry_req else {
            // Non-replayable body; hand back the 401 rather than guess.
            return Ok(response);
        };
        let token = self.core.bearer().await.ok_or_else(expired)?;
        set_bearer(&mut retry_req, &token)?;
        next.run(retry_req, extensions).await
    }
}

/// Owns the session and the authorized HTTP pipeline.
#[derive(Clone)]
pub struct SessionManager {
    core: Arc<SessionCore>,
    http: ClientWithMiddleware,
}

impl SessionManager {
    pub fn new(api_url: &str, store: Arc<dyn CredentialStore>) -> Self {
        let core = Arc::new(SessionCore {
            api_url: api_url.trim_end_matches('/').to_string(),
            login_client: Client::new(),
            store,
            session: RwLock::new(None),
        });

        let http = ClientBuilder::new(Client::new())
            .with(ReauthMiddleware { core: core.clone() })
            .build();

        Self { core, http }
    }

    /// Restore a persisted session, if any. No network round trip: the
    /// session is optimistically live and the first authorized request
    /// corrects a stale token through the 401 path.
    pub async fn restore(&self) -> bool {
        let store = self.core.store.clone();
        let loaded = match tokio::task::spawn_blocking(move || store.load()).await {
            Ok(Ok(loaded)) => loaded,
            Ok(Err(err)) => {
                error!("Failed to read stored credentials: {err:#}");
                None
            }
            Err(err) => {
                error!("spawn_blocking panicked while reading credentials: {err}");
                None
            }
        };

        match loaded {
            Some(creds) => {
                info!("Restored session for {}", creds.user_id);
                *self.core.session.write().await = Some(Session {
                    access_token: creds.access_token,
                    user_id: creds.user_id,
                    password: creds.password,
                });
                true
            }
            None => false,
        }
    }

    /// Log in with explicit credentials.
    ///
    /// On failure the existing session state is left untouched, so a typo
    /// during re-login does not kill a still-working session.
    pub async fn login(&self, user_id: &str, password: &str) -> Result<(), AuthError> {
        let token = self.core.post_login(user_id, password).await?;

        *self.core.session.write().await = Some(Session {
            access_token: token.clone(),
            user_id: user_id.to_string(),
            password: password.to_string(),
        });
        self.core
            .persist(StoredCredentials {
                access_token: token,
                user_id: user_id.to_string(),
                password: password.to_string(),
            })
            .await;

        info!("Logged in as {user_id}");
        Ok(())
    }

    /// Clear the session and the stored credentials. Idempotent.
    pub async fn logout(&self) {
        self.core.clear_all().await;
        info!("Logged out");
    }

    pub async fn is_authenticated(&self) -> bool {
        self.core.session.read().await.is_some()
    }

    pub async fn current_user(&self) -> Option<String> {
        self.core
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.user_id.clone())
    }

    /// The authorized pipeline: bearer injection plus the 401-retry stage.
    pub(crate) fn http(&self) -> &ClientWithMiddleware {
        &self.http
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.core.api_url, path)
    }
}

/// Translate a pipeline error into the session taxonomy.
pub(crate) fn session_error(err: reqwest_middleware::Error) -> SessionError {
    match err {
        reqwest_middleware::Error::Middleware(inner) => match inner.downcast::<SessionError>() {
            Ok(session) => session,
            Err(other) => {
                error!("Unexpected middleware failure: {other:#}");
                SessionError::Expired
            }
        },
        reqwest_middleware::Error::Reqwest(inner) => SessionError::Transport(inner),
    }
}
