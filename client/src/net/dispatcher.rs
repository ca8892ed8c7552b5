//! Request dispatcher and refresh coordinator.
//!
//! ARCHITECTURE
//! ============
//! Every request to the remote API goes through [`ApiClient::dispatch`]:
//! read the current access token, attach it as a bearer header, send. A 401
//! response hands control to the refresh coordinator, which renews the
//! access token through the dedicated endpoint and lets the dispatcher
//! replay the original request exactly once with the new credential. The
//! caller never sees the refresh happen: it gets the replayed response, or
//! the original failure when no retry is possible.
//!
//! Refresh is a single-flight critical section. The first 401 of an episode
//! takes the gate and performs the renewal; 401s observed while that
//! renewal is in flight queue on the same gate and, on entry, re-read the
//! store instead of issuing a second network call. Two simultaneous renewal
//! calls would typically invalidate each other's refresh credential, so the
//! gate is a correctness requirement, not an optimization.
//!
//! ERROR HANDLING
//! ==============
//! Only 401 is intercepted. A failed renewal is fatal to the session: the
//! store and projection are cleared and the caller gets
//! [`Error::SessionExpired`]. Every other failure passes through untouched.

#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod dispatcher_test;

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::ClientConfig;
use crate::error::Error;
use crate::net::attempt::Attempt;
use crate::session::state::AuthState;

const REFRESH_PATH: &str = "/api/auth/refresh-token";

/// HTTP client bound to one remote API and one [`AuthState`].
///
/// Cookies are enabled because the refresh endpoint relies on a server-set
/// cookie in addition to the persisted refresh token.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: AuthState,
    refresh_gate: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Builds a client from configuration and an initialized auth state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] when the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &ClientConfig, auth: AuthState) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            auth,
            refresh_gate: Arc::new(Mutex::new(())),
        })
    }

    /// The auth state this client reads tokens from and reports refreshes to.
    #[must_use]
    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Request builder for `path` with the given bearer token attached.
    fn begin(&self, method: Method, path: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        let mut request = self.http.request(method, self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Sends a request built by `make`, replaying it at most once after a
    /// 401-triggered token refresh. `make` is invoked per attempt with the
    /// access token current at that moment, so the replay carries the
    /// renewed credential.
    pub(crate) async fn dispatch<F>(&self, make: F) -> Result<reqwest::Response, Error>
    where
        F: Fn(Option<&str>) -> reqwest::RequestBuilder,
    {
        let mut attempt = Attempt::Pending;
        loop {
            let token = self.auth.access_token();
            let response = make(token.as_deref()).send().await?;
            if response.status() == StatusCode::UNAUTHORIZED && attempt.begin_retry() {
                self.refresh_access_token(token.as_deref()).await?;
                continue;
            }
            return Ok(response);
        }
    }

    /// Renews the access token, single-flight.
    ///
    /// `stale` is the token the failed request was sent with. On entering
    /// the gate the store is re-read: a token that already changed means
    /// another caller completed the renewal while we waited, and a session
    /// that disappeared means that renewal failed; either way no second
    /// network call is made for this episode.
    async fn refresh_access_token(&self, stale: Option<&str>) -> Result<String, Error> {
        let _gate = self.refresh_gate.lock().await;

        match (self.auth.access_token(), stale) {
            (Some(current), Some(stale)) if current != stale => return Ok(current),
            (Some(current), None) => return Ok(current),
            (None, Some(_)) => return Err(Error::SessionExpired),
            _ => {}
        }

        match self.request_refresh().await {
            Ok(access_token) => {
                self.auth.update_access_token(&access_token)?;
                tracing::debug!("access token refreshed");
                Ok(access_token)
            }
            Err(error) => {
                tracing::warn!(%error, "token refresh failed; clearing session");
                self.auth.clear()?;
                Err(Error::SessionExpired)
            }
        }
    }

    /// One network call to the renewal endpoint. The persisted refresh token
    /// travels in the body; the refresh cookie, when present, rides along
    /// via the cookie store.
    async fn request_refresh(&self) -> Result<String, Error> {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct RefreshResponse {
            access_token: String,
        }

        let mut request = self.http.post(self.url(REFRESH_PATH));
        if let Some(session) = self.auth.session() {
            request = request.json(&serde_json::json!({ "refreshToken": session.refresh_token }));
        }
        let response = request.send().await?;
        let body: RefreshResponse = Self::read_json(response, REFRESH_PATH).await?;
        Ok(body.access_token)
    }

    /// Decodes a successful response as `T`; maps failure statuses to
    /// [`Error::Api`] and undecodable bodies to [`Error::Decode`].
    pub(crate) async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
        path: &str,
    ) -> Result<T, Error> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::api(status.as_u16(), path, api_error_message(&body)));
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Like [`Self::read_json`] for endpoints whose body we discard.
    pub(crate) async fn read_ok(response: reqwest::Response, path: &str) -> Result<(), Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::api(status.as_u16(), path, api_error_message(&body)))
    }

    // Convenience verbs used by the endpoint wrappers in `crate::api`.

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let response = self
            .dispatch(|token| self.begin(Method::GET, path, token))
            .await?;
        Self::read_json(response, path).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        let response = self
            .dispatch(|token| self.begin(Method::POST, path, token).json(body))
            .await?;
        Self::read_json(response, path).await
    }

    pub(crate) async fn post_unit(&self, path: &str, body: &impl Serialize) -> Result<(), Error> {
        let response = self
            .dispatch(|token| self.begin(Method::POST, path, token).json(body))
            .await?;
        Self::read_ok(response, path).await
    }

    pub(crate) async fn put_unit(&self, path: &str, body: &impl Serialize) -> Result<(), Error> {
        let response = self
            .dispatch(|token| self.begin(Method::PUT, path, token).json(body))
            .await?;
        Self::read_ok(response, path).await
    }

    pub(crate) async fn delete_unit(&self, path: &str) -> Result<(), Error> {
        let response = self
            .dispatch(|token| self.begin(Method::DELETE, path, token))
            .await?;
        Self::read_ok(response, path).await
    }

    /// Multipart POST. `form` is called per attempt because a multipart body
    /// cannot be cloned for the replay.
    pub(crate) async fn post_multipart<T, F>(&self, path: &str, form: F) -> Result<T, Error>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::multipart::Form,
    {
        let response = self
            .dispatch(|token| self.begin(Method::POST, path, token).multipart(form()))
            .await?;
        Self::read_json(response, path).await
    }

    /// Multipart PUT; see [`Self::post_multipart`].
    pub(crate) async fn put_multipart<T, F>(&self, path: &str, form: F) -> Result<T, Error>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::multipart::Form,
    {
        let response = self
            .dispatch(|token| self.begin(Method::PUT, path, token).multipart(form()))
            .await?;
        Self::read_json(response, path).await
    }
}

/// Best human-readable message out of an API error body: the `message`
/// field when the body is the usual JSON error envelope, the raw body
/// otherwise.
fn api_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(serde_json::Value::as_str) {
            return message.to_owned();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no error details provided".to_owned()
    } else {
        trimmed.to_owned()
    }
}
