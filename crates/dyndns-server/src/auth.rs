//! HTTP basic-auth gate
//!
//! Credentials are checked against a bcrypt hash. Verification runs on the
//! blocking pool since bcrypt is deliberately slow.

use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dyndns_core::mask::mask_sensitive;
use dyndns_core::{Error, Result};
use std::sync::Arc;

/// Realm announced in `WWW-Authenticate`
pub const AUTH_REALM: &str = "DynDNS";

/// Username and bcrypt hash accepted by the gate
#[derive(Clone)]
pub struct BasicAuth {
    username: String,
    password_hash: String,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password_hash", &mask_sensitive(&self.password_hash))
            .finish()
    }
}

impl BasicAuth {
    /// # Errors
    ///
    /// Fails when the username is empty or the hash is not a bcrypt hash.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let password_hash = password_hash.into();

        if username.is_empty() {
            return Err(Error::config("auth username cannot be empty"));
        }
        if !password_hash.starts_with("$2") {
            return Err(Error::config(
                "auth password hash must be a bcrypt hash (starting with $2)",
            ));
        }

        Ok(Self {
            username,
            password_hash,
        })
    }

    /// Check an `Authorization` header value
    pub async fn verify_header(&self, header: Option<&str>) -> bool {
        let Some((username, password)) = header.and_then(parse_basic) else {
            return false;
        };
        if username != self.username {
            return false;
        }

        let hash = self.password_hash.clone();
        match tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await {
            Ok(Ok(valid)) => valid,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "bcrypt verification failed");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "bcrypt verification task failed");
                false
            }
        }
    }
}

/// Decode `Basic base64(user:pass)`
fn parse_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// The 401 answer with a basic-auth challenge
pub fn unauthorized() -> Response {
    let mut response = (StatusCode::UNAUTHORIZED, "401 Unauthorized\n").into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"DynDNS\""),
    );
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

/// Axum middleware enforcing [`BasicAuth`] when configured
pub async fn basic_auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(auth) = &state.auth else {
        return next.run(request).await;
    };

    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if !auth.verify_header(header).await {
        tracing::warn!(
            path = %request.uri().path(),
            realm = AUTH_REALM,
            "rejected request with missing or invalid credentials"
        );
        return unauthorized();
    }

    next.run(request).await
}
