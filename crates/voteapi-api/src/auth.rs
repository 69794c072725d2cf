//! Admin basic-auth gate for mutating routes.
//!
//! Reads (`GET`, `HEAD`, `OPTIONS`) are public. Every other method must
//! carry `Authorization: Basic` credentials matching the configured admin.
//! Only a SHA-256 digest of `name:password` is kept in memory, and the
//! comparison runs over the full digest regardless of where it differs.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{Method, header};
use axum::middleware::Next;
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha2::{Digest, Sha256};

use crate::error::ApiError;
use crate::state::AppState;

/// Digest of the admin's `name:password`.
#[derive(Clone)]
pub struct AdminCredentials {
    digest: [u8; 32],
}

impl AdminCredentials {
    /// Remember the admin credentials.
    pub fn new(name: &str, password: &str) -> Self {
        Self {
            digest: digest_of(name, password),
        }
    }

    /// Whether `name` and `password` are the admin's.
    pub fn verify(&self, name: &str, password: &str) -> bool {
        let candidate = digest_of(name, password);
        self.digest
            .iter()
            .zip(candidate.iter())
            .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    /// Whether an `Authorization` header value carries the admin's
    /// credentials.
    pub fn verify_header(&self, value: &str) -> bool {
        parse_basic(value).is_some_and(|(name, password)| self.verify(&name, &password))
    }
}

impl core::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminCredentials").finish_non_exhaustive()
    }
}

fn digest_of(name: &str, password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

/// Split a `Basic` header value into user name and password.
///
/// The password may itself contain colons; the user name may not.
pub fn parse_basic(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (name, password) = decoded.split_once(':')?;
    Some((name.to_owned(), password.to_owned()))
}

/// Methods that never change data.
fn is_read(method: &Method) -> bool {
    [Method::GET, Method::HEAD, Method::OPTIONS].contains(method)
}

/// Middleware: let reads through, demand admin credentials otherwise.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_read(request.method()) {
        return Ok(next.run(request).await);
    }

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| state.admin.verify_header(value));

    if !authorized {
        tracing::warn!(
            method = %request.method(),
            path = request.uri().path(),
            "Rejected write without admin credentials"
        );
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}
