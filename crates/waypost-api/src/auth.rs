//! # Authentication
//!
//! Bearer token middleware with two roles.
//!
//! ## Token Format
//!
//! ```text
//! Bearer {role}:{user_id}:{secret}    role-bound token
//! Bearer {secret}                     legacy format, treated as admin
//! ```
//!
//! Every authenticated request gets a [`CallerIdentity`] injected into the
//! request extensions. Handlers extract it via the `FromRequestParts` impl
//! and hand [`CallerIdentity::principal`] to the engine.

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use waypost_core::{Principal, UserId};

use crate::error::{ApiResponse, AppError};

// ── Role ─────────────────────────────────────────────────────────────────

/// Caller roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Sends packages and offers trips under their own user id.
    Member,
    /// Full access, including dispute handling.
    Admin,
}

impl Role {
    /// Return the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }
}

// ── CallerIdentity ───────────────────────────────────────────────────────

/// Identity of the authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The caller's role.
    pub role: Role,
    /// The caller's user id. Always set for members.
    pub user_id: Option<UserId>,
}

impl CallerIdentity {
    /// The identity used when auth is disabled.
    pub fn unrestricted() -> Self {
        Self {
            role: Role::Admin,
            user_id: None,
        }
    }

    /// The engine-facing principal.
    pub fn principal(&self) -> Principal {
        match self.role {
            Role::Admin => Principal::admin(self.user_id),
            Role::Member => Principal {
                user_id: self.user_id,
                admin: false,
            },
        }
    }
}

/// Extracts the identity that the auth middleware injected into extensions.
/// Returns 401 if no identity is present.
impl<S: Send + Sync> FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

// ── Auth Configuration ───────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value.
#[derive(Clone, Default)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token Validation ─────────────────────────────────────────────────────

/// Constant-time comparison of bearer secrets.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a bearer token in format `{role}:{user_id}:{secret}` or `{secret}`.
///
/// Members must carry a user id; admins may leave it empty.
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<CallerIdentity, String> {
    let parts: Vec<&str> = provided.splitn(3, ':').collect();

    match parts.as_slice() {
        [secret] => {
            if constant_time_token_eq(secret, expected_secret) {
                Ok(CallerIdentity::unrestricted())
            } else {
                Err("invalid bearer token".into())
            }
        }
        [role, user, secret] => {
            if !constant_time_token_eq(secret, expected_secret) {
                return Err("invalid bearer token".into());
            }

            let role = match *role {
                "admin" => Role::Admin,
                "member" => Role::Member,
                other => return Err(format!("unknown role: {other}")),
            };

            let user_id = if user.is_empty() {
                None
            } else {
                Some(UserId::from_uuid(
                    user.parse::<Uuid>()
                        .map_err(|e| format!("invalid user_id: {e}"))?,
                ))
            };

            if role == Role::Member && user_id.is_none() {
                return Err("member tokens must carry a user_id".into());
            }

            Ok(CallerIdentity { role, user_id })
        }
        _ => Err("invalid token format: expected {role}:{user_id}:{secret} or {secret}".into()),
    }
}

// ── Middleware ───────────────────────────────────────────────────────────

/// Validate the Bearer token and inject the caller's identity.
///
/// When `AuthConfig.token` is `None`, every request runs as an unbound
/// admin.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|config| config.token.clone());

    let Some(expected) = expected else {
        request
            .extensions_mut()
            .insert(CallerIdentity::unrestricted());
        return next.run(request).await;
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(value) => match value.strip_prefix("Bearer ") {
            Some(provided) => match parse_bearer_token(provided, &expected) {
                Ok(identity) => {
                    request.extensions_mut().insert(identity);
                    next.run(request).await
                }
                Err(msg) => {
                    tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                    unauthorized_response(&msg)
                }
            },
            None => {
                tracing::warn!("authentication failed: non-Bearer authorization scheme");
                unauthorized_response("authorization header must use Bearer scheme")
            }
        },
        None => {
            tracing::warn!("authentication failed: missing authorization header");
            unauthorized_response("missing authorization header")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::failure("UNAUTHORIZED", message)),
    )
        .into_response()
}
