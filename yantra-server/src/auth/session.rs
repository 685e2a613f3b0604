//! Identity-provider session tokens
//!
//! Sessions are HS256 JWTs issued by the identity provider. `sub` is the
//! provider's user id; `role = "admin"` grants the admin dashboard.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};

use crate::state::AppState;

const ADMIN_ROLE: &str = "admin";

/// Session token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identity-provider user id
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
}

/// Authenticated caller
#[derive(Debug, Clone, PartialEq)]
pub struct SessionIdentity {
    pub external_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub is_admin: bool,
}

impl From<SessionClaims> for SessionIdentity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            is_admin: claims.role.as_deref() == Some(ADMIN_ROLE),
            external_id: claims.sub,
            email: claims.email,
            name: claims.name,
        }
    }
}

/// Verify a session token and return the caller's identity
pub fn verify_token(token: &str, secret: &str) -> Result<SessionIdentity, AppError> {
    let validation = Validation::new(Algorithm::HS256);
    let data = jsonwebtoken::decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("Session token rejected: {e}");
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid session token"),
        }
    })?;

    if data.claims.sub.trim().is_empty() {
        return Err(AppError::invalid_token("Session token has no subject"));
    }
    Ok(data.claims.into())
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(header) = parts.headers.get(http::header::AUTHORIZATION) else {
        return Ok(None);
    };
    header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| Some(t.trim()))
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))
}

impl FromRequestParts<AppState> for SessionIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<SessionIdentity>() {
            return Ok(identity.clone());
        }

        let token = bearer_token(parts)?.ok_or_else(AppError::not_authenticated)?;
        let identity = verify_token(token, &state.jwt_secret)?;
        parts.extensions.insert(identity.clone());
        Ok(identity)
    }
}

/// Caller identity when a valid session is present; guests get `None`
#[derive(Debug, Clone)]
pub struct OptionalSession(pub Option<SessionIdentity>);

impl FromRequestParts<AppState> for OptionalSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match SessionIdentity::from_request_parts(parts, state).await {
            Ok(identity) => Ok(Self(Some(identity))),
            Err(e) => {
                if parts.headers.contains_key(http::header::AUTHORIZATION) {
                    tracing::debug!(code = %e.code, "Ignoring unusable session, continuing as guest");
                }
                Ok(Self(None))
            }
        }
    }
}

/// Middleware: reject requests without a valid session
pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = request.into_parts();
    SessionIdentity::from_request_parts(&mut parts, &state).await?;
    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Middleware: reject requests whose session lacks the admin role
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = request.into_parts();
    let identity = SessionIdentity::from_request_parts(&mut parts, &state).await?;
    if !identity.is_admin {
        tracing::warn!(user = %identity.external_id, uri = %parts.uri, "Admin route denied");
        return Err(AppError::new(ErrorCode::AdminRequired));
    }
    Ok(next.run(Request::from_parts(parts, body)).await)
}
