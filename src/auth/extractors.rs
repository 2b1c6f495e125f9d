use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    #[serde(alias = "Access")]
    Access,
    #[serde(alias = "Refresh")]
    Refresh,
}

/// The part of the token payload this service reads. `exp`, `iss` and `aud`
/// are checked by `jsonwebtoken` against the raw payload.
#[derive(Debug, Deserialize)]
pub(crate) struct Caller {
    pub sub: Uuid,
    pub kind: TokenKind,
}

/// Extracts and validates the bearer JWT, yielding the caller's user ID.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

pub(crate) fn verify_access(token: &str, cfg: &JwtConfig) -> Result<Caller, (StatusCode, String)> {
    let mut validation = Validation::default();
    validation.set_audience(std::slice::from_ref(&cfg.audience));
    validation.set_issuer(std::slice::from_ref(&cfg.issuer));
    let decoding = DecodingKey::from_secret(cfg.secret.as_bytes());

    let data = decode::<Caller>(token, &decoding, &validation).map_err(|e| {
        warn!(error = %e, "jwt rejected");
        (StatusCode::UNAUTHORIZED, "invalid or expired token".to_string())
    })?;

    if data.claims.kind != TokenKind::Access {
        return Err((StatusCode::UNAUTHORIZED, "access token required".into()));
    }
    Ok(data.claims)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "missing Authorization header".into()))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or((StatusCode::UNAUTHORIZED, "invalid auth scheme".into()))?;

        let caller = verify_access(token, &state.config.jwt)?;
        Ok(AuthUser(caller.sub))
    }
}

#[cfg(test)]
pub(crate) mod test_tokens {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::TokenKind;
    use crate::config::JwtConfig;

    /// Signs a token shaped like the identity service's.
    pub fn sign(cfg: &JwtConfig, user_id: Uuid, kind: TokenKind) -> String {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = json!({
            "sub": user_id,
            "iat": now,
            "exp": now + 600,
            "iss": cfg.issuer,
            "aud": cfg.audience,
            "kind": kind,
        });
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(cfg.secret.as_bytes()),
        )
        .unwrap()
    }
}
