use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Claims the content API puts in the tokens it issues.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Reads the claims of a JWT without checking its signature.
///
/// The client never holds the server's secret, so this is only used to tell
/// whether a stored token has already expired. Returns `None` for tokens that
/// are not JWTs.
pub fn inspect_token(token: &str) -> Option<TokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();
    jsonwebtoken::decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .ok()
}

/// True only for a JWT whose `exp` lies in the past. Opaque tokens are never considered expired.
pub fn is_expired(token: &str) -> bool {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    inspect_token(token)
        .and_then(|claims| claims.exp)
        .map(|exp| exp < now)
        .unwrap_or(false)
}
