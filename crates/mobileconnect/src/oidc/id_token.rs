//! ID token decoding and verification (phase 4)

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::OidcError;

/// Signing algorithms accepted for operator ID tokens.
const ALLOWED_ALGORITHMS: [Algorithm; 4] = [
    Algorithm::RS256,
    Algorithm::PS256,
    Algorithm::ES256,
    Algorithm::HS256,
];

/// Clock skew tolerance for exp validation, in seconds.
const CLOCK_SKEW_LEEWAY_SECS: u64 = 60;

/// ID token claims per OpenID Connect Core.
///
/// Claims outside the registered set land in `additional`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct IdTokenClaims {
    /// Issuer (iss)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Subject (sub) - the authenticated end user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Audience (aud) - string or array of strings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<Value>,

    /// Expiration time (exp) - Unix timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,

    /// Issued at (iat) - Unix timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,

    /// Not before (nbf) - Unix timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,

    /// Nonce echoed back from the authorization request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Any further claims
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

/// Outcome of the ParseIDToken phase: the claim set plus whether the
/// signature was verified against the operator's JWK Set.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIdToken {
    /// The decoded claim set
    pub claims: IdTokenClaims,
    /// Whether signature verification was performed and passed
    pub signature_verified: bool,
}

/// Decode the claim set of a compact JWT without verifying the signature.
pub(crate) fn decode_claims(id_token: &str) -> Result<IdTokenClaims, OidcError> {
    let mut segments = id_token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(OidcError::protocol(
            "malformed ID token: expected three dot-separated segments",
        ));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| OidcError::protocol(format!("malformed ID token payload: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| OidcError::protocol(format!("malformed ID token claims: {e}")))
}

/// Verify an ID token's signature against the operator JWK Set and return
/// the validated claims.
pub(crate) fn verify_signature(
    id_token: &str,
    jwks: &JwkSet,
) -> Result<IdTokenClaims, OidcError> {
    let header = decode_header(id_token)
        .map_err(|e| OidcError::protocol(format!("malformed ID token header: {e}")))?;

    if !ALLOWED_ALGORITHMS.contains(&header.alg) {
        return Err(OidcError::protocol(format!(
            "ID token signed with unsupported algorithm {:?}",
            header.alg
        )));
    }

    let jwk = match header.kid.as_deref() {
        Some(kid) => jwks
            .find(kid)
            .ok_or_else(|| OidcError::protocol(format!("no JWK matches kid {kid}")))?,
        None if jwks.keys.len() == 1 => &jwks.keys[0],
        None => {
            return Err(OidcError::protocol(
                "ID token names no kid and the JWK Set is ambiguous",
            ));
        }
    };

    let key = DecodingKey::from_jwk(jwk)
        .map_err(|e| OidcError::protocol(format!("unusable JWK: {e}")))?;

    let mut validation = Validation::new(header.alg);
    validation.validate_aud = false;
    validation.leeway = CLOCK_SKEW_LEEWAY_SECS;

    let data = decode::<IdTokenClaims>(id_token, &key, &validation)
        .map_err(|e| OidcError::protocol(format!("ID token verification failed: {e}")))?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    fn unsigned_token(claims: &IdTokenClaims) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());
        format!("{header}.{payload}.")
    }

    fn hs256_jwks(secret: &[u8], kid: &str) -> JwkSet {
        serde_json::from_value(json!({
            "keys": [{
                "kty": "oct",
                "kid": kid,
                "k": URL_SAFE_NO_PAD.encode(secret),
            }]
        }))
        .unwrap()
    }

    fn future_exp() -> u64 {
        (chrono::Utc::now().timestamp() as u64) + 3600
    }

    #[test]
    fn test_decode_claims_without_verification() {
        let claims = IdTokenClaims {
            iss: Some("https://operator.example.com".to_string()),
            sub: Some("subscriber-1".to_string()),
            nonce: Some("nonceABC".to_string()),
            exp: Some(future_exp()),
            ..Default::default()
        };

        let decoded = decode_claims(&unsigned_token(&claims)).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_decode_rejects_malformed_tokens() {
        assert!(matches!(
            decode_claims("only.two"),
            Err(OidcError::Protocol { .. })
        ));
        assert!(matches!(
            decode_claims("a.!!!.c"),
            Err(OidcError::Protocol { .. })
        ));
    }

    #[test]
    fn test_verify_signature_with_matching_key() {
        let secret = b"operator-shared-secret";
        let claims = IdTokenClaims {
            sub: Some("subscriber-1".to_string()),
            exp: Some(future_exp()),
            ..Default::default()
        };
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some("k1".to_string());
        let token = encode(&header, &claims, &EncodingKey::from_secret(secret)).unwrap();

        let verified = verify_signature(&token, &hs256_jwks(secret, "k1")).unwrap();
        assert_eq!(verified.sub.as_deref(), Some("subscriber-1"));
    }

    #[test]
    fn test_verify_signature_rejects_wrong_key() {
        let claims = IdTokenClaims {
            exp: Some(future_exp()),
            ..Default::default()
        };
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some("k1".to_string());
        let token = encode(&header, &claims, &EncodingKey::from_secret(b"right-secret")).unwrap();

        assert!(matches!(
            verify_signature(&token, &hs256_jwks(b"wrong-secret", "k1")),
            Err(OidcError::Protocol { .. })
        ));
    }

    #[test]
    fn test_verify_signature_requires_known_kid() {
        let claims = IdTokenClaims {
            exp: Some(future_exp()),
            ..Default::default()
        };
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some("unknown".to_string());
        let token = encode(&header, &claims, &EncodingKey::from_secret(b"secret")).unwrap();

        assert!(matches!(
            verify_signature(&token, &hs256_jwks(b"secret", "k1")),
            Err(OidcError::Protocol { .. })
        ));
    }
}
