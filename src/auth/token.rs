use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

pub const ISSUER: &str = "dep-registry";
const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// The signed payload of an identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub exp: i64,
}

/// Issues and checks HS256-signed identity tokens.
///
/// Tokens are stateless: nothing is stored server side, so a token stays
/// valid until it expires.
pub struct TokenService {
    key: Vec<u8>,
    ttl: Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(key: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            ttl,
        }
    }

    pub fn generate(&self, username: &str) -> Result<String> {
        self.generate_at(username, Utc::now())
    }

    pub fn generate_at(&self, username: &str, now: DateTime<Utc>) -> Result<String> {
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: username.to_string(),
            iss: ISSUER.to_string(),
            exp: now.timestamp().saturating_add(ttl),
        };
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
        };

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    /// Returns the username the token was issued for.
    pub fn validate(&self, token: &str) -> Result<String> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<String> {
        let claims = self.decode(token)?;
        if claims.exp <= now.timestamp() {
            return Err(Error::TokenExpired);
        }
        Ok(claims.sub)
    }

    /// Verifies the signature and returns the claims without checking expiry.
    fn decode(&self, token: &str) -> Result<Claims> {
        let mut parts = token.split('.');
        let (Some(header_segment), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::MalformedToken);
        };

        let header: Header = decode_segment(header_segment)?;
        if header.alg != ALGORITHM {
            return Err(Error::MalformedToken);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| Error::MalformedToken)?;

        let signing_input = &token[..header_segment.len() + 1 + payload.len()];
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| Error::InvalidSignature)?;

        let claims: Claims = decode_segment(payload)?;
        if claims.iss != ISSUER || claims.sub.is_empty() {
            return Err(Error::MalformedToken);
        }
        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.key)
            .map_err(|e| Error::Config(format!("invalid signing key: {e}")))
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| Error::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| Error::MalformedToken)
}
