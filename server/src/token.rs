use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Session tokens expire this many days after issuance
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Claims embedded in a session token.
///
/// The token is the only record of the session; nothing is persisted
/// server-side, so expiry is enforced purely by the `exp` claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account identifier
    pub sub: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// Sign a session token for the given account, valid for `ttl` from now.
pub fn issue(
    identifier: &str,
    display_name: &str,
    secret: &str,
    ttl: chrono::Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: identifier.to_owned(),
        display_name: display_name.to_owned(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode and validate a session token, returning its claims.
///
/// Fails on a bad signature or once the expiry has elapsed; expiry is
/// checked with zero leeway.
pub fn verify(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    const SECRET: &str = "test-signing-secret";

    #[test]
    fn issued_token_round_trips() {
        let token = issue("u1", "Alice", SECRET, chrono::Duration::days(TOKEN_TTL_DAYS))
            .expect("Failed to issue token");

        let claims = verify(&token, SECRET).expect("Failed to verify token");

        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.display_name, "Alice");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_DAYS * 24 * 60 * 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue("u1", "Alice", SECRET, chrono::Duration::seconds(-1))
            .expect("Failed to issue token");

        let err = verify(&token, SECRET).expect_err("Expired token verified");

        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue("u1", "Alice", SECRET, chrono::Duration::days(TOKEN_TTL_DAYS))
            .expect("Failed to issue token");

        let err = verify(&token, "some-other-secret").expect_err("Forged token verified");

        assert!(matches!(err.kind(), ErrorKind::InvalidSignature));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = issue("u1", "Alice", SECRET, chrono::Duration::days(TOKEN_TTL_DAYS))
            .expect("Failed to issue token");

        // Flip a character in the payload segment
        let mut tampered = token.into_bytes();
        let dot = tampered.iter().position(|&b| b == b'.').unwrap() + 1;
        tampered[dot] = if tampered[dot] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();

        assert!(verify(&tampered, SECRET).is_err());
    }
}
