use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};

use crate::services::auth::AuthError;
use crate::services::auth::claims::Claims;

/// HS256 access-token verifier.
#[derive(Clone)]
pub struct TokenParser {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material.
        f.debug_struct("TokenParser")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenParser {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is judged by the middleware, not here: an authentic but
        // expired token must still parse so its claims can drive rotation.
        validation.validate_exp = false;
        validation.validate_aud = false;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify the signature, then decode the claims in one strict step.
    ///
    /// No claim is trusted before the MAC verifies. Any shape mismatch —
    /// non-UUID subject, missing `exp`, unknown role string, absent
    /// capability flag — is a single malformed-token error rather than a
    /// defaulted field.
    pub fn parse_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Malformed,
            })?;

        Ok(data.claims)
    }
}

/// Extract the expiry segment of an opaque refresh token.
///
/// The digest is one-way and is not re-derived here; expiry is the only
/// thing a refresh token can be asked about. Exactly two `.`-separated
/// segments with a numeric suffix, or the token is malformed.
pub fn parse_refresh_expiry(token: &str) -> Result<i64, AuthError> {
    let mut parts = token.split('.');
    let (Some(digest), Some(exp), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AuthError::Malformed);
    };
    if digest.is_empty() {
        return Err(AuthError::Malformed);
    }
    exp.parse::<i64>().map_err(|_| AuthError::Malformed)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::services::auth::roles::{Capability, Role, capabilities_for};
    use crate::services::auth::token_issuer::AccessTokenIssuer;

    const SECRET: &str = "test-secret";

    fn issue(role: Role) -> (Uuid, String) {
        let subject = Uuid::new_v4();
        let issued = AccessTokenIssuer::new(SECRET, 15)
            .issue(subject, role, Utc::now())
            .unwrap();
        (subject, issued.token)
    }

    #[test]
    fn round_trip_preserves_subject_role_and_flags() {
        for role in [Role::User, Role::Admin] {
            let (subject, token) = issue(role);
            let claims = TokenParser::new(SECRET).parse_access_token(&token).unwrap();

            assert_eq!(claims.id, subject);
            assert_eq!(claims.role, role);
            for cap in Capability::ALL {
                assert_eq!(claims.allows(cap), capabilities_for(role).contains(&cap));
            }
        }
    }

    #[test]
    fn wrong_key_is_rejected() {
        let (_, token) = issue(Role::User);
        let err = TokenParser::new("other-secret")
            .parse_access_token(&token)
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidSignature);
    }

    #[test]
    fn any_byte_flip_breaks_verification() {
        let (_, token) = issue(Role::Admin);
        let parser = TokenParser::new(SECRET);

        // Flip a byte in each segment: header, payload, signature.
        for idx in [1, token.len() / 2, token.len() - 2] {
            let mut bytes = token.clone().into_bytes();
            bytes[idx] = if bytes[idx] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert!(
                parser.parse_access_token(&tampered).is_err(),
                "tampered byte {idx} still verified"
            );
        }
    }

    #[test]
    fn garbage_is_malformed_not_a_panic() {
        let parser = TokenParser::new(SECRET);
        for junk in ["", "x", "a.b", "a.b.c", "....."] {
            assert!(parser.parse_access_token(junk).is_err());
        }
    }

    #[test]
    fn expired_tokens_still_parse() {
        let issued = AccessTokenIssuer::new(SECRET, 0)
            .issue(Uuid::new_v4(), Role::User, Utc::now())
            .unwrap();
        let claims = TokenParser::new(SECRET)
            .parse_access_token(&issued.token)
            .unwrap();
        assert!(claims.is_expired(claims.exp + 1));
    }

    #[test]
    fn refresh_expiry_parses_the_numeric_suffix() {
        assert_eq!(parse_refresh_expiry("abcdef.1700000000").unwrap(), 1_700_000_000);
    }

    #[test]
    fn refresh_expiry_rejects_wrong_segment_shapes() {
        for junk in [
            "",
            "no-separator",
            "digest.",
            ".1700000000",
            "digest.123.456",
            "digest.not-a-number",
        ] {
            assert_eq!(parse_refresh_expiry(junk).unwrap_err(), AuthError::Malformed);
        }
    }
}
