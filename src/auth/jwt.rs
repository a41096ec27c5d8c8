use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::Claims;
use crate::{config::JwtConfig, error::AppError};

/// Holds the HMAC signing and verification keys loaded at startup.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenService {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        self.issue_with_ttl(user_id, self.ttl)
    }

    pub fn issue_with_ttl(&self, user_id: Uuid, ttl: Duration) -> Result<String, AppError> {
        self.issue_at(user_id, ttl, OffsetDateTime::now_utc())
    }

    fn issue_at(
        &self,
        user_id: Uuid,
        ttl: Duration,
        now: OffsetDateTime,
    ) -> Result<String, AppError> {
        let exp = now + ttl;
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(AppError::unexpected)?;
        debug!(user_id = %user_id, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt rejected");
            AppError::InvalidToken
        })?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
pub(crate) fn test_tokens(secret: &str) -> TokenService {
    TokenService::new(&JwtConfig {
        secret: secret.into(),
        algorithm: Algorithm::HS256,
        ttl_minutes: 30,
    })
}
