use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::{debug, error};

use crate::config::HashingConfig;

const DUMMY_PASSWORD: &str = "fintrack-dummy-credential";

/// Argon2id password hasher shared by every request.
///
/// Verification reads the cost parameters back out of the stored PHC string, so
/// hashes created under older settings keep verifying after a config change.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    pub fn new(cfg: &HashingConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {e}"))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, DUMMY_PASSWORD)?;
        Ok(Self {
            argon2,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        hash_with(&self.argon2, plain)
    }

    /// Returns `false` for a wrong password and for a hash that cannot be parsed.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                debug!(error = %e, "argon2 parse hash error");
                return false;
            }
        };
        self.argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    /// Burns the same work as a real verification; always `false`.
    pub fn verify_dummy(&self, plain: &str) -> bool {
        let _ = self.verify(plain, &self.dummy_hash);
        false
    }
}

fn hash_with(argon2: &Argon2<'_>, plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(&HashingConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .expect("cheap argon2 params are valid")
}
