//! Credential hasher - one-way password hashing and verification
//!
//! New digests use the configured scheme. Verification reads the scheme from
//! the digest itself, so accounts hashed under either scheme keep working
//! after the configuration changes.

use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::result::{Error, Result};
use crate::domain::{Argon2Params, PasswordScheme, SALT_LEN};

const ARGON2_PREFIX: &str = "argon2id";
const DIGEST_SEPARATOR: char = '$';

/// Hashes and verifies account passwords
#[derive(Debug, Clone, Default)]
pub struct CredentialHasher {
    scheme: PasswordScheme,
    params: Argon2Params,
}

impl CredentialHasher {
    pub fn new(scheme: PasswordScheme, params: Argon2Params) -> Self {
        Self { scheme, params }
    }

    /// Unsalted SHA-256 hasher
    pub fn sha256() -> Self {
        Self::new(PasswordScheme::Sha256, Argon2Params::default())
    }

    /// Hash a password with the configured scheme
    pub fn hash(&self, password: &str) -> Result<String> {
        match self.scheme {
            PasswordScheme::Sha256 => Ok(sha256_hex(password)),
            PasswordScheme::Argon2id => {
                let mut salt = [0u8; SALT_LEN];
                rand::thread_rng().fill_bytes(&mut salt);
                let key = derive_key(password, &salt, &self.params)?;
                Ok(format_argon2_digest(&salt, &self.params, &key))
            }
        }
    }

    /// True iff `candidate` hashes to `digest`
    pub fn verify(&self, candidate: &str, digest: &str) -> bool {
        if digest.starts_with(ARGON2_PREFIX) {
            return verify_argon2(candidate, digest);
        }
        if is_sha256_digest(digest) {
            return constant_time_eq(sha256_hex(candidate).as_bytes(), digest.as_bytes());
        }
        tracing::warn!("stored password digest has an unrecognized format");
        false
    }
}

/// Lowercase hex SHA-256 of the password bytes
pub fn sha256_hex(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn is_sha256_digest(digest: &str) -> bool {
    digest.len() == 64 && digest.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Derive a key from a password using Argon2id
fn derive_key(password: &str, salt: &[u8], params: &Argon2Params) -> Result<Vec<u8>> {
    let argon2_params = argon2::Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(params.hash_len as usize),
    )
    .map_err(|e| Error::credential(format!("invalid argon2 params: {e}")))?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let mut key = vec![0u8; params.hash_len as usize];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| Error::credential(format!("failed to derive key: {e}")))?;

    Ok(key)
}

/// `argon2id$<salt b64>$<memory>$<time>$<parallelism>$<key hex>`
fn format_argon2_digest(salt: &[u8], params: &Argon2Params, key: &[u8]) -> String {
    let salt_b64 = base64::engine::general_purpose::STANDARD.encode(salt);
    [
        ARGON2_PREFIX.to_string(),
        salt_b64,
        params.memory_cost.to_string(),
        params.time_cost.to_string(),
        params.parallelism.to_string(),
        hex::encode(key),
    ]
    .join(&DIGEST_SEPARATOR.to_string())
}

fn parse_argon2_digest(digest: &str) -> Option<(Vec<u8>, Argon2Params, Vec<u8>)> {
    let parts: Vec<&str> = digest.split(DIGEST_SEPARATOR).collect();
    let [prefix, salt, memory, time, parallelism, key] = parts.as_slice() else {
        return None;
    };
    if *prefix != ARGON2_PREFIX {
        return None;
    }

    let salt = base64::engine::general_purpose::STANDARD.decode(salt).ok()?;
    let key = hex::decode(key).ok()?;
    let params = Argon2Params {
        memory_cost: memory.parse().ok()?,
        time_cost: time.parse().ok()?,
        parallelism: parallelism.parse().ok()?,
        hash_len: u32::try_from(key.len()).ok()?,
    };
    Some((salt, params, key))
}

fn verify_argon2(candidate: &str, digest: &str) -> bool {
    let Some((salt, params, expected)) = parse_argon2_digest(digest) else {
        tracing::warn!("stored argon2 digest is malformed");
        return false;
    };
    match derive_key(candidate, &salt, &params) {
        Ok(key) => constant_time_eq(&key, &expected),
        Err(e) => {
            tracing::warn!(error = %e, "could not verify argon2 digest");
            false
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Small parameters so tests stay fast
    fn fast_params() -> Argon2Params {
        Argon2Params {
            time_cost: 1,
            memory_cost: 256,
            parallelism: 1,
            hash_len: 16,
        }
    }

    #[test]
    fn test_sha256_known_digest() {
        assert_eq!(
            sha256_hex("password123"),
            "ef92b778bafe771e89245b89ecbc08a44a4e166c06659911881f383d4473e94f"
        );
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_hash_is_deterministic() {
        let hasher = CredentialHasher::sha256();
        let first = hasher.hash("password123").unwrap();
        assert_eq!(first, hasher.hash("password123").unwrap());
        assert_ne!(first, "password123");
        assert_ne!(first, hasher.hash("password321").unwrap());
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_sha256_verify() {
        let hasher = CredentialHasher::sha256();
        let digest = hasher.hash("pw1").unwrap();
        assert!(hasher.verify("pw1", &digest));
        assert!(!hasher.verify("pw2", &digest));
        assert!(!hasher.verify("PW1", &digest));
    }

    #[test]
    fn test_empty_password_has_valid_digest() {
        let hasher = CredentialHasher::sha256();
        let digest = hasher.hash("").unwrap();
        assert!(hasher.verify("", &digest));
        assert!(!hasher.verify(" ", &digest));
    }

    #[test]
    fn test_argon2_salted_and_verifiable() {
        let hasher = CredentialHasher::new(PasswordScheme::Argon2id, fast_params());
        let first = hasher.hash("pw1").unwrap();
        let second = hasher.hash("pw1").unwrap();

        assert!(first.starts_with("argon2id$"));
        assert!(!first.contains(','));
        assert_ne!(first, second);
        assert!(hasher.verify("pw1", &first));
        assert!(hasher.verify("pw1", &second));
        assert!(!hasher.verify("pw2", &first));
    }

    #[test]
    fn test_verify_reads_scheme_from_digest() {
        let argon = CredentialHasher::new(PasswordScheme::Argon2id, fast_params());
        let sha = CredentialHasher::sha256();

        let legacy = sha.hash("secret").unwrap();
        let modern = argon.hash("secret").unwrap();
        assert!(argon.verify("secret", &legacy));
        assert!(sha.verify("secret", &modern));
    }

    #[test]
    fn test_verify_rejects_garbage_digest() {
        let hasher = CredentialHasher::sha256();
        assert!(!hasher.verify("pw", "not-a-digest"));
        assert!(!hasher.verify("pw", "argon2id$bad"));
        assert!(!hasher.verify("pw", ""));
    }

    #[test]
    fn test_invalid_params_error() {
        let params = Argon2Params {
            time_cost: 0,
            ..fast_params()
        };
        let hasher = CredentialHasher::new(PasswordScheme::Argon2id, params);
        assert!(matches!(hasher.hash("pw"), Err(Error::Credential(_))));
    }
}
