//! Argon2 credential hashing.
//!
//! Hashes are PHC strings carrying their own salt and parameters, so
//! verification never needs anything but the stored string. Comparison
//! happens inside the Argon2 verifier in constant time.
use argon2::Argon2;
use argon2::PasswordHash;
use argon2::PasswordHasher;
use argon2::PasswordVerifier;
use argon2::password_hash::SaltString;

fn salt() -> Result<SaltString, argon2::password_hash::Error> {
    use rand::Rng;
    let ref mut bytes = [0u8; 16];
    rand::rng().fill(bytes);
    SaltString::encode_b64(&bytes[..])
}

/// One-way salted digest. Repeated calls on the same input differ.
pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
    Argon2::default()
        .hash_password(password.as_bytes(), &salt()?)
        .map(|h| h.to_string())
}

/// Fails closed on a malformed stored hash.
pub fn verify(password: &str, hashword: &str) -> bool {
    PasswordHash::new(hashword)
        .ok()
        .as_ref()
        .map(|hash| {
            Argon2::default()
                .verify_password(password.as_bytes(), hash)
                .is_ok()
        })
        .unwrap_or(false)
}

/// A well-formed hash of nothing anyone knows. Login verifies against it
/// when the email is unknown so both failure paths pay the same cost.
pub fn decoy() -> &'static str {
    static DECOY: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    DECOY.get_or_init(|| {
        let ref mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::rng(), bytes);
        let secret = bytes.iter().map(|b| format!("{:02x}", b)).collect::<String>();
        hash(&secret).unwrap_or_default()
    })
}
