// src/integrations/supabase/pkce.rs
//
// Proof Key for Code Exchange helpers for the OAuth sign-in flow.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Challenge method sent to the authorize endpoint
pub const CHALLENGE_METHOD: &str = "s256";

/// Random code verifier, 43 URL-safe characters (32 bytes, base64url)
#[must_use]
pub fn generate_code_verifier() -> String {
    let random_bytes: [u8; 32] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// `BASE64URL(SHA256(verifier))`
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}
