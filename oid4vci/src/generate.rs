//! # Generate
//!
//! Random value generation for pre-authorized codes, access tokens, and
//! nonces.

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::Rng;

/// Generates a pre-authorized code: 32 bytes from a CSPRNG, base64url
/// encoded (43 characters, 256 bits).
#[must_use]
pub fn code() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    Base64UrlUnpadded::encode_string(&bytes)
}

/// Generates a bearer access token. Carries the same entropy as [`code`],
/// and is independent of it, so a token cannot be derived from the code it
/// was exchanged for.
#[must_use]
pub fn token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    Base64UrlUnpadded::encode_string(&bytes)
}

/// Generates a `c_nonce` for the wallet to bind into its proof of
/// possession.
#[must_use]
pub fn nonce() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    Base64UrlUnpadded::encode_string(&bytes)
}
