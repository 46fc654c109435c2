use ed25519_dalek::Verifier;

use frost25519::{Signature, VerifyingKey};

/// Check that a signature verifies with the `ed25519-dalek` crate, i.e.
/// with an independent RFC 8032 Ed25519 verifier.
pub fn verify_with_rfc8032(msg: &[u8], signature: &Signature, verifying_key: &VerifyingKey) {
    let sig = ed25519_dalek::Signature::from_bytes(&signature.serialize());
    let pub_key = ed25519_dalek::VerifyingKey::from_bytes(&verifying_key.serialize()).unwrap();
    assert!(pub_key.verify(msg, &sig).is_ok());
}
