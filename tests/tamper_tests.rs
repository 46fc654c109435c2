use std::sync::OnceLock;

use proptest::prelude::*;
use rand::thread_rng;

use frost25519::{keys, threshold_sign, Config, Coordinator, VerifyingKey};

/// The group order ℓ, little-endian.
const ELL: [u8; 32] = [
    0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9, 0xde,
    0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x10,
];

const MESSAGE: &[u8] = b"tamper with me";

fn fixture() -> &'static ([u8; 64], VerifyingKey) {
    static FIXTURE: OnceLock<([u8; 64], VerifyingKey)> = OnceLock::new();
    FIXTURE.get_or_init(|| {
        let mut rng = thread_rng();
        let config = Config::new(2, 3).unwrap();
        let (key_packages, pubkeys) = keys::generate(&config, &mut rng).unwrap();
        let signature =
            threshold_sign(&key_packages, MESSAGE, &pubkeys, &config, &mut rng).unwrap();
        (signature.serialize(), *pubkeys.verifying_key())
    })
}

#[test]
fn the_fixture_signature_verifies() {
    let (signature, verifying_key) = fixture();
    assert!(Coordinator::verify(signature, MESSAGE, verifying_key));
}

/// Flipping bit 0 of `z` or bit 0 of the message invalidates the
/// signature.
#[test]
fn flipping_z_or_message_fails_verification() {
    let (signature, verifying_key) = fixture();

    let mut bad_signature = *signature;
    bad_signature[32] ^= 1;
    assert!(!Coordinator::verify(&bad_signature, MESSAGE, verifying_key));

    let mut bad_message = MESSAGE.to_vec();
    bad_message[0] ^= 1;
    assert!(!Coordinator::verify(signature, &bad_message, verifying_key));
}

/// A non-canonical `z` encoding (`z + ℓ`, same residue) is rejected even
/// though it denotes the same scalar.
#[test]
fn noncanonical_z_is_rejected() {
    let (signature, verifying_key) = fixture();

    let mut z = [0u8; 32];
    z.copy_from_slice(&signature[32..]);

    // z + ℓ fits in 255 bits, so no carry out of the buffer.
    let mut carry = 0u16;
    for (byte, ell) in z.iter_mut().zip(ELL) {
        let sum = u16::from(*byte) + u16::from(ell) + carry;
        *byte = sum as u8;
        carry = sum >> 8;
    }
    assert_eq!(carry, 0);

    let mut bad = *signature;
    bad[32..].copy_from_slice(&z);
    assert!(!Coordinator::verify(&bad, MESSAGE, verifying_key));
}

/// Low-order and identity `R` encodings are rejected.
#[test]
fn low_order_r_is_rejected() {
    let (signature, verifying_key) = fixture();

    let order_eight =
        hex::decode("c7176a703d4dd84fba3c0b760d10670f2a2053fa2c39ccc64ec7fd7792ac037a").unwrap();
    let mut bad = *signature;
    bad[..32].copy_from_slice(&order_eight);
    assert!(!Coordinator::verify(&bad, MESSAGE, verifying_key));

    let mut identity = [0u8; 32];
    identity[0] = 1;
    bad[..32].copy_from_slice(&identity);
    assert!(!Coordinator::verify(&bad, MESSAGE, verifying_key));
}

/// Signatures of the wrong length are rejected.
#[test]
fn wrong_length_is_rejected() {
    let (signature, verifying_key) = fixture();

    assert!(!Coordinator::verify(&signature[..63], MESSAGE, verifying_key));
    let mut long = signature.to_vec();
    long.push(0);
    assert!(!Coordinator::verify(&long, MESSAGE, verifying_key));
    assert!(!Coordinator::verify(&[], MESSAGE, verifying_key));
}

proptest! {
    /// Flipping any single bit of the 64-byte signature invalidates it.
    #[test]
    fn flipping_any_signature_bit_fails_verification(bit in 0usize..512) {
        let (signature, verifying_key) = fixture();

        let mut bad = *signature;
        bad[bit / 8] ^= 1 << (bit % 8);
        prop_assert!(!Coordinator::verify(&bad, MESSAGE, verifying_key));
    }

    /// Flipping any single bit of the message invalidates the signature.
    #[test]
    fn flipping_any_message_bit_fails_verification(bit in 0usize..(MESSAGE.len() * 8)) {
        let (signature, verifying_key) = fixture();

        let mut bad = MESSAGE.to_vec();
        bad[bit / 8] ^= 1 << (bit % 8);
        prop_assert!(!Coordinator::verify(signature, &bad, verifying_key));
    }
}
