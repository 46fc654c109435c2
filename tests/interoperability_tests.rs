use rand::thread_rng;

use frost25519::{keys, sign, threshold_sign, Config, SigningKey};

mod helpers;

/// Threshold signatures verify with an independent RFC 8032 Ed25519
/// verifier, across repeated fresh keys.
#[test]
fn threshold_signatures_are_rfc8032_ed25519() {
    let mut rng = thread_rng();
    let config = Config::new(2, 3).unwrap();

    for i in 0..64 {
        let message = format!("interoperability {i}").into_bytes();
        let (key_packages, pubkeys) = keys::generate(&config, &mut rng).unwrap();

        let signature =
            threshold_sign(&key_packages, &message, &pubkeys, &config, &mut rng).unwrap();

        helpers::verify_with_rfc8032(&message, &signature, pubkeys.verifying_key());
    }
}

/// Interoperability holds for every small `(t, n)`, not just the default
/// shape.
#[test]
fn threshold_sweep_is_rfc8032_ed25519() {
    let mut rng = thread_rng();

    for n in 1..=8u32 {
        for t in 1..=n {
            let config = Config::new(t, n).unwrap();
            let message = format!("sweep interop {t}-of-{n}").into_bytes();

            let (key_packages, pubkeys) = keys::generate(&config, &mut rng).unwrap();
            let signature =
                threshold_sign(&key_packages, &message, &pubkeys, &config, &mut rng).unwrap();

            helpers::verify_with_rfc8032(&message, &signature, pubkeys.verifying_key());
        }
    }
}

/// Single-signer signatures and the re-split `sign` facade agree with
/// RFC 8032 as well.
#[test]
fn single_signer_and_facade_are_rfc8032_ed25519() {
    let mut rng = thread_rng();
    let config = Config::new(2, 3).unwrap();

    let key = SigningKey::new(&mut rng);
    let verifying_key = frost25519::VerifyingKey::from(&key);

    let direct = key.sign(&mut rng, b"single signer");
    helpers::verify_with_rfc8032(b"single signer", &direct, &verifying_key);

    let threshold = sign(&key, b"via facade", &config, &mut rng).unwrap();
    helpers::verify_with_rfc8032(b"via facade", &threshold, &verifying_key);
}
