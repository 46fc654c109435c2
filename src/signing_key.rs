//! The group signing key.

use core::fmt::{self, Debug};

use curve25519_dalek::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::ciphersuite::{Ed25519Group, Ed25519ScalarField, Field, Group};
use crate::{challenge, Error, Signature, VerifyingKey};

/// The DER prefix of a PKCS#8 v1 (RFC 5958) `OneAsymmetricKey` structure
/// holding an Ed25519 private key: a 48-byte SEQUENCE of version 0, the
/// id-Ed25519 algorithm identifier (OID 1.3.101.112) and an OCTET STRING
/// wrapping the 32-byte seed.
const PKCS8_ED25519_PREFIX: [u8; 16] = [
    0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x04, 0x22, 0x04,
    0x20,
];

/// The group secret: a nonzero scalar whose base-point multiple is the
/// group [`VerifyingKey`].
///
/// The scalar is zeroized on drop. The Debug impl never prints it.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SigningKey {
    pub(crate) scalar: Scalar,
}

impl SigningKey {
    /// Generate a fresh signing key, uniform over `[1, ℓ-1]`.
    pub fn new<R: RngCore + CryptoRng>(rng: &mut R) -> SigningKey {
        SigningKey {
            scalar: Ed25519ScalarField::random_nonzero(rng),
        }
    }

    /// Import a raw 32-byte scalar, little-endian and already reduced
    /// mod ℓ.
    ///
    /// Fails with [`Error::InvalidKeyFormat`] on non-canonical encodings
    /// and on zero.
    pub fn deserialize(bytes: &[u8; 32]) -> Result<SigningKey, Error> {
        let scalar =
            Ed25519ScalarField::deserialize(bytes).map_err(|_| Error::InvalidKeyFormat)?;
        if scalar == Scalar::ZERO {
            return Err(Error::InvalidKeyFormat);
        }
        Ok(SigningKey { scalar })
    }

    /// Derive the signing scalar from a 32-byte Ed25519 seed, as RFC 8032
    /// does: the low half of `SHA-512(seed)` with the standard clamp
    /// applied.
    ///
    /// The derived [`VerifyingKey`] equals the Ed25519 public key of the
    /// seed byte-for-byte.
    pub fn from_seed(seed: &[u8; 32]) -> SigningKey {
        let digest = Sha512::digest(seed);
        let mut scalar_bytes = [0u8; 32];
        scalar_bytes.copy_from_slice(&digest[..32]);
        scalar_bytes[0] &= 248;
        scalar_bytes[31] &= 127;
        scalar_bytes[31] |= 64;

        // The clamped value is a multiple of 8 in [2^254, 2^255); no
        // multiple of ℓ in that range is divisible by 8, so the reduction
        // cannot yield zero.
        let scalar = Scalar::from_bytes_mod_order(scalar_bytes);
        scalar_bytes.zeroize();

        SigningKey { scalar }
    }

    /// Import a DER-encoded PKCS#8 Ed25519 private key, the format
    /// produced by platform keystores and `openssl genpkey`.
    ///
    /// Only the v1 seed form is accepted; the inner 32 bytes go through
    /// [`SigningKey::from_seed`].
    pub fn from_pkcs8_der(der: &[u8]) -> Result<SigningKey, Error> {
        if der.len() != PKCS8_ED25519_PREFIX.len() + 32
            || der[..PKCS8_ED25519_PREFIX.len()] != PKCS8_ED25519_PREFIX
        {
            return Err(Error::InvalidKeyFormat);
        }

        let mut seed = [0u8; 32];
        seed.copy_from_slice(&der[PKCS8_ED25519_PREFIX.len()..]);
        let key = Self::from_seed(&seed);
        seed.zeroize();
        Ok(key)
    }

    /// The canonical 32-byte encoding of the scalar.
    pub fn serialize(&self) -> [u8; 32] {
        Ed25519ScalarField::serialize(&self.scalar)
    }

    /// Sign `msg` directly with the group secret, producing a plain
    /// Schnorr signature over Ed25519.
    ///
    /// This is single-signer signing; it involves no shares and exists for
    /// use after [`recover`](crate::keys::reconstruct) and as an
    /// independent cross-check in tests.
    pub fn sign<R: RngCore + CryptoRng>(&self, rng: &mut R, msg: &[u8]) -> Signature {
        let k = Ed25519ScalarField::random_nonzero(rng);

        let R = Ed25519Group::generator() * k;

        let c = challenge(&R, &VerifyingKey::from(self), msg);

        let z = k + (c * self.scalar);

        Signature { R, z }
    }

    /// Creates a SigningKey from a scalar.
    pub(crate) fn from_scalar(scalar: Scalar) -> Self {
        Self { scalar }
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SigningKey").field(&"<redacted>").finish()
    }
}

impl From<&SigningKey> for VerifyingKey {
    fn from(signing_key: &SigningKey) -> Self {
        VerifyingKey::new(Ed25519Group::generator() * signing_key.scalar)
    }
}

impl From<SigningKey> for VerifyingKey {
    fn from(signing_key: SigningKey) -> Self {
        VerifyingKey::from(&signing_key)
    }
}
