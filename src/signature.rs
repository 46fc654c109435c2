//! Schnorr signatures over the Ed25519 prime-order subgroup.

use core::fmt::{self, Debug};

use curve25519_dalek::{edwards::EdwardsPoint, scalar::Scalar};

use crate::ciphersuite::{Ed25519Group, Ed25519ScalarField, Field, Group};
use crate::Error;

/// A Schnorr signature `(R, z)`, wire-encoded as the 64 bytes
/// `encode(R) ‖ encode(z)`.
///
/// Structurally identical to a standard Ed25519 signature: `R` is a
/// compressed point, `z` a canonical scalar, and the pair verifies with any
/// RFC 8032 verifier against the group public key.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Signature {
    /// The commitment `R` to the signature nonce.
    pub(crate) R: EdwardsPoint,
    /// The response `z` to the challenge computed from `R`, the verifying
    /// key and the message.
    pub(crate) z: Scalar,
}

impl Signature {
    /// Parse a signature from its 64-byte encoding.
    ///
    /// Fails with [`Error::MalformedSignature`] when `R` is not a canonical
    /// encoding of a prime-order-subgroup element or `z` is not a canonical
    /// scalar (`z ≥ ℓ`).
    pub fn deserialize(bytes: &[u8; 64]) -> Result<Self, Error> {
        let mut R_bytes = [0u8; 32];
        let mut z_bytes = [0u8; 32];
        R_bytes.copy_from_slice(&bytes[..32]);
        z_bytes.copy_from_slice(&bytes[32..]);

        let R = Ed25519Group::deserialize(&R_bytes).map_err(|_| Error::MalformedSignature)?;
        let z = Ed25519ScalarField::deserialize(&z_bytes).map_err(|_| Error::MalformedSignature)?;

        Ok(Self { R, z })
    }

    /// The 64-byte `R ‖ z` encoding of this signature.
    pub fn serialize(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.R.compress().to_bytes());
        bytes[32..].copy_from_slice(&Ed25519ScalarField::serialize(&self.z));
        bytes
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("R", &hex::encode(self.R.compress().to_bytes()))
            .field("z", &hex::encode(Ed25519ScalarField::serialize(&self.z)))
            .finish()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serdect::slice::serialize_hex_lower_or_bin(&self.serialize(), serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bytes = serdect::slice::deserialize_hex_or_bin_vec(deserializer)?;
        let array: [u8; 64] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("invalid signature length"))?;
        Signature::deserialize(&array).map_err(serde::de::Error::custom)
    }
}
