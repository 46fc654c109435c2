//! The group public key.

use core::fmt::{self, Debug};

use curve25519_dalek::edwards::EdwardsPoint;

use crate::ciphersuite::{Ed25519Group, Group};
use crate::{challenge, Error, Signature};

/// The public key of the whole group, under which aggregate signatures
/// verify.
///
/// Byte-identical to the Ed25519 public key of the group secret: splitting
/// an existing Ed25519 key yields the very same 32 bytes.
#[derive(Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerifyingKey {
    #[cfg_attr(feature = "serde", serde(with = "crate::serialization::element"))]
    pub(crate) element: EdwardsPoint,
}

impl VerifyingKey {
    pub(crate) fn new(element: EdwardsPoint) -> Self {
        Self { element }
    }

    #[allow(dead_code)]
    pub(crate) fn to_element(self) -> EdwardsPoint {
        self.element
    }

    /// Parse a verifying key from its compressed 32-byte encoding,
    /// rejecting the identity and elements outside the prime-order
    /// subgroup.
    pub fn deserialize(bytes: &[u8; 32]) -> Result<Self, Error> {
        Ok(Self::new(Ed25519Group::deserialize(bytes)?))
    }

    /// The compressed 32-byte encoding of this key.
    pub fn serialize(&self) -> [u8; 32] {
        self.element.compress().to_bytes()
    }

    /// Verify `signature` over `msg` under this key.
    ///
    /// Checks `z·G = R + c·PK` with `c = H(encode(R) ‖ encode(PK) ‖ msg)`,
    /// comparing the compressed encodings of both sides.
    pub fn verify(&self, msg: &[u8], signature: &Signature) -> Result<(), Error> {
        let c = challenge(&signature.R, self, msg);

        let lhs = Ed25519Group::generator() * signature.z;
        let rhs = signature.R + self.element * c;

        if lhs.compress() == rhs.compress() {
            Ok(())
        } else {
            Err(Error::InvalidSignature)
        }
    }
}

impl Debug for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VerifyingKey")
            .field(&hex::encode(self.serialize()))
            .finish()
    }
}
