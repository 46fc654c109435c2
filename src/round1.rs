//! Round 1: nonce generation and commitment.

use core::fmt::{self, Debug};

use curve25519_dalek::{edwards::EdwardsPoint, scalar::Scalar};
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::ciphersuite::{Ed25519Group, Ed25519ScalarField, Field, Group};
use crate::Error;

/// A secret signing nonce.
#[derive(Clone, PartialEq, Eq, Zeroize)]
pub struct Nonce(pub(crate) Scalar);

impl Nonce {
    /// Generate a fresh nonce, uniform over `[1, ℓ-1]`.
    fn new<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self(Ed25519ScalarField::random_nonzero(rng))
    }

    pub(crate) fn to_scalar(&self) -> Scalar {
        self.0
    }
}

impl Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Nonce").field(&"<redacted>").finish()
    }
}

/// A group element that is a commitment to a signing nonce.
#[derive(Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NonceCommitment(
    #[cfg_attr(feature = "serde", serde(with = "crate::serialization::element"))]
    pub(crate)  EdwardsPoint,
);

impl NonceCommitment {
    pub(crate) fn to_element(&self) -> EdwardsPoint {
        self.0
    }

    /// Parse a nonce commitment from its compressed 32-byte encoding,
    /// rejecting the identity and elements outside the prime-order
    /// subgroup.
    pub fn deserialize(bytes: &[u8; 32]) -> Result<Self, Error> {
        Ok(Self(Ed25519Group::deserialize(bytes)?))
    }

    /// The compressed 32-byte encoding of this commitment.
    pub fn serialize(&self) -> Result<[u8; 32], Error> {
        Ok(Ed25519Group::serialize(&self.0)?)
    }
}

impl Debug for NonceCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NonceCommitment")
            .field(&hex::encode(self.0.compress().to_bytes()))
            .finish()
    }
}

impl From<&Nonce> for NonceCommitment {
    fn from(nonce: &Nonce) -> Self {
        Self(Ed25519Group::generator() * nonce.to_scalar())
    }
}

/// The hiding and binding nonces of one signing attempt.
///
/// This value is move-only and consumed by
/// [`round2::sign`](crate::round2::sign), which makes reuse across signing
/// sessions a compile error rather than a key-leaking mistake. It is
/// zeroized on drop, so abandoning a session destroys the nonces. It must
/// never leave the signer's process.
#[derive(PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SigningNonces {
    /// The hiding nonce `d`.
    pub(crate) hiding: Nonce,
    /// The binding nonce `e`.
    pub(crate) binding: Nonce,
    /// The commitments to the two nonces, kept alongside so round 2 does
    /// not recompute them.
    #[zeroize(skip)]
    pub(crate) commitments: SigningCommitments,
}

impl SigningNonces {
    /// Generate a fresh nonce pair with its commitments.
    pub(crate) fn new<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let hiding = Nonce::new(rng);
        let binding = Nonce::new(rng);

        let commitments = SigningCommitments {
            hiding: (&hiding).into(),
            binding: (&binding).into(),
        };

        Self {
            hiding,
            binding,
            commitments,
        }
    }

    /// The public commitments matching these nonces.
    pub fn commitments(&self) -> &SigningCommitments {
        &self.commitments
    }
}

impl Debug for SigningNonces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningNonces")
            .field("hiding", &"<redacted>")
            .field("binding", &"<redacted>")
            .finish()
    }
}

/// Published by each participant in the first round of the signing
/// protocol: the pair `(D, E)` of nonce commitments.
///
/// Each commitment pair is good for exactly one signature.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SigningCommitments {
    /// Commitment `D` to the hiding nonce.
    pub(crate) hiding: NonceCommitment,
    /// Commitment `E` to the binding nonce.
    pub(crate) binding: NonceCommitment,
}

impl SigningCommitments {
    /// Commitment `D` to the hiding nonce.
    pub fn hiding(&self) -> &NonceCommitment {
        &self.hiding
    }

    /// Commitment `E` to the binding nonce.
    pub fn binding(&self) -> &NonceCommitment {
        &self.binding
    }
}

/// Performed once by each participant selected for the signing operation.
///
/// Samples the hiding and binding nonces and computes their commitments.
/// The nonces are returned for the participant to keep across the round
/// trip to the coordinator; the commitments are sent to the coordinator.
pub fn commit<R: RngCore + CryptoRng>(rng: &mut R) -> (SigningNonces, SigningCommitments) {
    let nonces = SigningNonces::new(rng);
    let commitments = *nonces.commitments();

    (nonces, commitments)
}
