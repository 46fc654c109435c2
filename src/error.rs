//! Error types.

use thiserror::Error;

use crate::Identifier;

/// An error produced by one of the protocol operations.
///
/// All public entry points fail closed: any invariant breach produces one of
/// these kinds and nothing is silently repaired. The only exception is
/// [`Coordinator::verify`](crate::Coordinator::verify), which folds every
/// failure into `false` so callers cannot distinguish a bad signature from a
/// malformed one.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// The `(t, n)` threshold configuration is invalid.
    #[error("threshold must satisfy 1 <= min_signers <= max_signers")]
    InvalidThreshold,
    /// A secret key input could not be interpreted as an Ed25519 key.
    #[error("malformed secret key input")]
    InvalidKeyFormat,
    /// A participant identifier was zero.
    #[error("malformed participant identifier")]
    MalformedIdentifier,
    /// Fewer commitments than the signing threshold were provided.
    #[error("not enough signers to meet the threshold")]
    InsufficientSigners,
    /// Fewer shares than the signing threshold were provided.
    #[error("not enough shares to meet the threshold")]
    InsufficientShares,
    /// The same participant appeared more than once.
    #[error("duplicated participant")]
    DuplicateParticipant,
    /// The received commitments do not form one commitment per unique
    /// participant.
    #[error("commitment set does not match the participant set")]
    MismatchedCommitments,
    /// The received signature shares do not cover exactly the participants
    /// of the signing package.
    #[error("share set does not match the participant set")]
    MismatchedShares,
    /// A nonce commitment is the identity or outside the prime-order
    /// subgroup.
    #[error("invalid nonce commitment")]
    InvalidCommitment,
    /// The encoding of a signature was malformed.
    #[error("malformed signature encoding")]
    MalformedSignature,
    /// Signature verification failed.
    #[error("invalid signature")]
    InvalidSignature,
    /// A signature share failed its verification equation.
    #[error("invalid signature share")]
    ShareVerificationFailed {
        /// The participant whose share failed verification.
        culprit: Identifier,
    },
    /// This signer is not part of the signing package's participant set.
    #[error("signer is not a participant of this session")]
    NotAParticipant,
    /// The group commitment carries no binding factor for this signer.
    #[error("binding factor missing for this signer")]
    MissingBindingFactor,
    /// The coordinator session is not in a state that allows the requested
    /// operation.
    #[error("operation invalid in the current session state")]
    InvalidSessionState,
    /// A scalar or group element propagated from the curve layer was
    /// unusable.
    #[error("cryptographic primitive failure: {0}")]
    CryptoInternal(#[from] CryptoError),
}

impl Error {
    /// Return the identifier of the participant that caused the error, if
    /// the error attributes one.
    ///
    /// This can be used to penalize a participant that does not follow the
    /// protocol correctly, e.g. removing them from further signings.
    pub fn culprit(&self) -> Option<Identifier> {
        match self {
            Error::ShareVerificationFailed { culprit } => Some(*culprit),
            _ => None,
        }
    }
}

/// A failure in the scalar field or curve group layer.
#[non_exhaustive]
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum CryptoError {
    /// The encoding of a scalar was non-canonical or of the wrong length.
    #[error("malformed scalar encoding")]
    MalformedScalar,
    /// This scalar MUST NOT be zero.
    #[error("unexpected zero scalar")]
    InvalidZeroScalar,
    /// The encoding of a group element was malformed.
    #[error("malformed group element encoding")]
    MalformedElement,
    /// This element MUST NOT be the identity.
    #[error("unexpected identity element")]
    InvalidIdentityElement,
    /// This element MUST be in the prime-order subgroup.
    #[error("element outside the prime-order subgroup")]
    InvalidNonPrimeOrderElement,
}
