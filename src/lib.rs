#![allow(non_snake_case)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]

use std::collections::{BTreeMap, BTreeSet};

use curve25519_dalek::{edwards::EdwardsPoint, scalar::Scalar};
use rand_core::{CryptoRng, RngCore};

pub mod ciphersuite;
mod coordinator;
mod error;
mod identifier;
pub mod keys;
pub mod round1;
pub mod round2;
mod serialization;
mod signature;
mod signer;
mod signing_key;
mod verifying_key;

pub use coordinator::{BindingFactor, Coordinator, GroupCommitment, SessionState, SigningPackage};
pub use error::{CryptoError, Error};
pub use identifier::Identifier;
pub use signature::Signature;
pub use signer::Signer;
pub use signing_key::SigningKey;
pub use verifying_key::VerifyingKey;

use ciphersuite::{Ciphersuite, Ed25519ScalarField, Ed25519Sha512, Field};
use keys::{KeyPackage, PublicKeyPackage};

/// A `(t, n)` threshold configuration: at least `min_signers` of
/// `max_signers` participants must collaborate to sign.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    min_signers: u32,
    max_signers: u32,
}

impl Config {
    /// Create a configuration, validating `1 ≤ min_signers ≤ max_signers`.
    pub fn new(min_signers: u32, max_signers: u32) -> Result<Self, Error> {
        if min_signers == 0 || min_signers > max_signers {
            return Err(Error::InvalidThreshold);
        }
        Ok(Self {
            min_signers,
            max_signers,
        })
    }

    /// The signing threshold `t`.
    pub fn min_signers(&self) -> u32 {
        self.min_signers
    }

    /// The total number of participants `n`.
    pub fn max_signers(&self) -> u32 {
        self.max_signers
    }
}

/// Compute the per-message challenge `c = H(encode(R) ‖ encode(PK) ‖ msg)`.
///
/// This is the standard Ed25519 challenge, which is what makes the
/// aggregate `(R, z)` a valid RFC 8032 signature.
pub(crate) fn challenge(R: &EdwardsPoint, verifying_key: &VerifyingKey, msg: &[u8]) -> Scalar {
    let mut preimage = Vec::with_capacity(64 + msg.len());
    preimage.extend_from_slice(&R.compress().to_bytes());
    preimage.extend_from_slice(&verifying_key.serialize());
    preimage.extend_from_slice(msg);

    Ed25519Sha512::H2(&preimage)
}

/// Compute the Lagrange basis value at zero for `signer` over the signer
/// set: `λ_i = ∏_{j≠i} x_j / (x_j − x_i)` in the scalar field.
///
/// Weights each signer's share so that the weighted shares interpolate the
/// polynomial's constant term.
pub(crate) fn compute_lagrange_coefficient(
    participants: &BTreeSet<Identifier>,
    signer: Identifier,
) -> Result<Scalar, Error> {
    if !participants.contains(&signer) {
        return Err(Error::NotAParticipant);
    }

    let mut num = Scalar::ONE;
    let mut den = Scalar::ONE;

    for participant in participants {
        if *participant == signer {
            continue;
        }

        num *= participant.to_scalar();
        den *= participant.to_scalar() - signer.to_scalar();
    }

    if den == Scalar::ZERO {
        return Err(Error::DuplicateParticipant);
    }

    Ok(num * Ed25519ScalarField::invert(&den)?)
}

/// Run the full two-round protocol in one call, on behalf of a caller that
/// holds a quorum of key packages locally.
///
/// Takes the first `min_signers` packages, runs round 1 for each, builds
/// the signing package, runs round 2 for each, and aggregates. Used for
/// testing and for the backup/recovery path; a networked deployment runs
/// the same steps with the messages exchanged out-of-band.
pub fn threshold_sign<R: RngCore + CryptoRng>(
    key_packages: &BTreeMap<Identifier, KeyPackage>,
    message: &[u8],
    public_keys: &PublicKeyPackage,
    config: &Config,
    rng: &mut R,
) -> Result<Signature, Error> {
    if key_packages.len() < config.min_signers() as usize {
        return Err(Error::InsufficientShares);
    }

    let quorum: Vec<&KeyPackage> = key_packages
        .values()
        .take(config.min_signers() as usize)
        .collect();

    let mut nonces = Vec::with_capacity(quorum.len());
    let mut commitments = Vec::with_capacity(quorum.len());
    for key_package in &quorum {
        let (nonce_pair, commitment) = round1::commit(rng);
        nonces.push(nonce_pair);
        commitments.push((key_package.identifier(), commitment));
    }

    let mut coordinator = Coordinator::new(*config, public_keys.clone());
    let signing_package = coordinator.create_signing_package(message, &commitments)?;

    let mut shares = BTreeMap::new();
    for (key_package, nonce_pair) in quorum.iter().zip(nonces) {
        let share = round2::sign(&signing_package, nonce_pair, key_package)?;
        shares.insert(key_package.identifier(), share);
    }

    coordinator.aggregate_signatures(&shares)
}

/// Sign `message` with a group secret by re-splitting it into a fresh
/// `(t, n)` polynomial and running [`threshold_sign`] over the shares.
///
/// The output is a normal Ed25519 signature over the secret's original
/// public key. This is the convenience path for a caller that just
/// recovered a backed-up key.
pub fn sign<R: RngCore + CryptoRng>(
    key: &SigningKey,
    message: &[u8],
    config: &Config,
    rng: &mut R,
) -> Result<Signature, Error> {
    let (key_packages, public_keys) = keys::split(key, config, rng)?;

    threshold_sign(&key_packages, message, &public_keys, config, rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_validates_threshold() {
        assert_eq!(Config::new(0, 3), Err(Error::InvalidThreshold));
        assert_eq!(Config::new(4, 3), Err(Error::InvalidThreshold));
        assert!(Config::new(1, 1).is_ok());
        assert!(Config::new(2, 3).is_ok());
    }

    #[test]
    fn lagrange_coefficients_interpolate_at_zero() {
        let id1 = Identifier::new(1).unwrap();
        let id2 = Identifier::new(2).unwrap();
        let participants: BTreeSet<_> = [id1, id2].into_iter().collect();

        // Over {1, 2}: λ_1 = 2/(2-1) = 2 and λ_2 = 1/(1-2) = -1.
        assert_eq!(
            compute_lagrange_coefficient(&participants, id1).unwrap(),
            Scalar::from(2u64)
        );
        assert_eq!(
            compute_lagrange_coefficient(&participants, id2).unwrap(),
            -Scalar::ONE
        );
    }

    #[test]
    fn lagrange_requires_membership() {
        let participants: BTreeSet<_> = [Identifier::new(1).unwrap()].into_iter().collect();
        assert_eq!(
            compute_lagrange_coefficient(&participants, Identifier::new(2).unwrap()),
            Err(Error::NotAParticipant)
        );
    }
}
