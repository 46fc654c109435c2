//! Key generation and key shares.
//!
//! Keys are generated by a trusted dealer performing Shamir secret sharing
//! over the Ed25519 scalar field: the group secret is the constant term of
//! a random polynomial of degree `min_signers - 1`, and participant `i`
//! holds `f(i)`. [`split`] runs the same sharding over an externally
//! provided secret (the key-backup path); [`reconstruct`] recovers the
//! secret from any quorum via Lagrange interpolation at zero.

use core::fmt::{self, Debug};
use std::collections::{BTreeMap, BTreeSet};

use curve25519_dalek::{edwards::EdwardsPoint, scalar::Scalar};
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::ciphersuite::{Ed25519Group, Ed25519ScalarField, Field, Group};
use crate::{
    compute_lagrange_coefficient, Config, CryptoError, Error, Identifier, SigningKey, VerifyingKey,
};

/// A secret scalar value representing a signer's share of the group secret.
///
/// Zeroized on drop; never printed by Debug.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SigningShare(pub(crate) Scalar);

impl SigningShare {
    pub(crate) fn new(scalar: Scalar) -> Self {
        Self(scalar)
    }

    pub(crate) fn to_scalar(&self) -> Scalar {
        self.0
    }

    /// Parse a signing share from its canonical 32-byte encoding.
    pub fn deserialize(bytes: &[u8; 32]) -> Result<Self, Error> {
        Ok(Self(Ed25519ScalarField::deserialize(bytes)?))
    }

    /// The canonical 32-byte encoding. Handle with care: this is the
    /// secret itself, for the caller's own custody only.
    pub fn serialize(&self) -> [u8; 32] {
        Ed25519ScalarField::serialize(&self.0)
    }
}

impl Debug for SigningShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SigningShare").field(&"<redacted>").finish()
    }
}

/// A public group element that represents a single signer's public
/// verification share, `s_i · G`.
#[derive(Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerifyingShare(
    #[cfg_attr(feature = "serde", serde(with = "crate::serialization::element"))]
    pub(crate)  EdwardsPoint,
);

impl VerifyingShare {
    pub(crate) fn new(element: EdwardsPoint) -> Self {
        Self(element)
    }

    pub(crate) fn to_element(&self) -> EdwardsPoint {
        self.0
    }

    /// Parse a verifying share from its compressed 32-byte encoding.
    pub fn deserialize(bytes: &[u8; 32]) -> Result<Self, Error> {
        Ok(Self(Ed25519Group::deserialize(bytes)?))
    }

    /// The compressed 32-byte encoding of this share.
    pub fn serialize(&self) -> Result<[u8; 32], Error> {
        Ok(Ed25519Group::serialize(&self.0)?)
    }
}

impl Debug for VerifyingShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VerifyingShare")
            .field(&hex::encode(self.0.compress().to_bytes()))
            .finish()
    }
}

impl From<&SigningShare> for VerifyingShare {
    fn from(secret: &SigningShare) -> VerifyingShare {
        VerifyingShare::new(Ed25519Group::generator() * secret.to_scalar())
    }
}

/// Commitments to the coefficients of the dealer's secret polynomial,
/// `[a_0 · G, a_1 · G, …]`.
///
/// Every participant of one generation receives the same commitment
/// vector; it lets each of them check that their share lies on the
/// polynomial, and its first element is the group public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VssCommitment(pub(crate) Vec<EdwardsPoint>);

impl VssCommitment {
    /// Evaluate the committed polynomial in the exponent at `identifier`:
    /// `Σ_k commitment_k · i^k`.
    pub(crate) fn evaluate(&self, identifier: Identifier) -> EdwardsPoint {
        let i = identifier.to_scalar();

        let (_, result) = self.0.iter().fold(
            (Scalar::ONE, Ed25519Group::identity()),
            |(i_to_the_k, sum_so_far), comm_k| (i * i_to_the_k, sum_so_far + comm_k * i_to_the_k),
        );
        result
    }

    /// The group verifying key committed to by this vector (its first
    /// element).
    pub(crate) fn verifying_key(&self) -> Result<VerifyingKey, Error> {
        Ok(VerifyingKey::new(
            *self
                .0
                .first()
                .ok_or(Error::CryptoInternal(CryptoError::MalformedElement))?,
        ))
    }

    /// Serialize each coefficient commitment as compressed bytes.
    pub fn serialize(&self) -> Result<Vec<[u8; 32]>, Error> {
        self.0
            .iter()
            .map(|c| Ed25519Group::serialize(c).map_err(Error::from))
            .collect()
    }

    /// Parse a commitment vector from per-coefficient compressed bytes.
    pub fn deserialize<I>(coefficients: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = [u8; 32]>,
    {
        Ok(Self(
            coefficients
                .into_iter()
                .map(|buf| Ed25519Group::deserialize(&buf).map_err(Error::from))
                .collect::<Result<_, _>>()?,
        ))
    }
}

/// A participant's long-lived key material: identifier, secret signing
/// share, public verifying share, the group verifying key, and the dealer's
/// polynomial commitment.
///
/// Distributed once per generation. The holder of the signing share owns it
/// exclusively; the coordinator never sees it.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize)]
pub struct KeyPackage {
    #[zeroize(skip)]
    pub(crate) identifier: Identifier,
    pub(crate) signing_share: SigningShare,
    #[zeroize(skip)]
    pub(crate) verifying_share: VerifyingShare,
    #[zeroize(skip)]
    pub(crate) verifying_key: VerifyingKey,
    #[zeroize(skip)]
    pub(crate) commitment: VssCommitment,
    pub(crate) min_signers: u32,
}

impl KeyPackage {
    /// This participant's identifier.
    pub fn identifier(&self) -> Identifier {
        self.identifier
    }

    /// This participant's secret signing share.
    pub fn signing_share(&self) -> &SigningShare {
        &self.signing_share
    }

    /// This participant's public verifying share.
    pub fn verifying_share(&self) -> &VerifyingShare {
        &self.verifying_share
    }

    /// The group verifying key shared by all packages of one generation.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// The signing threshold this package was generated for.
    pub fn min_signers(&self) -> u32 {
        self.min_signers
    }

    /// Check the internal consistency of this package.
    ///
    /// Recomputes `s_i · G` and byte-compares it against the advertised
    /// verifying share, checks the share against the dealer's polynomial
    /// commitment, and checks the group key against the commitment's
    /// constant term. Flipping any bit of the signing share, the verifying
    /// share or the group key makes this return `false`.
    pub fn verify(&self) -> bool {
        let expected = Ed25519Group::generator() * self.signing_share.to_scalar();
        let committed = self.commitment.evaluate(self.identifier);

        let Ok(group_key) = self.commitment.verifying_key() else {
            return false;
        };

        expected.compress() == self.verifying_share.to_element().compress()
            && expected.compress() == committed.compress()
            && group_key.serialize() == self.verifying_key.serialize()
    }
}

/// Public data for one generation: all participants' verifying shares plus
/// the group verifying key.
///
/// This is what the coordinator holds; it contains no secrets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKeyPackage {
    pub(crate) verifying_shares: BTreeMap<Identifier, VerifyingShare>,
    pub(crate) verifying_key: VerifyingKey,
}

impl PublicKeyPackage {
    /// The verifying shares of all participants.
    pub fn verifying_shares(&self) -> &BTreeMap<Identifier, VerifyingShare> {
        &self.verifying_shares
    }

    /// The group verifying key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}

/// Return a vector of `size` randomly generated polynomial coefficients.
fn generate_coefficients<R: RngCore + CryptoRng>(size: usize, rng: &mut R) -> Vec<Scalar> {
    core::iter::repeat_with(|| Ed25519ScalarField::random(rng))
        .take(size)
        .collect()
}

/// Evaluate the polynomial with the given coefficients (constant term
/// first) at `x = identifier`, using Horner's method.
fn evaluate_polynomial(identifier: Identifier, coefficients: &[Scalar]) -> Scalar {
    let x = identifier.to_scalar();

    let mut value = Scalar::ZERO;
    for coeff in coefficients.iter().skip(1).rev() {
        value += coeff;
        value *= x;
    }
    value += coefficients[0];
    value
}

/// Generate keys for a fresh random group secret using a central, trusted
/// dealer.
///
/// Returns one [`KeyPackage`] per participant, keyed by identifier
/// `1..=max_signers`, plus the [`PublicKeyPackage`] for the coordinator.
/// The group secret itself is dropped (and zeroized) before returning; it
/// exists nowhere but implicitly in the shares.
pub fn generate<R: RngCore + CryptoRng>(
    config: &Config,
    rng: &mut R,
) -> Result<(BTreeMap<Identifier, KeyPackage>, PublicKeyPackage), Error> {
    let key = SigningKey::new(rng);

    split(&key, config, rng)
}

/// Split an existing secret into key shares.
///
/// This is identical to [`generate`] but receives an existing key instead
/// of sampling a fresh one: the key-backup path. The emitted group
/// verifying key equals the Ed25519 public key of `key`, so signatures
/// produced by any quorum verify under the original identity.
pub fn split<R: RngCore + CryptoRng>(
    key: &SigningKey,
    config: &Config,
    rng: &mut R,
) -> Result<(BTreeMap<Identifier, KeyPackage>, PublicKeyPackage), Error> {
    let coefficients = generate_coefficients(config.min_signers() as usize - 1, rng);

    split_with_coefficients(key, config, coefficients)
}

/// The sharding itself, with the random coefficients passed in so tests
/// can pin them.
pub(crate) fn split_with_coefficients(
    key: &SigningKey,
    config: &Config,
    coefficients: Vec<Scalar>,
) -> Result<(BTreeMap<Identifier, KeyPackage>, PublicKeyPackage), Error> {
    let mut coefficients = coefficients;
    coefficients.insert(0, key.scalar);

    let commitment = VssCommitment(
        coefficients
            .iter()
            .map(|c| Ed25519Group::generator() * c)
            .collect(),
    );
    let verifying_key = VerifyingKey::from(key);

    let mut key_packages = BTreeMap::new();
    let mut verifying_shares = BTreeMap::new();

    for id in 1..=config.max_signers() {
        let identifier = Identifier::new(id)?;
        let signing_share = SigningShare::new(evaluate_polynomial(identifier, &coefficients));
        let verifying_share = VerifyingShare::from(&signing_share);

        verifying_shares.insert(identifier, verifying_share);
        key_packages.insert(
            identifier,
            KeyPackage {
                identifier,
                signing_share,
                verifying_share,
                verifying_key,
                commitment: commitment.clone(),
                min_signers: config.min_signers(),
            },
        );
    }

    coefficients.zeroize();

    Ok((
        key_packages,
        PublicKeyPackage {
            verifying_shares,
            verifying_key,
        },
    ))
}

/// Recompute the group secret from at least `min_signers` key packages
/// using Lagrange interpolation at zero.
///
/// Any valid quorum yields the same secret. This is NOT needed for
/// signing (the whole point of the scheme is signing without
/// reconstruction); it enables recovery of a backed-up key.
pub fn reconstruct(key_packages: &[KeyPackage], config: &Config) -> Result<SigningKey, Error> {
    if key_packages.len() < config.min_signers() as usize {
        return Err(Error::InsufficientShares);
    }

    let identifiers: BTreeSet<_> = key_packages.iter().map(|kp| kp.identifier).collect();
    if identifiers.len() != key_packages.len() {
        return Err(Error::DuplicateParticipant);
    }

    let mut secret = Scalar::ZERO;

    // f(0) via polynomial interpolation of these t-of-n points of f.
    for key_package in key_packages {
        let lambda_i = compute_lagrange_coefficient(&identifiers, key_package.identifier)?;

        secret += lambda_i * key_package.signing_share.to_scalar();
    }

    if secret == Scalar::ZERO {
        return Err(Error::CryptoInternal(CryptoError::InvalidZeroScalar));
    }

    Ok(SigningKey::from_scalar(secret))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn shares_interpolate_to_the_secret() {
        let mut rng = thread_rng();
        let config = Config::new(3, 5).unwrap();
        let key = SigningKey::new(&mut rng);

        let (packages, pubkeys) = split(&key, &config, &mut rng).unwrap();
        assert_eq!(packages.len(), 5);
        assert_eq!(
            pubkeys.verifying_key().serialize(),
            VerifyingKey::from(&key).serialize()
        );

        let quorum: Vec<KeyPackage> = packages.values().take(3).cloned().collect();
        let recovered = reconstruct(&quorum, &config).unwrap();
        assert_eq!(recovered.serialize(), key.serialize());
    }

    #[test]
    fn all_packages_verify_and_bit_flips_are_caught() {
        let mut rng = thread_rng();
        let config = Config::new(2, 3).unwrap();
        let (packages, _) = generate(&config, &mut rng).unwrap();

        for package in packages.values() {
            assert!(package.verify());

            let mut tampered = package.clone();
            let mut bytes = tampered.signing_share.serialize();
            bytes[0] ^= 1;
            tampered.signing_share = SigningShare::deserialize(&bytes).unwrap();
            assert!(!tampered.verify());

            let mut tampered = package.clone();
            tampered.verifying_share =
                VerifyingShare::new(tampered.verifying_share.to_element() + Ed25519Group::generator());
            assert!(!tampered.verify());

            let mut tampered = package.clone();
            tampered.verifying_key =
                VerifyingKey::new(tampered.verifying_key.to_element() + Ed25519Group::generator());
            assert!(!tampered.verify());
        }
    }

    #[test]
    fn reconstruct_rejects_small_and_duplicated_quorums() {
        let mut rng = thread_rng();
        let config = Config::new(3, 4).unwrap();
        let (packages, _) = generate(&config, &mut rng).unwrap();
        let packages: Vec<KeyPackage> = packages.into_values().collect();

        assert_eq!(
            reconstruct(&packages[..2], &config),
            Err(Error::InsufficientShares)
        );

        let duplicated = vec![
            packages[0].clone(),
            packages[0].clone(),
            packages[1].clone(),
        ];
        assert_eq!(
            reconstruct(&duplicated, &config),
            Err(Error::DuplicateParticipant)
        );
    }

    #[test]
    fn polynomial_evaluation_matches_direct_form() {
        // f(x) = 7 + 3x + 2x^2 at x = 5 is 72.
        let coefficients = vec![Scalar::from(7u64), Scalar::from(3u64), Scalar::from(2u64)];
        let id = Identifier::new(5).unwrap();
        assert_eq!(evaluate_polynomial(id, &coefficients), Scalar::from(72u64));
    }
}
