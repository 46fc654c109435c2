//! Coordinator side of the signing protocol.
//!
//! The coordinator is a semi-trusted party: it validates round-1
//! commitments, derives the per-signer binding factors, broadcasts the
//! signing package, and aggregates the round-2 shares. It is trusted not to
//! deny service, but it learns no secret material and cannot forge; every
//! share it aggregates is checked against the contributor's public
//! verifying share first.

use core::fmt::{self, Debug};
use std::collections::{BTreeMap, BTreeSet};

use curve25519_dalek::{edwards::EdwardsPoint, scalar::Scalar};

use crate::ciphersuite::{
    Ciphersuite, Ed25519Group, Ed25519ScalarField, Ed25519Sha512, Field, Group,
};
use crate::keys::PublicKeyPackage;
use crate::round1::SigningCommitments;
use crate::round2::SignatureShare;
use crate::{
    challenge, compute_lagrange_coefficient, Config, Error, Identifier, Signature, VerifyingKey,
};

/// The binding factor `ρ_i`, also known as _rho_.
///
/// Glues each signer's binding commitment `E` into the group commitment,
/// tying every share to this signing set, this commitment list and this
/// message; a rogue participant cannot cancel out other signers'
/// commitments.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BindingFactor(
    #[cfg_attr(feature = "serde", serde(with = "crate::serialization::scalar"))] pub(crate) Scalar,
);

impl BindingFactor {
    pub(crate) fn to_scalar(self) -> Scalar {
        self.0
    }

    /// Parse a binding factor from its canonical 32-byte encoding.
    pub fn deserialize(bytes: &[u8; 32]) -> Result<Self, Error> {
        Ok(Self(Ed25519ScalarField::deserialize(bytes)?))
    }

    /// The canonical 32-byte encoding of this binding factor.
    pub fn serialize(&self) -> [u8; 32] {
        Ed25519ScalarField::serialize(&self.0)
    }
}

impl Debug for BindingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BindingFactor")
            .field(&hex::encode(self.serialize()))
            .finish()
    }
}

/// The group commitment `R = Σ (D_i + ρ_i · E_i)` together with the
/// per-signer binding factors it was built from.
///
/// Built by the coordinator, shared read-only with every signer in the
/// session; `R` becomes the first half of the final signature.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupCommitment {
    #[cfg_attr(feature = "serde", serde(with = "crate::serialization::element"))]
    element: EdwardsPoint,
    binding_factors: BTreeMap<Identifier, BindingFactor>,
}

impl GroupCommitment {
    /// Reassemble a group commitment received from a coordinator.
    pub fn new(element: EdwardsPoint, binding_factors: BTreeMap<Identifier, BindingFactor>) -> Self {
        Self {
            element,
            binding_factors,
        }
    }

    pub(crate) fn element(&self) -> &EdwardsPoint {
        &self.element
    }

    /// The binding factor derived for `identifier`, if it took part in
    /// this session.
    pub fn binding_factor(&self, identifier: Identifier) -> Option<BindingFactor> {
        self.binding_factors.get(&identifier).copied()
    }
}

impl Debug for GroupCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupCommitment")
            .field("element", &hex::encode(self.element.compress().to_bytes()))
            .field("binding_factors", &self.binding_factors)
            .finish()
    }
}

/// Generated by the coordinator and distributed to each signing
/// participant: the participant set of the session, the message to sign,
/// and the group commitment.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SigningPackage {
    /// The participants of this session, in ascending identifier order.
    participants: Vec<Identifier>,
    /// The message each participant will sign.
    message: Vec<u8>,
    /// The group commitment with the per-signer binding factors.
    group_commitment: GroupCommitment,
}

impl SigningPackage {
    /// Reassemble a signing package received from a coordinator. The
    /// participant list is sorted.
    pub fn new(
        participants: Vec<Identifier>,
        message: Vec<u8>,
        group_commitment: GroupCommitment,
    ) -> Self {
        let mut participants = participants;
        participants.sort_unstable();
        Self {
            participants,
            message,
            group_commitment,
        }
    }

    /// The participants of this session, in ascending identifier order.
    pub fn participants(&self) -> &[Identifier] {
        &self.participants
    }

    /// Whether `identifier` belongs to this session's participant set.
    pub fn is_participant(&self, identifier: Identifier) -> bool {
        self.participants.binary_search(&identifier).is_ok()
    }

    pub(crate) fn participant_set(&self) -> BTreeSet<Identifier> {
        self.participants.iter().copied().collect()
    }

    /// The message to be signed.
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// The group commitment of this session.
    pub fn group_commitment(&self) -> &GroupCommitment {
        &self.group_commitment
    }
}

/// The coordinator's per-session state machine.
///
/// `Done` and `Failed` are terminal; `Failed` retains the error kind for
/// reporting. A new session requires a new [`Coordinator`] (and fresh
/// round-1 nonces from every signer).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No session activity yet.
    Idle,
    /// Commitments have been received and are being validated.
    AwaitingCommitments,
    /// The signing package was built and can be distributed.
    PackageReady,
    /// Signature shares have been received and are being validated.
    AwaitingShares,
    /// The aggregate signature was produced.
    Done,
    /// The session failed; no signature was emitted.
    Failed(Error),
}

struct Session {
    package: SigningPackage,
    commitments: BTreeMap<Identifier, SigningCommitments>,
}

/// The coordinator of one signing session.
pub struct Coordinator {
    config: Config,
    public_keys: PublicKeyPackage,
    state: SessionState,
    session: Option<Session>,
}

impl Coordinator {
    /// Create a coordinator for one signing session.
    pub fn new(config: Config, public_keys: PublicKeyPackage) -> Self {
        Self {
            config,
            public_keys,
            state: SessionState::Idle,
            session: None,
        }
    }

    /// The current session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Validate the received round-1 commitments and build the signing
    /// package to broadcast.
    ///
    /// Rejects sessions below the threshold ([`Error::InsufficientSigners`]),
    /// duplicate or unknown participants ([`Error::MismatchedCommitments`]),
    /// and commitment elements that are the identity or outside the
    /// prime-order subgroup ([`Error::InvalidCommitment`]). Any rejection
    /// fails the session.
    pub fn create_signing_package(
        &mut self,
        message: &[u8],
        commitments: &[(Identifier, SigningCommitments)],
    ) -> Result<SigningPackage, Error> {
        if self.state != SessionState::Idle {
            return Err(Error::InvalidSessionState);
        }
        self.state = SessionState::AwaitingCommitments;

        match self.build_package(message, commitments) {
            Ok(session) => {
                let package = session.package.clone();
                self.session = Some(session);
                self.state = SessionState::PackageReady;
                Ok(package)
            }
            Err(e) => {
                self.session = None;
                self.state = SessionState::Failed(e.clone());
                Err(e)
            }
        }
    }

    fn build_package(
        &self,
        message: &[u8],
        commitments: &[(Identifier, SigningCommitments)],
    ) -> Result<Session, Error> {
        if commitments.len() < self.config.min_signers() as usize {
            return Err(Error::InsufficientSigners);
        }

        let commitment_map: BTreeMap<Identifier, SigningCommitments> =
            commitments.iter().copied().collect();
        if commitment_map.len() != commitments.len() {
            return Err(Error::MismatchedCommitments);
        }

        for (identifier, commitment) in &commitment_map {
            if !self.public_keys.verifying_shares().contains_key(identifier) {
                return Err(Error::MismatchedCommitments);
            }
            for element in [
                commitment.hiding().to_element(),
                commitment.binding().to_element(),
            ] {
                if Ed25519Group::is_identity(&element)
                    || !Ed25519Group::is_in_prime_order_subgroup(&element)
                {
                    return Err(Error::InvalidCommitment);
                }
            }
        }

        let binding_factors = compute_binding_factors(
            self.public_keys.verifying_key(),
            &commitment_map,
            message,
        )?;
        let element = compute_group_commitment(&commitment_map, &binding_factors);

        let package = SigningPackage {
            participants: commitment_map.keys().copied().collect(),
            message: message.to_vec(),
            group_commitment: GroupCommitment {
                element,
                binding_factors,
            },
        };

        Ok(Session {
            package,
            commitments: commitment_map,
        })
    }

    /// Validate the received signature shares and aggregate them into the
    /// final 64-byte signature.
    ///
    /// Rejects short sessions ([`Error::InsufficientShares`]) and share
    /// sets that do not cover exactly the session's participants
    /// ([`Error::MismatchedShares`]). Every share is checked against the
    /// contributor's commitment and verifying share before summing; a bad
    /// share fails the session with [`Error::ShareVerificationFailed`]
    /// naming the culprit, and no signature is emitted.
    pub fn aggregate_signatures(
        &mut self,
        shares: &BTreeMap<Identifier, SignatureShare>,
    ) -> Result<Signature, Error> {
        if self.state != SessionState::PackageReady {
            return Err(Error::InvalidSessionState);
        }
        self.state = SessionState::AwaitingShares;

        match self.try_aggregate(shares) {
            Ok(signature) => {
                self.session = None;
                self.state = SessionState::Done;
                Ok(signature)
            }
            Err(e) => {
                self.session = None;
                self.state = SessionState::Failed(e.clone());
                Err(e)
            }
        }
    }

    fn try_aggregate(
        &self,
        shares: &BTreeMap<Identifier, SignatureShare>,
    ) -> Result<Signature, Error> {
        let session = self.session.as_ref().ok_or(Error::InvalidSessionState)?;
        let package = &session.package;

        if shares.len() < self.config.min_signers() as usize {
            return Err(Error::InsufficientShares);
        }

        let expected = package.participant_set();
        let received: BTreeSet<Identifier> = shares.keys().copied().collect();
        if expected != received
            || shares.iter().any(|(id, share)| *id != share.identifier())
        {
            return Err(Error::MismatchedShares);
        }

        let challenge = challenge(
            package.group_commitment().element(),
            self.public_keys.verifying_key(),
            package.message(),
        );

        for share in shares.values() {
            let identifier = share.identifier();

            // The lookups cannot miss: the share set equals the participant
            // set, which was checked against the commitments and the known
            // verifying shares when the package was built.
            let verifying_share = self
                .public_keys
                .verifying_shares()
                .get(&identifier)
                .ok_or(Error::MismatchedShares)?;
            let commitment = session
                .commitments
                .get(&identifier)
                .ok_or(Error::MismatchedShares)?;
            let binding_factor = package
                .group_commitment()
                .binding_factor(identifier)
                .ok_or(Error::MissingBindingFactor)?;

            let lambda_i = compute_lagrange_coefficient(&expected, identifier)?;

            let group_commitment_share = commitment.hiding().to_element()
                + commitment.binding().to_element() * binding_factor.to_scalar();

            share.verify(&group_commitment_share, verifying_share, lambda_i, challenge)?;
        }

        let z = shares
            .values()
            .fold(Scalar::ZERO, |sum, share| sum + share.share);

        Ok(Signature {
            R: *package.group_commitment().element(),
            z,
        })
    }

    /// Verify a 64-byte signature over `message` under `verifying_key`.
    ///
    /// Returns `false` on any failure: wrong length, non-canonical scalar,
    /// invalid or low-order `R`, or a signature that does not satisfy
    /// `z·G = R + c·PK`. Callers cannot distinguish a bad signature from a
    /// malformed one.
    pub fn verify(signature: &[u8], message: &[u8], verifying_key: &VerifyingKey) -> bool {
        let Ok(bytes) = <[u8; 64]>::try_from(signature) else {
            return false;
        };
        let Ok(signature) = Signature::deserialize(&bytes) else {
            return false;
        };
        verifying_key.verify(message, &signature).is_ok()
    }
}

/// Encode the commitment list of a session.
///
/// For each participant in ascending identifier order:
/// `u8(len(id_ascii)) ‖ id_ascii ‖ u32-BE(len(D‖E)) ‖ D ‖ E`. The binding
/// factors commit to these exact bytes, so the layout is part of the
/// protocol contract.
pub(crate) fn encode_commitment_list(
    commitments: &BTreeMap<Identifier, SigningCommitments>,
) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();

    for (identifier, commitment) in commitments {
        let id_ascii = identifier.to_ascii();
        let hiding = Ed25519Group::serialize(&commitment.hiding().to_element())?;
        let binding = Ed25519Group::serialize(&commitment.binding().to_element())?;

        bytes.push(id_ascii.len() as u8);
        bytes.extend_from_slice(&id_ascii);
        bytes.extend_from_slice(&((hiding.len() + binding.len()) as u32).to_be_bytes());
        bytes.extend_from_slice(&hiding);
        bytes.extend_from_slice(&binding);
    }

    Ok(bytes)
}

/// Derive the binding factor of every participant:
/// `ρ_i = H1(id_ascii ‖ encode(PK) ‖ encoded_commitment_list ‖ message)`.
pub(crate) fn compute_binding_factors(
    verifying_key: &VerifyingKey,
    commitments: &BTreeMap<Identifier, SigningCommitments>,
    message: &[u8],
) -> Result<BTreeMap<Identifier, BindingFactor>, Error> {
    let verifying_key_bytes = verifying_key.serialize();
    let commitment_list = encode_commitment_list(commitments)?;

    let mut binding_factors = BTreeMap::new();
    for identifier in commitments.keys() {
        let mut preimage = Vec::new();
        preimage.extend_from_slice(&identifier.to_ascii());
        preimage.extend_from_slice(&verifying_key_bytes);
        preimage.extend_from_slice(&commitment_list);
        preimage.extend_from_slice(message);

        binding_factors.insert(*identifier, BindingFactor(Ed25519Sha512::H1(&preimage)));
    }

    Ok(binding_factors)
}

/// Compute the group commitment `R = Σ (D_i + ρ_i · E_i)` over the
/// session's commitments.
fn compute_group_commitment(
    commitments: &BTreeMap<Identifier, SigningCommitments>,
    binding_factors: &BTreeMap<Identifier, BindingFactor>,
) -> EdwardsPoint {
    let mut group_commitment = Ed25519Group::identity();

    for (identifier, commitment) in commitments {
        let binding_factor = binding_factors[identifier];

        group_commitment = group_commitment
            + (commitment.hiding().to_element()
                + commitment.binding().to_element() * binding_factor.to_scalar());
    }

    group_commitment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round1;
    use crate::keys;
    use rand::thread_rng;

    #[test]
    fn commitment_list_layout() {
        let mut rng = thread_rng();
        let (_, c1) = round1::commit(&mut rng);
        let (_, c10) = round1::commit(&mut rng);

        let mut commitments = BTreeMap::new();
        commitments.insert(Identifier::new(10).unwrap(), c10);
        commitments.insert(Identifier::new(1).unwrap(), c1);

        let bytes = encode_commitment_list(&commitments).unwrap();

        // Entry for id 1 comes first: 1-byte ascii length, "1", the
        // big-endian length of D‖E, then the two 32-byte commitments.
        assert_eq!(bytes[0], 1);
        assert_eq!(&bytes[1..2], b"1");
        assert_eq!(&bytes[2..6], &64u32.to_be_bytes());
        assert_eq!(
            &bytes[6..38],
            &c1.hiding().serialize().unwrap()
        );
        assert_eq!(
            &bytes[38..70],
            &c1.binding().serialize().unwrap()
        );

        // Then id 10.
        assert_eq!(bytes[70], 2);
        assert_eq!(&bytes[71..73], b"10");
        assert_eq!(&bytes[73..77], &64u32.to_be_bytes());
        assert_eq!(bytes.len(), 70 + 2 + 1 + 4 + 64);
    }

    #[test]
    fn binding_factors_differ_per_participant_and_message() {
        let mut rng = thread_rng();
        let config = Config::new(2, 2).unwrap();
        let (_, pubkeys) = keys::generate(&config, &mut rng).unwrap();

        let mut commitments = BTreeMap::new();
        for id in 1..=2u32 {
            let (_, c) = round1::commit(&mut rng);
            commitments.insert(Identifier::new(id).unwrap(), c);
        }

        let factors_a =
            compute_binding_factors(pubkeys.verifying_key(), &commitments, b"message a").unwrap();
        let factors_b =
            compute_binding_factors(pubkeys.verifying_key(), &commitments, b"message b").unwrap();

        let id1 = Identifier::new(1).unwrap();
        let id2 = Identifier::new(2).unwrap();
        assert_ne!(factors_a[&id1], factors_a[&id2]);
        assert_ne!(factors_a[&id1], factors_b[&id1]);
    }

    #[test]
    fn session_state_machine() {
        let mut rng = thread_rng();
        let config = Config::new(2, 3).unwrap();
        let (_, pubkeys) = keys::generate(&config, &mut rng).unwrap();

        let mut coordinator = Coordinator::new(config, pubkeys);
        assert_eq!(*coordinator.state(), SessionState::Idle);

        // Below threshold: the session fails and retains the error kind.
        let (_, c1) = round1::commit(&mut rng);
        let short = vec![(Identifier::new(1).unwrap(), c1)];
        assert_eq!(
            coordinator.create_signing_package(b"msg", &short),
            Err(Error::InsufficientSigners)
        );
        assert_eq!(
            *coordinator.state(),
            SessionState::Failed(Error::InsufficientSigners)
        );

        // Terminal: no further operations are accepted.
        assert_eq!(
            coordinator.aggregate_signatures(&BTreeMap::new()),
            Err(Error::InvalidSessionState)
        );
    }

    #[test]
    fn duplicate_commitments_are_rejected() {
        let mut rng = thread_rng();
        let config = Config::new(2, 3).unwrap();
        let (_, pubkeys) = keys::generate(&config, &mut rng).unwrap();

        let (_, c) = round1::commit(&mut rng);
        let id1 = Identifier::new(1).unwrap();
        let duplicated = vec![(id1, c), (id1, c)];

        let mut coordinator = Coordinator::new(config, pubkeys);
        assert_eq!(
            coordinator.create_signing_package(b"msg", &duplicated),
            Err(Error::MismatchedCommitments)
        );
    }

    #[test]
    fn unknown_participant_is_rejected() {
        let mut rng = thread_rng();
        let config = Config::new(2, 3).unwrap();
        let (_, pubkeys) = keys::generate(&config, &mut rng).unwrap();

        let (_, c1) = round1::commit(&mut rng);
        let (_, c9) = round1::commit(&mut rng);
        let commitments = vec![
            (Identifier::new(1).unwrap(), c1),
            (Identifier::new(9).unwrap(), c9),
        ];

        let mut coordinator = Coordinator::new(config, pubkeys);
        assert_eq!(
            coordinator.create_signing_package(b"msg", &commitments),
            Err(Error::MismatchedCommitments)
        );
    }
}
