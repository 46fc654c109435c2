//! Round 2: signature share generation.

use core::fmt::{self, Debug};

use curve25519_dalek::{edwards::EdwardsPoint, scalar::Scalar};

use crate::ciphersuite::{Ed25519Group, Ed25519ScalarField, Field, Group};
use crate::keys::{KeyPackage, VerifyingShare};
use crate::round1::SigningNonces;
use crate::{challenge, compute_lagrange_coefficient, Error, Identifier, SigningPackage};

/// A participant's signature share, which the coordinator aggregates with
/// all other signers' shares into the joint signature.
#[derive(Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignatureShare {
    /// The participant that contributed this share.
    pub(crate) identifier: Identifier,
    /// The share `z_i` itself.
    #[cfg_attr(feature = "serde", serde(with = "crate::serialization::scalar"))]
    pub(crate) share: Scalar,
}

impl SignatureShare {
    pub(crate) fn new(identifier: Identifier, share: Scalar) -> Self {
        Self { identifier, share }
    }

    /// The participant that contributed this share.
    pub fn identifier(&self) -> Identifier {
        self.identifier
    }

    /// Reassemble a share received from `identifier` out of its canonical
    /// 32-byte scalar encoding.
    pub fn deserialize(identifier: Identifier, bytes: &[u8; 32]) -> Result<Self, Error> {
        Ok(Self {
            identifier,
            share: Ed25519ScalarField::deserialize(bytes)?,
        })
    }

    /// The canonical 32-byte encoding of `z_i`.
    pub fn serialize(&self) -> [u8; 32] {
        Ed25519ScalarField::serialize(&self.share)
    }

    /// Check this share against the contributor's commitment share and
    /// verifying share: `z_i · G = D_i + ρ_i · E_i + λ_i · c · P_i`.
    ///
    /// Lets the coordinator reject a malformed share before aggregation
    /// and name the misbehaving participant.
    pub(crate) fn verify(
        &self,
        group_commitment_share: &EdwardsPoint,
        verifying_share: &VerifyingShare,
        lambda_i: Scalar,
        challenge: Scalar,
    ) -> Result<(), Error> {
        if Ed25519Group::generator() * self.share
            != group_commitment_share + verifying_share.to_element() * (challenge * lambda_i)
        {
            return Err(Error::ShareVerificationFailed {
                culprit: self.identifier,
            });
        }

        Ok(())
    }
}

impl Debug for SignatureShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureShare")
            .field("identifier", &self.identifier)
            .field("share", &hex::encode(self.serialize()))
            .finish()
    }
}

/// Performed once by each participant selected for the signing operation.
///
/// Consumes the nonces produced in round 1 (they cannot be used for a
/// second session) and produces this signer's share
/// `z_i = d + ρ_i · e + λ_i · s_i · c` of the final signature.
///
/// Fails with [`Error::NotAParticipant`] when this signer is not part of
/// the signing package's participant set, and with
/// [`Error::MissingBindingFactor`] when the group commitment carries no
/// binding factor for it.
pub fn sign(
    signing_package: &SigningPackage,
    signer_nonces: SigningNonces,
    key_package: &KeyPackage,
) -> Result<SignatureShare, Error> {
    let identifier = key_package.identifier();

    if !signing_package.is_participant(identifier) {
        return Err(Error::NotAParticipant);
    }

    let binding_factor = signing_package
        .group_commitment()
        .binding_factor(identifier)
        .ok_or(Error::MissingBindingFactor)?;

    let lambda_i = compute_lagrange_coefficient(&signing_package.participant_set(), identifier)?;

    let c = challenge(
        signing_package.group_commitment().element(),
        key_package.verifying_key(),
        signing_package.message(),
    );

    let z_share = signer_nonces.hiding.to_scalar()
        + (signer_nonces.binding.to_scalar() * binding_factor.to_scalar())
        + (lambda_i * key_package.signing_share().to_scalar() * c);

    // Dropping the nonces zeroizes them; they cannot be reused.
    drop(signer_nonces);

    Ok(SignatureShare::new(identifier, z_share))
}
