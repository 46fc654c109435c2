//! The `FROST-ED25519-SHA512-v1` ciphersuite.
//!
//! The scalar field, the curve group and the hash functions are abstracted
//! as a capability set behind the [`Field`], [`Group`] and [`Ciphersuite`]
//! traits, with exactly one implementation. The traits exist as a seam, not
//! for runtime dispatch; everything monomorphizes to the Ed25519 types of
//! `curve25519-dalek`.

use core::ops::{Add, Mul, Neg, Sub};

use curve25519_dalek::{
    constants::ED25519_BASEPOINT_POINT,
    edwards::{CompressedEdwardsY, EdwardsPoint},
    scalar::Scalar,
    traits::Identity,
};
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha512};

use crate::CryptoError;

/// The prime-order scalar field GF(ℓ) that the group is defined over.
pub trait Field: Copy + Clone {
    /// An element of the scalar field. The Eq/PartialEq implementation MUST
    /// be constant-time.
    type Scalar: Add<Output = Self::Scalar>
        + Copy
        + Clone
        + Eq
        + Mul<Output = Self::Scalar>
        + Neg<Output = Self::Scalar>
        + PartialEq
        + Sub<Output = Self::Scalar>;

    /// A byte array of fixed length holding a serialized scalar.
    type Serialization: AsRef<[u8]>;

    /// Returns the zero element of the field, the additive identity.
    fn zero() -> Self::Scalar;

    /// Returns the one element of the field, the multiplicative identity.
    fn one() -> Self::Scalar;

    /// Computes the multiplicative inverse of an element of the scalar
    /// field, failing if the element is zero.
    fn invert(scalar: &Self::Scalar) -> Result<Self::Scalar, CryptoError>;

    /// Generate a random scalar from the entire space `[0, ℓ-1]`.
    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self::Scalar;

    /// Generate a random scalar from the space `[1, ℓ-1]`.
    fn random_nonzero<R: RngCore + CryptoRng>(rng: &mut R) -> Self::Scalar;

    /// Map a scalar to its canonical little-endian encoding.
    fn serialize(scalar: &Self::Scalar) -> Self::Serialization;

    /// Attempt to map a byte buffer to a scalar, rejecting non-canonical
    /// encodings (values not reduced mod ℓ).
    fn deserialize(buf: &Self::Serialization) -> Result<Self::Scalar, CryptoError>;
}

/// The prime-order subgroup of Ed25519 that all protocol elements live in.
pub trait Group: Copy + Clone + PartialEq {
    /// The scalar field of the group.
    type Field: Field;

    /// An element of the group.
    type Element: Add<Output = Self::Element>
        + Copy
        + Clone
        + Eq
        + Mul<<Self::Field as Field>::Scalar, Output = Self::Element>
        + PartialEq
        + Sub<Output = Self::Element>;

    /// A byte array of fixed length holding a serialized element.
    type Serialization: AsRef<[u8]>;

    /// Additive identity of the group.
    fn identity() -> Self::Element;

    /// The fixed generator (base point) of the prime-order subgroup.
    fn generator() -> Self::Element;

    /// Whether the element is the additive identity.
    fn is_identity(element: &Self::Element) -> bool;

    /// Whether the element lies in the prime-order subgroup, i.e. has no
    /// small-order component (`[8]P ≠ 0` on a cofactor-8 curve).
    fn is_in_prime_order_subgroup(element: &Self::Element) -> bool;

    /// Map an element to its compressed encoding. Fails on the identity,
    /// which never appears in a valid protocol message.
    fn serialize(element: &Self::Element) -> Result<Self::Serialization, CryptoError>;

    /// Attempt to map a byte buffer to a group element, rejecting
    /// non-canonical encodings, the identity, and elements outside the
    /// prime-order subgroup.
    fn deserialize(buf: &Self::Serialization) -> Result<Self::Element, CryptoError>;
}

/// A FROST ciphersuite: a prime-order group plus domain-separated hash
/// functions over it.
pub trait Ciphersuite: Copy + Clone + PartialEq + Eq + core::fmt::Debug + 'static {
    /// The ciphersuite ID string, equal to the `contextString` used for
    /// domain separation.
    const ID: &'static str;

    /// The group the ciphersuite operates over.
    type Group: Group;

    /// Binding-factor hash: maps its input to a scalar under the
    /// `contextString ‖ "binding"` domain.
    fn H1(m: &[u8]) -> <<Self::Group as Group>::Field as Field>::Scalar;

    /// Challenge hash: maps its input to a scalar with no domain prefix.
    ///
    /// This is the `hash_to_scalar` operation of the suite. For Ed25519 the
    /// challenge input `encode(R) ‖ encode(PK) ‖ msg` hashed this way is
    /// exactly the RFC 8032 hash, which is what makes the aggregate
    /// signature verify with stock Ed25519 verifiers.
    fn H2(m: &[u8]) -> <<Self::Group as Group>::Field as Field>::Scalar;
}

/// The scalar field of the FROST(Ed25519, SHA-512) ciphersuite.
#[derive(Clone, Copy)]
pub struct Ed25519ScalarField;

impl Field for Ed25519ScalarField {
    type Scalar = Scalar;

    type Serialization = [u8; 32];

    fn zero() -> Self::Scalar {
        Scalar::ZERO
    }

    fn one() -> Self::Scalar {
        Scalar::ONE
    }

    fn invert(scalar: &Self::Scalar) -> Result<Self::Scalar, CryptoError> {
        // `curve25519_dalek::scalar::Scalar`'s PartialEq is a constant-time
        // comparison via `ConstantTimeEq`.
        if *scalar == Scalar::ZERO {
            Err(CryptoError::InvalidZeroScalar)
        } else {
            Ok(scalar.invert())
        }
    }

    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self::Scalar {
        Scalar::random(rng)
    }

    fn random_nonzero<R: RngCore + CryptoRng>(rng: &mut R) -> Self::Scalar {
        loop {
            let scalar = Scalar::random(rng);
            if scalar != Scalar::ZERO {
                return scalar;
            }
        }
    }

    fn serialize(scalar: &Self::Scalar) -> Self::Serialization {
        scalar.to_bytes()
    }

    fn deserialize(buf: &Self::Serialization) -> Result<Self::Scalar, CryptoError> {
        match Scalar::from_canonical_bytes(*buf).into() {
            Some(s) => Ok(s),
            None => Err(CryptoError::MalformedScalar),
        }
    }
}

/// The prime-order subgroup of the Ed25519 curve.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Group;

impl Group for Ed25519Group {
    type Field = Ed25519ScalarField;

    type Element = EdwardsPoint;

    type Serialization = [u8; 32];

    fn identity() -> Self::Element {
        EdwardsPoint::identity()
    }

    fn generator() -> Self::Element {
        ED25519_BASEPOINT_POINT
    }

    fn is_identity(element: &Self::Element) -> bool {
        *element == EdwardsPoint::identity()
    }

    fn is_in_prime_order_subgroup(element: &Self::Element) -> bool {
        element.is_torsion_free()
    }

    fn serialize(element: &Self::Element) -> Result<Self::Serialization, CryptoError> {
        if Self::is_identity(element) {
            return Err(CryptoError::InvalidIdentityElement);
        }
        Ok(element.compress().to_bytes())
    }

    fn deserialize(buf: &Self::Serialization) -> Result<Self::Element, CryptoError> {
        match CompressedEdwardsY::from_slice(buf.as_ref())
            .map_err(|_| CryptoError::MalformedElement)?
            .decompress()
        {
            Some(point) => {
                if Self::is_identity(&point) {
                    Err(CryptoError::InvalidIdentityElement)
                } else if point.is_torsion_free() {
                    // Rejecting mixed- and small-order points also rejects
                    // all non-canonical encodings that decode to a valid
                    // curve point (https://eprint.iacr.org/2020/1244.pdf),
                    // so no explicit canonicity check on the Y coordinate
                    // is needed.
                    Ok(point)
                } else {
                    Err(CryptoError::InvalidNonPrimeOrderElement)
                }
            }
            None => Err(CryptoError::MalformedElement),
        }
    }
}

fn hash_to_array(inputs: &[&[u8]]) -> [u8; 64] {
    let mut h = Sha512::new();
    for i in inputs {
        h.update(i);
    }
    let mut output = [0u8; 64];
    output.copy_from_slice(h.finalize().as_slice());
    output
}

fn hash_to_scalar(inputs: &[&[u8]]) -> Scalar {
    let output = hash_to_array(inputs);
    Scalar::from_bytes_mod_order_wide(&output)
}

/// Context string for domain separation.
pub(crate) const CONTEXT_STRING: &str = "FROST-ED25519-SHA512-v1";

/// The FROST(Ed25519, SHA-512) ciphersuite.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Ed25519Sha512;

impl Ciphersuite for Ed25519Sha512 {
    const ID: &'static str = CONTEXT_STRING;

    type Group = Ed25519Group;

    fn H1(m: &[u8]) -> Scalar {
        hash_to_scalar(&[CONTEXT_STRING.as_bytes(), b"binding", m])
    }

    fn H2(m: &[u8]) -> Scalar {
        hash_to_scalar(&[m])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_rejects_noncanonical_scalar() {
        // ℓ itself, little-endian: the smallest non-canonical encoding.
        let mut ell = [0u8; 32];
        ell[..16].copy_from_slice(&[
            0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9,
            0xde, 0x14,
        ]);
        ell[31] = 0x10;
        assert_eq!(
            Ed25519ScalarField::deserialize(&ell),
            Err(CryptoError::MalformedScalar)
        );

        let mut canonical = ell;
        canonical[0] -= 1;
        assert!(Ed25519ScalarField::deserialize(&canonical).is_ok());
    }

    #[test]
    fn deserialize_rejects_identity_element() {
        let mut identity = [0u8; 32];
        identity[0] = 1;
        assert_eq!(
            Ed25519Group::deserialize(&identity),
            Err(CryptoError::InvalidIdentityElement)
        );
    }

    #[test]
    fn deserialize_rejects_small_order_element() {
        // An order-8 point encoding.
        let low_order =
            hex::decode("c7176a703d4dd84fba3c0b760d10670f2a2053fa2c39ccc64ec7fd7792ac037a")
                .unwrap();
        let buf: [u8; 32] = low_order.try_into().unwrap();
        assert_eq!(
            Ed25519Group::deserialize(&buf),
            Err(CryptoError::InvalidNonPrimeOrderElement)
        );
    }

    #[test]
    fn ciphersuite_id_is_the_context_string() {
        assert_eq!(Ed25519Sha512::ID, "FROST-ED25519-SHA512-v1");
    }

    #[test]
    fn generator_round_trips() {
        let enc = Ed25519Group::serialize(&Ed25519Group::generator()).unwrap();
        let dec = Ed25519Group::deserialize(&enc).unwrap();
        assert_eq!(dec, Ed25519Group::generator());
    }
}
