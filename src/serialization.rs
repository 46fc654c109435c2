//! Serde support for the types that cross the wire.
//!
//! Scalars and group elements serialize as their canonical 32-byte
//! encodings, hex in human-readable formats and raw bytes in binary ones.
//! Deserialization applies the same strictness as the byte codecs:
//! non-canonical scalars, the identity, and elements outside the
//! prime-order subgroup are rejected.

#![cfg(feature = "serde")]

pub(crate) mod scalar {
    use curve25519_dalek::scalar::Scalar;

    use crate::ciphersuite::{Ed25519ScalarField, Field};

    pub(crate) fn serialize<S>(scalar: &Scalar, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serdect::array::serialize_hex_lower_or_bin(
            &Ed25519ScalarField::serialize(scalar),
            serializer,
        )
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Scalar, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let mut bytes = [0u8; 32];
        serdect::array::deserialize_hex_or_bin(&mut bytes, deserializer)?;
        Ed25519ScalarField::deserialize(&bytes).map_err(serde::de::Error::custom)
    }
}

pub(crate) mod element {
    use curve25519_dalek::edwards::EdwardsPoint;

    use crate::ciphersuite::{Ed25519Group, Group};

    pub(crate) fn serialize<S>(element: &EdwardsPoint, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let bytes = Ed25519Group::serialize(element).map_err(serde::ser::Error::custom)?;
        serdect::array::serialize_hex_lower_or_bin(&bytes, serializer)
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<EdwardsPoint, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let mut bytes = [0u8; 32];
        serdect::array::deserialize_hex_or_bin(&mut bytes, deserializer)?;
        Ed25519Group::deserialize(&bytes).map_err(serde::de::Error::custom)
    }
}
