//! Participant identifiers.

use core::fmt::{self, Debug, Display};

use curve25519_dalek::scalar::Scalar;

use crate::Error;

/// A participant identifier.
///
/// Identifiers are the x-coordinates at which the secret polynomial is
/// evaluated, so they MUST NOT be zero (`f(0)` is the group secret) and must
/// be distinct within a group. The dealer assigns `1..=n` at key
/// generation.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub struct Identifier(u32);

impl Identifier {
    /// Create an identifier from a nonzero integer.
    pub fn new(id: u32) -> Result<Self, Error> {
        if id == 0 {
            Err(Error::MalformedIdentifier)
        } else {
            Ok(Self(id))
        }
    }

    /// The integer value of the identifier.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// The identifier as an element of the scalar field, for polynomial
    /// evaluation and Lagrange derivation.
    pub(crate) fn to_scalar(self) -> Scalar {
        Scalar::from(u64::from(self.0))
    }

    /// The ascii decimal rendering of the identifier, as fed into the
    /// binding-factor derivation.
    pub(crate) fn to_ascii(self) -> Vec<u8> {
        self.0.to_string().into_bytes()
    }
}

impl TryFrom<u32> for Identifier {
    type Error = Error;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<Identifier> for u32 {
    fn from(id: Identifier) -> u32 {
        id.0
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Identifier").field(&self.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert_eq!(Identifier::new(0), Err(Error::MalformedIdentifier));
        assert!(Identifier::new(1).is_ok());
    }

    #[test]
    fn ascii_rendering_is_decimal() {
        assert_eq!(Identifier::new(42).unwrap().to_ascii(), b"42".to_vec());
    }

    #[test]
    fn scalar_conversion_matches_integer() {
        let id = Identifier::new(3).unwrap();
        assert_eq!(id.to_scalar(), Scalar::from(3u64));
    }
}
