//! Definitions shared by [G1](super::g1::G1) and [G2](super::g2::G2).
//!
//! Both groups implement the same [Point] contract so that signature schemes, multi-scalar
//! multiplication, and batch checks can be written once and instantiated for either group.

use super::{scalar::Scalar, Error};
use num_bigint::BigInt;
use std::{
    fmt::{Debug, Display},
    hash::Hash,
    ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign},
};

/// Domain separation tag used when mapping a message to a curve point.
pub type DST = &'static [u8];

/// DST for signing messages with signatures in G1 (proof-of-possession scheme).
pub const G1_MESSAGE: DST = b"BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_POP_";

/// DST for signing a proof of possession with signatures in G1.
pub const G1_PROOF_OF_POSSESSION: DST = b"BLS_POP_BLS12381G1_XMD:SHA-256_SSWU_RO_POP_";

/// DST for signing messages with signatures in G1 (basic scheme).
pub const G1_MESSAGE_NUL: DST = b"BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_NUL_";

/// DST for signing messages with signatures in G1 (message augmentation scheme).
pub const G1_MESSAGE_AUG: DST = b"BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_AUG_";

/// DST for signing messages with signatures in G2 (proof-of-possession scheme).
pub const G2_MESSAGE: DST = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

/// DST for signing a proof of possession with signatures in G2.
pub const G2_PROOF_OF_POSSESSION: DST = b"BLS_POP_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

/// DST for signing messages with signatures in G2 (basic scheme).
pub const G2_MESSAGE_NUL: DST = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_NUL_";

/// DST for signing messages with signatures in G2 (message augmentation scheme).
pub const G2_MESSAGE_AUG: DST = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_AUG_";

/// How a message is mapped onto a curve point.
///
/// A signature only verifies under the mapping it was produced with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mapping {
    /// `hash_to_curve`: indistinguishable from a random oracle.
    Hash,
    /// `encode_to_curve`: faster, but the output distribution is not uniform.
    Encode,
}

impl Mapping {
    /// Returns the flag `blst` uses to select the mapping.
    pub(crate) fn is_hash(self) -> bool {
        matches!(self, Mapping::Hash)
    }
}

pub(crate) mod sealed {
    use std::any::Any;

    /// Exposes the `blst` affine representation handed to a pairing context.
    pub trait Sealed {
        type Raw: Any + Copy;

        fn to_raw_affine(&self) -> Self::Raw;
    }
}

/// A point in one of the two prime-order groups of BLS12-381 (in projective form).
///
/// Group arithmetic is exposed through the standard operator traits and always returns a new
/// value. Equality is equality of the represented points, not of their coordinates.
pub trait Point:
    sealed::Sealed
    + Copy
    + Eq
    + Hash
    + Debug
    + Display
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + AddAssign
    + Sub<Output = Self>
    + SubAssign
    + Neg<Output = Self>
    + Mul<Scalar, Output = Self>
    + MulAssign<Scalar>
{
    /// The affine representation of the point.
    type Affine: Copy + Eq + Debug + Send + Sync + From<Self> + Into<Self>;

    /// Length of the compressed encoding.
    const COMPRESSED_LENGTH: usize;

    /// Length of the uncompressed encoding.
    const UNCOMPRESSED_LENGTH: usize;

    /// Returns the canonical generator of the group.
    fn generator() -> Self;

    /// Returns the point at infinity (the group identity).
    fn infinity() -> Self;

    /// Returns true if the point is the identity.
    fn is_infinity(&self) -> bool;

    /// Returns true if the point satisfies the curve equation.
    fn is_on_curve(&self) -> bool;

    /// Returns true if the point lies in the prime-order subgroup.
    fn in_subgroup(&self) -> bool;

    /// Returns `2 * self`.
    fn double(&self) -> Self;

    /// Multiplies the point by an arbitrary (possibly negative) integer.
    fn mul_bigint(&self, k: &BigInt) -> Self;

    /// Converts the point to affine form.
    fn to_affine(&self) -> Self::Affine {
        Self::Affine::from(*self)
    }

    /// Converts many points to affine form with a single inversion.
    fn batch_to_affine(points: &[Self]) -> Vec<Self::Affine>;

    /// Maps a message (with `aug` prepended) onto the group.
    fn map(mapping: Mapping, message: &[u8], dst: &[u8], aug: &[u8]) -> Self;

    /// Returns the compressed encoding.
    fn compress(&self) -> Vec<u8>;

    /// Returns the uncompressed encoding.
    fn serialize(&self) -> Vec<u8>;

    /// Decodes a compressed or uncompressed point, inferring the form from the length and the
    /// compression flag.
    ///
    /// The point is checked to be on the curve but not to be in the subgroup.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>;

    /// Decodes a point with [Point::from_bytes] and ensures it lies in the subgroup.
    fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let point = Self::from_bytes(bytes)?;
        point.validate()?;
        Ok(point)
    }

    /// Fails with [Error::PointNotInGroup] if the point is not in the subgroup.
    fn validate(&self) -> Result<(), Error> {
        if !self.in_subgroup() {
            return Err(Error::PointNotInGroup);
        }
        Ok(())
    }

    /// Computes `sum(scalars[i] * points[i])` using up to `concurrency` threads.
    ///
    /// Fails with [Error::LengthMismatch] if the slices have different lengths.
    fn msm(points: &[Self], scalars: &[Scalar], concurrency: usize) -> Result<Self, Error>;
}
