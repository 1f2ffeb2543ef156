//! Points on the BLS12-381 curve over the quadratic extension of the base field.
//!
//! # Warning
//!
//! Decoding with [G2::from_compressed], [G2::from_uncompressed], or [Point::from_bytes] only
//! checks that the point is on the curve. Points from untrusted sources must also be checked
//! to be in the prime-order subgroup (use [Point::decode] or [Point::validate]).

use super::{
    group::{sealed::Sealed, Mapping, Point},
    msm::{self, Accumulate},
    scalar::{bits, Scalar},
    Error,
};
use blst::{
    blst_encode_to_g2, blst_hash_to_g2, blst_p2, blst_p2_add_or_double,
    blst_p2_add_or_double_affine, blst_p2_affine, blst_p2_affine_compress, blst_p2_affine_in_g2,
    blst_p2_affine_is_inf, blst_p2_affine_on_curve, blst_p2_affine_serialize, blst_p2_cneg,
    blst_p2_compress, blst_p2_deserialize, blst_p2_double, blst_p2_from_affine, blst_p2_in_g2,
    blst_p2_is_inf, blst_p2_mult, blst_p2_on_curve, blst_p2_serialize, blst_p2_to_affine,
    blst_p2_uncompress, blst_p2s_to_affine, BLS12_381_G2,
};
use num_bigint::{BigInt, Sign};
use std::{
    fmt,
    hash::{Hash, Hasher},
    ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign},
    ptr,
};

/// Length of a compressed G2 point.
pub const G2_COMPRESSED_LENGTH: usize = 96;

/// Length of an uncompressed G2 point.
pub const G2_UNCOMPRESSED_LENGTH: usize = 192;

/// Flag set in the first byte of a compressed encoding.
const COMPRESSION_FLAG: u8 = 0x80;

/// A G2 point in projective (Jacobian) coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[repr(transparent)]
pub struct G2(blst_p2);

/// A G2 point in affine coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[repr(transparent)]
pub struct G2Affine(pub(crate) blst_p2_affine);

impl G2Affine {
    /// Returns the canonical generator.
    pub fn generator() -> Self {
        Self(unsafe { BLS12_381_G2 })
    }

    /// Returns the point at infinity.
    pub fn infinity() -> Self {
        Self(blst_p2_affine::default())
    }

    /// Returns true if the point is the identity.
    pub fn is_infinity(&self) -> bool {
        unsafe { blst_p2_affine_is_inf(&self.0) }
    }

    /// Returns true if the point satisfies the curve equation.
    pub fn is_on_curve(&self) -> bool {
        unsafe { blst_p2_affine_on_curve(&self.0) }
    }

    /// Returns true if the point lies in G2.
    pub fn in_subgroup(&self) -> bool {
        unsafe { blst_p2_affine_in_g2(&self.0) }
    }

    /// Returns the 96-byte compressed encoding.
    pub fn to_compressed(&self) -> [u8; G2_COMPRESSED_LENGTH] {
        let mut bytes = [0u8; G2_COMPRESSED_LENGTH];
        unsafe { blst_p2_affine_compress(bytes.as_mut_ptr(), &self.0) };
        bytes
    }

    /// Returns the 192-byte uncompressed encoding.
    pub fn to_uncompressed(&self) -> [u8; G2_UNCOMPRESSED_LENGTH] {
        let mut bytes = [0u8; G2_UNCOMPRESSED_LENGTH];
        unsafe { blst_p2_affine_serialize(bytes.as_mut_ptr(), &self.0) };
        bytes
    }

    /// Decodes a 96-byte compressed point that is on the curve.
    pub fn from_compressed(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != G2_COMPRESSED_LENGTH || bytes[0] & COMPRESSION_FLAG == 0 {
            return Err(Error::BadEncoding);
        }
        let mut affine = blst_p2_affine::default();
        Error::check(unsafe { blst_p2_uncompress(&mut affine, bytes.as_ptr()) })?;
        Ok(Self(affine))
    }

    /// Decodes a 192-byte uncompressed point that is on the curve.
    pub fn from_uncompressed(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != G2_UNCOMPRESSED_LENGTH || bytes[0] & COMPRESSION_FLAG != 0 {
            return Err(Error::BadEncoding);
        }
        let mut affine = blst_p2_affine::default();
        Error::check(unsafe { blst_p2_deserialize(&mut affine, bytes.as_ptr()) })?;
        Ok(Self(affine))
    }
}

impl Default for G2Affine {
    fn default() -> Self {
        Self::infinity()
    }
}

impl From<G2> for G2Affine {
    fn from(point: G2) -> Self {
        let mut affine = blst_p2_affine::default();
        unsafe { blst_p2_to_affine(&mut affine, &point.0) };
        Self(affine)
    }
}

impl From<G2Affine> for G2 {
    fn from(affine: G2Affine) -> Self {
        let mut point = blst_p2::default();
        unsafe { blst_p2_from_affine(&mut point, &affine.0) };
        Self(point)
    }
}

impl G2 {
    /// Decodes a 96-byte compressed point that is on the curve.
    pub fn from_compressed(bytes: &[u8]) -> Result<Self, Error> {
        G2Affine::from_compressed(bytes).map(Self::from)
    }

    /// Decodes a 192-byte uncompressed point that is on the curve.
    pub fn from_uncompressed(bytes: &[u8]) -> Result<Self, Error> {
        G2Affine::from_uncompressed(bytes).map(Self::from)
    }

    /// Returns the 96-byte compressed encoding.
    pub fn to_compressed(&self) -> [u8; G2_COMPRESSED_LENGTH] {
        let mut bytes = [0u8; G2_COMPRESSED_LENGTH];
        unsafe { blst_p2_compress(bytes.as_mut_ptr(), &self.0) };
        bytes
    }

    /// Returns the 192-byte uncompressed encoding.
    pub fn to_uncompressed(&self) -> [u8; G2_UNCOMPRESSED_LENGTH] {
        let mut bytes = [0u8; G2_UNCOMPRESSED_LENGTH];
        unsafe { blst_p2_serialize(bytes.as_mut_ptr(), &self.0) };
        bytes
    }

    /// Hashes `aug || message` to G2 (`hash_to_curve`).
    pub fn hash_to_curve(message: &[u8], dst: &[u8], aug: &[u8]) -> Self {
        let mut point = blst_p2::default();
        unsafe {
            blst_hash_to_g2(
                &mut point,
                message.as_ptr(),
                message.len(),
                dst.as_ptr(),
                dst.len(),
                aug.as_ptr(),
                aug.len(),
            );
        }
        Self(point)
    }

    /// Encodes `aug || message` to G2 (`encode_to_curve`).
    pub fn encode_to_curve(message: &[u8], dst: &[u8], aug: &[u8]) -> Self {
        let mut point = blst_p2::default();
        unsafe {
            blst_encode_to_g2(
                &mut point,
                message.as_ptr(),
                message.len(),
                dst.as_ptr(),
                dst.len(),
                aug.as_ptr(),
                aug.len(),
            );
        }
        Self(point)
    }
}

impl Point for G2 {
    type Affine = G2Affine;

    const COMPRESSED_LENGTH: usize = G2_COMPRESSED_LENGTH;
    const UNCOMPRESSED_LENGTH: usize = G2_UNCOMPRESSED_LENGTH;

    fn generator() -> Self {
        G2Affine::generator().into()
    }

    fn infinity() -> Self {
        Self(blst_p2::default())
    }

    fn is_infinity(&self) -> bool {
        unsafe { blst_p2_is_inf(&self.0) }
    }

    fn is_on_curve(&self) -> bool {
        unsafe { blst_p2_on_curve(&self.0) }
    }

    fn in_subgroup(&self) -> bool {
        unsafe { blst_p2_in_g2(&self.0) }
    }

    fn double(&self) -> Self {
        let mut ret = blst_p2::default();
        unsafe { blst_p2_double(&mut ret, &self.0) };
        Self(ret)
    }

    fn mul_bigint(&self, k: &BigInt) -> Self {
        let (sign, magnitude) = k.to_bytes_le();
        let mut base = *self;
        if sign == Sign::Minus {
            base = -base;
        }
        let nbits = k.bits() as usize;
        let mut ret = blst_p2::default();
        unsafe { blst_p2_mult(&mut ret, &base.0, magnitude.as_ptr(), nbits) };
        Self(ret)
    }

    fn batch_to_affine(points: &[Self]) -> Vec<G2Affine> {
        let mut out = vec![G2Affine::infinity(); points.len()];

        // blst requires every input to be finite
        let (indices, finite): (Vec<usize>, Vec<blst_p2>) = points
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_infinity())
            .map(|(i, p)| (i, p.0))
            .unzip();
        if finite.is_empty() {
            return out;
        }

        let mut affine = vec![blst_p2_affine::default(); finite.len()];
        let inputs: [*const blst_p2; 2] = [finite.as_ptr(), ptr::null()];
        unsafe { blst_p2s_to_affine(affine.as_mut_ptr(), inputs.as_ptr(), finite.len()) };
        for (i, a) in indices.into_iter().zip(affine) {
            out[i] = G2Affine(a);
        }
        out
    }

    fn map(mapping: Mapping, message: &[u8], dst: &[u8], aug: &[u8]) -> Self {
        match mapping {
            Mapping::Hash => Self::hash_to_curve(message, dst, aug),
            Mapping::Encode => Self::encode_to_curve(message, dst, aug),
        }
    }

    fn compress(&self) -> Vec<u8> {
        self.to_compressed().to_vec()
    }

    fn serialize(&self) -> Vec<u8> {
        self.to_uncompressed().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let compressed = bytes.first().is_some_and(|b| b & COMPRESSION_FLAG != 0);
        match (bytes.len(), compressed) {
            (G2_COMPRESSED_LENGTH, true) => Self::from_compressed(bytes),
            (G2_UNCOMPRESSED_LENGTH, false) => Self::from_uncompressed(bytes),
            _ => Err(Error::BadEncoding),
        }
    }

    fn msm(points: &[Self], scalars: &[Scalar], concurrency: usize) -> Result<Self, Error> {
        msm::pippenger(points, scalars, concurrency)
    }
}

impl Sealed for G2 {
    type Raw = blst_p2_affine;

    fn to_raw_affine(&self) -> blst_p2_affine {
        G2Affine::from(*self).0
    }
}

impl Accumulate for G2 {
    fn add_affine(&mut self, rhs: &G2Affine) {
        unsafe { blst_p2_add_or_double_affine(&mut self.0, &self.0, &rhs.0) };
    }
}

impl Add for G2 {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for G2 {
    fn add_assign(&mut self, rhs: Self) {
        unsafe { blst_p2_add_or_double(&mut self.0, &self.0, &rhs.0) };
    }
}

impl Sub for G2 {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        self -= rhs;
        self
    }
}

impl SubAssign for G2 {
    fn sub_assign(&mut self, rhs: Self) {
        *self += -rhs;
    }
}

impl Neg for G2 {
    type Output = Self;

    fn neg(mut self) -> Self {
        unsafe { blst_p2_cneg(&mut self.0, true) };
        self
    }
}

impl Mul<Scalar> for G2 {
    type Output = Self;

    fn mul(mut self, rhs: Scalar) -> Self {
        self *= rhs;
        self
    }
}

impl MulAssign<Scalar> for G2 {
    fn mul_assign(&mut self, rhs: Scalar) {
        let scalar = rhs.as_blst_scalar();
        unsafe { blst_p2_mult(&mut self.0, &self.0, scalar.b.as_ptr(), bits(&scalar)) };
    }
}

impl Hash for G2 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write(&self.to_compressed());
    }
}

impl fmt::Display for G2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_compressed()))
    }
}
