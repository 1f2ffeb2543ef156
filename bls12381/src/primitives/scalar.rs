//! Elements of the BLS12-381 scalar field (integers mod the group order `r`).

use super::Error;
use blst::{
    blst_bendian_from_scalar, blst_fr, blst_fr_add, blst_fr_cneg, blst_fr_from_scalar,
    blst_fr_from_uint64, blst_fr_inverse, blst_fr_mul, blst_fr_sub, blst_keygen_v3,
    blst_lendian_from_scalar, blst_scalar, blst_scalar_fr_check, blst_scalar_from_bendian,
    blst_scalar_from_fr, blst_scalar_from_lendian,
};
use rand::RngCore;
use std::{
    fmt,
    ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign},
    ptr,
};
use zeroize::Zeroize;

/// Length of a canonically encoded [Scalar].
pub const SCALAR_LENGTH: usize = 32;

/// Number of bits required to represent any [Scalar].
pub const SCALAR_BITS: usize = 255;

/// The group order `r` in big-endian.
pub const MODULUS: [u8; SCALAR_LENGTH] = [
    0x73, 0xed, 0xa7, 0x53, 0x29, 0x9d, 0x7d, 0x48, 0x33, 0x39, 0xd8, 0x08, 0x09, 0xa1, 0xd8, 0x05,
    0x53, 0xbd, 0xa4, 0x02, 0xff, 0xfe, 0x5b, 0xfe, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x01,
];

/// An element of the scalar field, always reduced mod `r`.
#[derive(Clone, Copy, Eq, PartialEq)]
#[repr(transparent)]
pub struct Scalar(blst_fr);

/// `R = 2^256 mod q` in little-endian Montgomery form which is equivalent to 1 in little-endian
/// non-Montgomery form.
///
/// mod(2^256, 0x73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001) = 0x1824b159acc5056f998c4fefecbc4ff55884b7fa0003480200000001fffffffe
// Reference: https://github.com/filecoin-project/blstrs/blob/ffbb41d1495d84e40a712583346439924603b49a/src/scalar.rs#L77-L89
const BLST_FR_ONE: Scalar = Scalar(blst_fr {
    l: [
        0x0000_0001_ffff_fffe,
        0x5884_b7fa_0003_4802,
        0x998c_4fef_ecbc_4ff5,
        0x1824_b159_acc5_056f,
    ],
});

/// Returns the size in bits of a given blst_scalar (represented in little-endian).
pub(crate) fn bits(scalar: &blst_scalar) -> usize {
    let mut bits: usize = SCALAR_LENGTH * 8;
    for i in scalar.b.iter().rev() {
        let leading = i.leading_zeros();
        bits -= leading as usize;
        if leading < 8 {
            break;
        }
    }
    bits
}

impl Scalar {
    /// Returns the additive identity.
    pub fn zero() -> Self {
        Self(blst_fr::default())
    }

    /// Returns the multiplicative identity.
    pub fn one() -> Self {
        BLST_FR_ONE
    }

    /// Creates a scalar from a small integer.
    pub fn from_u64(i: u64) -> Self {
        // blst requires a buffer of 4 uint64 values. Failure to provide one will
        // result in unexpected behavior (will read past the provided buffer).
        //
        // Reference: https://github.com/supranational/blst/blob/415d4f0e2347a794091836a3065206edfd9c72f3/bindings/blst.h#L102
        let buffer = [i, 0, 0, 0];
        let mut ret = blst_fr::default();
        unsafe { blst_fr_from_uint64(&mut ret, buffer.as_ptr()) };
        Self(ret)
    }

    /// Generates a random scalar using the provided RNG.
    pub fn random<R: RngCore>(rng: &mut R) -> Self {
        // Generate a random 64 byte buffer
        let mut ikm = [0u8; 64];
        rng.fill_bytes(&mut ikm);

        // Generate a scalar from the randomly populated buffer
        let mut ret = blst_fr::default();
        unsafe {
            let mut sc = blst_scalar::default();
            blst_keygen_v3(&mut sc, ikm.as_ptr(), ikm.len(), ptr::null(), 0);
            blst_fr_from_scalar(&mut ret, &sc);
        }
        ikm.zeroize();
        Self(ret)
    }

    /// Generates a random non-zero scalar (used to weight terms in batch verification).
    pub fn random_nonzero<R: RngCore>(rng: &mut R) -> Self {
        loop {
            let scalar = Self::random(rng);
            if !scalar.is_zero() {
                return scalar;
            }
        }
    }

    /// Decodes a 32-byte big-endian integer.
    ///
    /// Fails with [Error::BadEncoding] on a wrong length and with [Error::BadScalar] if the
    /// integer is not in `[0, r)`.
    pub fn from_bendian(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != SCALAR_LENGTH {
            return Err(Error::BadEncoding);
        }
        let mut scalar = blst_scalar::default();
        unsafe { blst_scalar_from_bendian(&mut scalar, bytes.as_ptr()) };
        Self::from_blst_scalar(&scalar)
    }

    /// Decodes a 32-byte little-endian integer.
    ///
    /// Fails with [Error::BadEncoding] on a wrong length and with [Error::BadScalar] if the
    /// integer is not in `[0, r)`.
    pub fn from_lendian(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != SCALAR_LENGTH {
            return Err(Error::BadEncoding);
        }
        let mut scalar = blst_scalar::default();
        unsafe { blst_scalar_from_lendian(&mut scalar, bytes.as_ptr()) };
        Self::from_blst_scalar(&scalar)
    }

    /// Encodes the scalar as a 32-byte big-endian integer.
    pub fn to_bendian(&self) -> [u8; SCALAR_LENGTH] {
        let mut bytes = [0u8; SCALAR_LENGTH];
        let scalar = self.as_blst_scalar();
        unsafe { blst_bendian_from_scalar(bytes.as_mut_ptr(), &scalar) };
        bytes
    }

    /// Encodes the scalar as a 32-byte little-endian integer.
    pub fn to_lendian(&self) -> [u8; SCALAR_LENGTH] {
        let mut bytes = [0u8; SCALAR_LENGTH];
        let scalar = self.as_blst_scalar();
        unsafe { blst_lendian_from_scalar(bytes.as_mut_ptr(), &scalar) };
        bytes
    }

    /// Returns true if the scalar is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Computes the multiplicative inverse.
    ///
    /// Fails with [Error::BadScalar] for zero, which has no inverse.
    pub fn inverse(&self) -> Result<Self, Error> {
        if self.is_zero() {
            return Err(Error::BadScalar);
        }
        let mut ret = blst_fr::default();
        unsafe { blst_fr_inverse(&mut ret, &self.0) };
        Ok(Self(ret))
    }

    /// Returns the number of significant bits in the canonical integer.
    pub fn bits(&self) -> usize {
        bits(&self.as_blst_scalar())
    }

    pub(crate) fn from_blst_scalar(scalar: &blst_scalar) -> Result<Self, Error> {
        if !unsafe { blst_scalar_fr_check(scalar) } {
            return Err(Error::BadScalar);
        }
        let mut ret = blst_fr::default();
        unsafe { blst_fr_from_scalar(&mut ret, scalar) };
        Ok(Self(ret))
    }

    /// Returns the canonical (non-Montgomery, little-endian) form expected by `blst`
    /// point multiplication.
    pub(crate) fn as_blst_scalar(&self) -> blst_scalar {
        let mut scalar = blst_scalar::default();
        unsafe { blst_scalar_from_fr(&mut scalar, &self.0) };
        scalar
    }
}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0.l.zeroize();
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar({})", hex::encode(self.to_bendian()))
    }
}

impl Add for Scalar {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for Scalar {
    fn add_assign(&mut self, rhs: Self) {
        unsafe { blst_fr_add(&mut self.0, &self.0, &rhs.0) };
    }
}

impl Sub for Scalar {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        self -= rhs;
        self
    }
}

impl SubAssign for Scalar {
    fn sub_assign(&mut self, rhs: Self) {
        unsafe { blst_fr_sub(&mut self.0, &self.0, &rhs.0) };
    }
}

impl Mul for Scalar {
    type Output = Self;

    fn mul(mut self, rhs: Self) -> Self {
        self *= rhs;
        self
    }
}

impl MulAssign for Scalar {
    fn mul_assign(&mut self, rhs: Self) {
        unsafe { blst_fr_mul(&mut self.0, &self.0, &rhs.0) };
    }
}

impl Neg for Scalar {
    type Output = Self;

    fn neg(self) -> Self {
        let mut ret = blst_fr::default();
        unsafe { blst_fr_cneg(&mut ret, &self.0, true) };
        Self(ret)
    }
}
