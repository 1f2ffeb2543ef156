//! Points on the BLS12-381 curve over the base field.
//!
//! # Warning
//!
//! Decoding with [G1::from_compressed], [G1::from_uncompressed], or [Point::from_bytes] only
//! checks that the point is on the curve. Points from untrusted sources must also be checked
//! to be in the prime-order subgroup (use [Point::decode] or [Point::validate]). The one
//! exception is a compressed encoding with `x = 0`: both such points have order 3 and are
//! rejected at decode time with [Error::PointNotInGroup].

use super::{
    group::{sealed::Sealed, Mapping, Point},
    msm::{self, Accumulate},
    scalar::{bits, Scalar},
    Error,
};
use blst::{
    blst_encode_to_g1, blst_hash_to_g1, blst_p1, blst_p1_add_or_double,
    blst_p1_add_or_double_affine, blst_p1_affine, blst_p1_affine_compress, blst_p1_affine_in_g1,
    blst_p1_affine_is_inf, blst_p1_affine_on_curve, blst_p1_affine_serialize, blst_p1_cneg,
    blst_p1_compress, blst_p1_deserialize, blst_p1_double, blst_p1_from_affine, blst_p1_in_g1,
    blst_p1_is_inf, blst_p1_mult, blst_p1_on_curve, blst_p1_serialize, blst_p1_to_affine,
    blst_p1_uncompress, blst_p1s_to_affine, BLS12_381_G1,
};
use num_bigint::{BigInt, Sign};
use std::{
    fmt,
    hash::{Hash, Hasher},
    ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign},
    ptr,
};

/// Length of a compressed G1 point.
pub const G1_COMPRESSED_LENGTH: usize = 48;

/// Length of an uncompressed G1 point.
pub const G1_UNCOMPRESSED_LENGTH: usize = 96;

/// Flag set in the first byte of a compressed encoding.
const COMPRESSION_FLAG: u8 = 0x80;

/// A G1 point in projective (Jacobian) coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[repr(transparent)]
pub struct G1(blst_p1);

/// A G1 point in affine coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[repr(transparent)]
pub struct G1Affine(pub(crate) blst_p1_affine);

impl G1Affine {
    /// Returns the canonical generator.
    pub fn generator() -> Self {
        Self(unsafe { BLS12_381_G1 })
    }

    /// Returns the point at infinity.
    pub fn infinity() -> Self {
        Self(blst_p1_affine::default())
    }

    /// Returns true if the point is the identity.
    pub fn is_infinity(&self) -> bool {
        unsafe { blst_p1_affine_is_inf(&self.0) }
    }

    /// Returns true if the point satisfies the curve equation.
    pub fn is_on_curve(&self) -> bool {
        unsafe { blst_p1_affine_on_curve(&self.0) }
    }

    /// Returns true if the point lies in G1.
    pub fn in_subgroup(&self) -> bool {
        unsafe { blst_p1_affine_in_g1(&self.0) }
    }

    /// Returns the 48-byte compressed encoding.
    pub fn to_compressed(&self) -> [u8; G1_COMPRESSED_LENGTH] {
        let mut bytes = [0u8; G1_COMPRESSED_LENGTH];
        unsafe { blst_p1_affine_compress(bytes.as_mut_ptr(), &self.0) };
        bytes
    }

    /// Returns the 96-byte uncompressed encoding.
    pub fn to_uncompressed(&self) -> [u8; G1_UNCOMPRESSED_LENGTH] {
        let mut bytes = [0u8; G1_UNCOMPRESSED_LENGTH];
        unsafe { blst_p1_affine_serialize(bytes.as_mut_ptr(), &self.0) };
        bytes
    }

    /// Decodes a 48-byte compressed point that is on the curve.
    ///
    /// Fails with [Error::PointNotInGroup] for `x = 0`, whose points have order 3.
    pub fn from_compressed(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != G1_COMPRESSED_LENGTH || bytes[0] & COMPRESSION_FLAG == 0 {
            return Err(Error::BadEncoding);
        }
        let mut affine = blst_p1_affine::default();
        Error::check(unsafe { blst_p1_uncompress(&mut affine, bytes.as_ptr()) })?;
        Ok(Self(affine))
    }

    /// Decodes a 96-byte uncompressed point that is on the curve.
    pub fn from_uncompressed(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != G1_UNCOMPRESSED_LENGTH || bytes[0] & COMPRESSION_FLAG != 0 {
            return Err(Error::BadEncoding);
        }
        let mut affine = blst_p1_affine::default();
        Error::check(unsafe { blst_p1_deserialize(&mut affine, bytes.as_ptr()) })?;
        Ok(Self(affine))
    }
}

impl Default for G1Affine {
    fn default() -> Self {
        Self::infinity()
    }
}

impl From<G1> for G1Affine {
    fn from(point: G1) -> Self {
        let mut affine = blst_p1_affine::default();
        unsafe { blst_p1_to_affine(&mut affine, &point.0) };
        Self(affine)
    }
}

impl From<G1Affine> for G1 {
    fn from(affine: G1Affine) -> Self {
        let mut point = blst_p1::default();
        unsafe { blst_p1_from_affine(&mut point, &affine.0) };
        Self(point)
    }
}

impl G1 {
    /// Decodes a 48-byte compressed point that is on the curve.
    ///
    /// Fails with [Error::PointNotInGroup] for `x = 0`, whose points have order 3.
    pub fn from_compressed(bytes: &[u8]) -> Result<Self, Error> {
        G1Affine::from_compressed(bytes).map(Self::from)
    }

    /// Decodes a 96-byte uncompressed point that is on the curve.
    pub fn from_uncompressed(bytes: &[u8]) -> Result<Self, Error> {
        G1Affine::from_uncompressed(bytes).map(Self::from)
    }

    /// Returns the 48-byte compressed encoding.
    pub fn to_compressed(&self) -> [u8; G1_COMPRESSED_LENGTH] {
        let mut bytes = [0u8; G1_COMPRESSED_LENGTH];
        unsafe { blst_p1_compress(bytes.as_mut_ptr(), &self.0) };
        bytes
    }

    /// Returns the 96-byte uncompressed encoding.
    pub fn to_uncompressed(&self) -> [u8; G1_UNCOMPRESSED_LENGTH] {
        let mut bytes = [0u8; G1_UNCOMPRESSED_LENGTH];
        unsafe { blst_p1_serialize(bytes.as_mut_ptr(), &self.0) };
        bytes
    }

    /// Hashes `aug || message` to G1 (`hash_to_curve`).
    pub fn hash_to_curve(message: &[u8], dst: &[u8], aug: &[u8]) -> Self {
        let mut point = blst_p1::default();
        unsafe {
            blst_hash_to_g1(
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

    /// Encodes `aug || message` to G1 (`encode_to_curve`).
    pub fn encode_to_curve(message: &[u8], dst: &[u8], aug: &[u8]) -> Self {
        let mut point = blst_p1::default();
        unsafe {
            blst_encode_to_g1(
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

impl Point for G1 {
    type Affine = G1Affine;

    const COMPRESSED_LENGTH: usize = G1_COMPRESSED_LENGTH;
    const UNCOMPRESSED_LENGTH: usize = G1_UNCOMPRESSED_LENGTH;

    fn generator() -> Self {
        G1Affine::generator().into()
    }

    fn infinity() -> Self {
        Self(blst_p1::default())
    }

    fn is_infinity(&self) -> bool {
        unsafe { blst_p1_is_inf(&self.0) }
    }

    fn is_on_curve(&self) -> bool {
        unsafe { blst_p1_on_curve(&self.0) }
    }

    fn in_subgroup(&self) -> bool {
        unsafe { blst_p1_in_g1(&self.0) }
    }

    fn double(&self) -> Self {
        let mut ret = blst_p1::default();
        unsafe { blst_p1_double(&mut ret, &self.0) };
        Self(ret)
    }

    fn mul_bigint(&self, k: &BigInt) -> Self {
        let (sign, magnitude) = k.to_bytes_le();
        let mut base = *self;
        if sign == Sign::Minus {
            base = -base;
        }
        let nbits = k.bits() as usize;
        let mut ret = blst_p1::default();
        unsafe { blst_p1_mult(&mut ret, &base.0, magnitude.as_ptr(), nbits) };
        Self(ret)
    }

    fn batch_to_affine(points: &[Self]) -> Vec<G1Affine> {
        let mut out = vec![G1Affine::infinity(); points.len()];

        // blst requires every input to be finite
        let (indices, finite): (Vec<usize>, Vec<blst_p1>) = points
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_infinity())
            .map(|(i, p)| (i, p.0))
            .unzip();
        if finite.is_empty() {
            return out;
        }

        let mut affine = vec![blst_p1_affine::default(); finite.len()];
        let inputs: [*const blst_p1; 2] = [finite.as_ptr(), ptr::null()];
        unsafe { blst_p1s_to_affine(affine.as_mut_ptr(), inputs.as_ptr(), finite.len()) };
        for (i, a) in indices.into_iter().zip(affine) {
            out[i] = G1Affine(a);
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
            (G1_COMPRESSED_LENGTH, true) => Self::from_compressed(bytes),
            (G1_UNCOMPRESSED_LENGTH, false) => Self::from_uncompressed(bytes),
            _ => Err(Error::BadEncoding),
        }
    }

    fn msm(points: &[Self], scalars: &[Scalar], concurrency: usize) -> Result<Self, Error> {
        msm::pippenger(points, scalars, concurrency)
    }
}

impl Sealed for G1 {
    type Raw = blst_p1_affine;

    fn to_raw_affine(&self) -> blst_p1_affine {
        G1Affine::from(*self).0
    }
}

impl Accumulate for G1 {
    fn add_affine(&mut self, rhs: &G1Affine) {
        unsafe { blst_p1_add_or_double_affine(&mut self.0, &self.0, &rhs.0) };
    }
}

impl Add for G1 {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for G1 {
    fn add_assign(&mut self, rhs: Self) {
        unsafe { blst_p1_add_or_double(&mut self.0, &self.0, &rhs.0) };
    }
}

impl Sub for G1 {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        self -= rhs;
        self
    }
}

impl SubAssign for G1 {
    fn sub_assign(&mut self, rhs: Self) {
        *self += -rhs;
    }
}

impl Neg for G1 {
    type Output = Self;

    fn neg(mut self) -> Self {
        unsafe { blst_p1_cneg(&mut self.0, true) };
        self
    }
}

impl Mul<Scalar> for G1 {
    type Output = Self;

    fn mul(mut self, rhs: Scalar) -> Self {
        self *= rhs;
        self
    }
}

impl MulAssign<Scalar> for G1 {
    fn mul_assign(&mut self, rhs: Scalar) {
        let scalar = rhs.as_blst_scalar();
        unsafe { blst_p1_mult(&mut self.0, &self.0, scalar.b.as_ptr(), bits(&scalar)) };
    }
}

impl Hash for G1 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write(&self.to_compressed());
    }
}

impl fmt::Display for G1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_compressed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const GENERATOR: &str = "97f1d3a73197d7942695638c4fa9ac0fc3688c4f9774b905a14e3a3f171bac586c55e83ff97a1aeffb3af00adb22c6bb";

    #[test]
    fn test_generator_encoding() {
        let generator = G1::generator();
        assert_eq!(hex::encode(generator.to_compressed()), GENERATOR);
        assert_eq!(generator.to_string(), GENERATOR);
        assert_eq!(
            G1::from_compressed(&hex::decode(GENERATOR).unwrap()).unwrap(),
            generator
        );
        assert!(generator.in_subgroup());
        assert!(!generator.is_infinity());
    }

    #[test]
    fn test_infinity_encoding() {
        let mut compressed = [0u8; G1_COMPRESSED_LENGTH];
        compressed[0] = 0xc0;
        assert_eq!(G1::infinity().to_compressed(), compressed);
        assert!(G1::from_compressed(&compressed).unwrap().is_infinity());

        let mut uncompressed = [0u8; G1_UNCOMPRESSED_LENGTH];
        uncompressed[0] = 0x40;
        assert_eq!(G1::infinity().to_uncompressed(), uncompressed);
        assert!(G1::from_uncompressed(&uncompressed).unwrap().is_infinity());

        assert_eq!(G1Affine::from(G1::infinity()), G1Affine::infinity());
        assert!(G1Affine::infinity().is_infinity());
    }

    #[test]
    fn test_affine_matches_projective() {
        let mut rng = StdRng::seed_from_u64(0);
        let point = G1::generator() * Scalar::random(&mut rng);
        let affine = G1Affine::from(point);
        assert_eq!(G1::from(affine), point);
        assert_eq!(affine.to_compressed(), point.to_compressed());
        assert_eq!(affine.to_uncompressed(), point.to_uncompressed());
        assert_eq!(G1Affine::from_compressed(&point.to_compressed()).unwrap(), affine);
        assert!(affine.is_on_curve());
        assert!(affine.in_subgroup());
    }

    #[test]
    fn test_flag_mismatch() {
        let generator = G1::generator();

        // Uncompressed bytes claiming to be compressed
        let mut uncompressed = generator.to_uncompressed();
        uncompressed[0] |= COMPRESSION_FLAG;
        assert_eq!(G1::from_uncompressed(&uncompressed), Err(Error::BadEncoding));
        assert_eq!(G1::from_bytes(&uncompressed), Err(Error::BadEncoding));

        // Compressed bytes missing the flag
        let mut compressed = generator.to_compressed();
        compressed[0] &= !COMPRESSION_FLAG;
        assert_eq!(G1::from_compressed(&compressed), Err(Error::BadEncoding));
        assert_eq!(G1::from_bytes(&compressed), Err(Error::BadEncoding));
    }

    #[test]
    fn test_not_on_curve() {
        let mut uncompressed = G1::generator().to_uncompressed();
        uncompressed[G1_UNCOMPRESSED_LENGTH - 1] ^= 1;
        assert_eq!(
            G1::from_uncompressed(&uncompressed),
            Err(Error::PointNotOnCurve)
        );

        // Some x-coordinate has no matching y
        let rejected = (1u8..=255).any(|x| {
            let mut compressed = [0u8; G1_COMPRESSED_LENGTH];
            compressed[0] = COMPRESSION_FLAG;
            compressed[G1_COMPRESSED_LENGTH - 1] = x;
            G1::from_compressed(&compressed) == Err(Error::PointNotOnCurve)
        });
        assert!(rejected);

        // x >= p
        let mut compressed = [0xff; G1_COMPRESSED_LENGTH];
        compressed[0] = 0x9f;
        assert_eq!(G1::from_compressed(&compressed), Err(Error::BadEncoding));
    }

    #[test]
    fn test_not_in_subgroup() {
        // Walk x-coordinates until one is on the curve; the cofactor makes it
        // overwhelmingly unlikely to also be in G1
        let point = (1u8..=255)
            .find_map(|x| {
                let mut compressed = [0u8; G1_COMPRESSED_LENGTH];
                compressed[0] = COMPRESSION_FLAG;
                compressed[G1_COMPRESSED_LENGTH - 1] = x;
                G1::from_compressed(&compressed).ok()
            })
            .unwrap();
        assert!(point.is_on_curve());
        assert!(!point.in_subgroup());
        assert!(!G1Affine::from(point).in_subgroup());
        assert_eq!(point.validate(), Err(Error::PointNotInGroup));
        assert_eq!(G1::decode(&point.to_compressed()), Err(Error::PointNotInGroup));
        assert_eq!(G1::decode(&point.to_uncompressed()), Err(Error::PointNotInGroup));
    }

    #[test]
    fn test_zero_x_rejected() {
        // (0, 2) and (0, -2) have order 3 and never decode
        let mut compressed = [0u8; G1_COMPRESSED_LENGTH];
        compressed[0] = COMPRESSION_FLAG;
        assert_eq!(G1::from_compressed(&compressed), Err(Error::PointNotInGroup));
        compressed[0] |= 0x20;
        assert_eq!(G1::from_compressed(&compressed), Err(Error::PointNotInGroup));
        assert_eq!(G1::decode(&compressed), Err(Error::PointNotInGroup));
    }

    #[test]
    fn test_hash_to_curve_matches_blst() {
        let dst = b"BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_NUL_";
        let sk = crate::primitives::keys::SecretKey::key_gen(&[1u8; 32], &[]).unwrap();
        let signature = G1::hash_to_curve(b"hello", dst, b"aug") * *sk.as_scalar();

        let expected = blst::min_sig::SecretKey::key_gen(&[1u8; 32], &[])
            .unwrap()
            .sign(b"hello", dst, b"aug");
        assert_eq!(signature.to_compressed(), expected.compress());
    }
}
