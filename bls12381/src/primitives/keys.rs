//! Secret keys and their deterministic derivation.
//!
//! Four keygen variants are exposed because they are not interchangeable: identical input
//! keying material produces different keys under each. They differ only in which inputs are
//! mixed into HKDF:
//!
//! | Function | Reference | Salt |
//! |---|---|---|
//! | [SecretKey::key_gen] | `draft-irtf-cfrg-bls-signature-04` | fixed |
//! | [SecretKey::key_gen_v3] | `draft-irtf-cfrg-bls-signature-03` | fixed |
//! | [SecretKey::key_gen_v4_5] | `draft-irtf-cfrg-bls-signature-04/05` | caller-provided |
//! | [SecretKey::key_gen_v5] | `draft-irtf-cfrg-bls-signature-05` | caller-provided |
//!
//! Hierarchical derivation follows [EIP-2333](https://eips.ethereum.org/EIPS/eip-2333).

use super::{
    scalar::{Scalar, SCALAR_LENGTH},
    Error,
};
use blst::{
    blst_derive_child_eip2333, blst_derive_master_eip2333, blst_keygen, blst_keygen_v3,
    blst_keygen_v4_5, blst_keygen_v5, blst_scalar, blst_scalar_from_bendian,
    blst_scalar_from_lendian, blst_sk_check,
};
use rand::{CryptoRng, RngCore};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Minimum length of input keying material accepted by the keygen functions.
pub const MIN_IKM_LENGTH: usize = 32;

/// A scalar in `(0, r)` used to sign messages.
///
/// The key is wiped from memory when dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(Scalar);

impl SecretKey {
    /// Generates a random secret key using the provided RNG.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut ikm = [0u8; 64];
        loop {
            rng.fill_bytes(&mut ikm);
            if let Ok(key) = Self::key_gen(&ikm, &[]) {
                ikm.zeroize();
                return key;
            }
        }
    }

    /// Derives a secret key from input keying material and an optional `info` string.
    pub fn key_gen(ikm: &[u8], info: &[u8]) -> Result<Self, Error> {
        check_ikm(ikm)?;
        let mut sk = blst_scalar::default();
        unsafe {
            blst_keygen(
                &mut sk,
                ikm.as_ptr(),
                ikm.len(),
                info.as_ptr(),
                info.len(),
            )
        };
        Self::from_derived(sk)
    }

    /// Derives a secret key using the `v3` schedule.
    pub fn key_gen_v3(ikm: &[u8], info: &[u8]) -> Result<Self, Error> {
        check_ikm(ikm)?;
        let mut sk = blst_scalar::default();
        unsafe {
            blst_keygen_v3(
                &mut sk,
                ikm.as_ptr(),
                ikm.len(),
                info.as_ptr(),
                info.len(),
            )
        };
        Self::from_derived(sk)
    }

    /// Derives a secret key using the `v4.5` schedule with a caller-provided salt.
    pub fn key_gen_v4_5(ikm: &[u8], salt: &[u8], info: &[u8]) -> Result<Self, Error> {
        check_ikm(ikm)?;
        let mut sk = blst_scalar::default();
        unsafe {
            blst_keygen_v4_5(
                &mut sk,
                ikm.as_ptr(),
                ikm.len(),
                salt.as_ptr(),
                salt.len(),
                info.as_ptr(),
                info.len(),
            )
        };
        Self::from_derived(sk)
    }

    /// Derives a secret key using the `v5` schedule with a caller-provided salt.
    pub fn key_gen_v5(ikm: &[u8], salt: &[u8], info: &[u8]) -> Result<Self, Error> {
        check_ikm(ikm)?;
        let mut sk = blst_scalar::default();
        unsafe {
            blst_keygen_v5(
                &mut sk,
                ikm.as_ptr(),
                ikm.len(),
                salt.as_ptr(),
                salt.len(),
                info.as_ptr(),
                info.len(),
            )
        };
        Self::from_derived(sk)
    }

    /// Derives the EIP-2333 master key from a seed.
    pub fn derive_master_eip2333(ikm: &[u8]) -> Result<Self, Error> {
        check_ikm(ikm)?;
        let mut sk = blst_scalar::default();
        unsafe { blst_derive_master_eip2333(&mut sk, ikm.as_ptr(), ikm.len()) };
        Self::from_derived(sk)
    }

    /// Derives the EIP-2333 child key at `index`.
    ///
    /// The same parent and index always yield the same child. The parent cannot be
    /// recovered from the child.
    pub fn derive_child_eip2333(&self, index: u32) -> Result<Self, Error> {
        let mut parent = self.0.as_blst_scalar();
        let mut sk = blst_scalar::default();
        unsafe { blst_derive_child_eip2333(&mut sk, &parent, index) };
        parent.b.zeroize();
        Self::from_derived(sk)
    }

    /// Decodes a 32-byte big-endian secret key.
    ///
    /// Fails with [Error::BadEncoding] unless the input is exactly 32 bytes encoding an
    /// integer in `(0, r)`.
    pub fn from_bendian(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != SCALAR_LENGTH {
            return Err(Error::BadEncoding);
        }
        let mut sk = blst_scalar::default();
        unsafe { blst_scalar_from_bendian(&mut sk, bytes.as_ptr()) };
        Self::from_encoded(sk)
    }

    /// Decodes a 32-byte little-endian secret key.
    ///
    /// Fails with [Error::BadEncoding] unless the input is exactly 32 bytes encoding an
    /// integer in `(0, r)`.
    pub fn from_lendian(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != SCALAR_LENGTH {
            return Err(Error::BadEncoding);
        }
        let mut sk = blst_scalar::default();
        unsafe { blst_scalar_from_lendian(&mut sk, bytes.as_ptr()) };
        Self::from_encoded(sk)
    }

    /// Creates a secret key from a scalar, rejecting zero with [Error::BadScalar].
    pub fn from_scalar(scalar: Scalar) -> Result<Self, Error> {
        if scalar.is_zero() {
            return Err(Error::BadScalar);
        }
        Ok(Self(scalar))
    }

    /// Encodes the secret key as a 32-byte big-endian integer.
    pub fn to_bendian(&self) -> [u8; SCALAR_LENGTH] {
        self.0.to_bendian()
    }

    /// Encodes the secret key as a 32-byte little-endian integer.
    pub fn to_lendian(&self) -> [u8; SCALAR_LENGTH] {
        self.0.to_lendian()
    }

    /// Returns the underlying scalar.
    pub fn as_scalar(&self) -> &Scalar {
        &self.0
    }

    fn from_encoded(mut sk: blst_scalar) -> Result<Self, Error> {
        let valid = unsafe { blst_sk_check(&sk) };
        let result = if valid {
            Scalar::from_blst_scalar(&sk).map(Self)
        } else {
            Err(Error::BadEncoding)
        };
        sk.b.zeroize();
        result
    }

    fn from_derived(mut sk: blst_scalar) -> Result<Self, Error> {
        // Derivation reduces mod r, so only the (negligible) zero output can be rejected
        let valid = unsafe { blst_sk_check(&sk) };
        let result = if valid {
            Scalar::from_blst_scalar(&sk).map(Self)
        } else {
            Err(Error::BadScalar)
        };
        sk.b.zeroize();
        result
    }
}

fn check_ikm(ikm: &[u8]) -> Result<(), Error> {
    if ikm.len() < MIN_IKM_LENGTH {
        return Err(Error::BadEncoding);
    }
    Ok(())
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}
