//! The optimal ate pairing `e: G1 x G2 -> GT` and incremental pairing contexts.
//!
//! A pairing is computed in two steps: the Miller loop ([MillerLoopResult]) and the final
//! exponentiation ([GT]). Products of pairings only need one final exponentiation, which is
//! what [PairingContext] exploits: it multiplies Miller-loop outputs as terms are added and
//! exponentiates once when the result is checked.
//!
//! A context moves through two states:
//!
//! 1. [PairingContext]: terms are added with [PairingContext::aggregate],
//!    [PairingContext::mul_n_aggregate], or [PairingContext::raw_aggregate].
//! 2. [CommittedContext]: produced by [PairingContext::commit]. Committed contexts built
//!    independently (e.g. one per thread) can be combined with [CommittedContext::merge] and
//!    are consumed by [CommittedContext::final_verify].

use super::{
    g1::{G1Affine, G1},
    g2::{G2Affine, G2},
    group::{sealed::Sealed, Mapping, Point},
    scalar::{bits, Scalar},
    variant::Variant,
    Error,
};
use blst::{
    blst_aggregated_in_g1, blst_aggregated_in_g2, blst_bendian_from_fp12, blst_final_exp,
    blst_fp12, blst_fp12_in_group, blst_fp12_is_one, blst_fp12_mul, blst_fp12_one,
    blst_fp12_sqr, blst_miller_loop, Pairing,
};
use std::{
    fmt,
    ops::{Mul, MulAssign},
};
use tracing::debug;

/// Length of the big-endian export of a [GT] element.
pub const GT_LENGTH: usize = 576;

/// The output of the Miller loop.
///
/// Values are only comparable after [MillerLoopResult::final_exponentiation].
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct MillerLoopResult(blst_fp12);

impl MillerLoopResult {
    /// Returns the identity (the Miller loop of any term involving infinity).
    pub fn one() -> Self {
        Self(unsafe { *blst_fp12_one() })
    }

    /// Runs the Miller loop on `(q, p)`.
    pub fn miller_loop(q: &G2Affine, p: &G1Affine) -> Self {
        if q.is_infinity() || p.is_infinity() {
            return Self::one();
        }
        let mut ret = blst_fp12::default();
        unsafe { blst_miller_loop(&mut ret, &q.0, &p.0) };
        Self(ret)
    }

    /// Returns the Miller loop of `(G2::generator(), signature)`.
    pub fn from_signature_g1(signature: &G1Affine) -> Self {
        if signature.is_infinity() {
            return Self::one();
        }
        let mut ret = blst_fp12::default();
        unsafe { blst_aggregated_in_g1(&mut ret, &signature.0) };
        Self(ret)
    }

    /// Returns the Miller loop of `(signature, G1::generator())`.
    pub fn from_signature_g2(signature: &G2Affine) -> Self {
        if signature.is_infinity() {
            return Self::one();
        }
        let mut ret = blst_fp12::default();
        unsafe { blst_aggregated_in_g2(&mut ret, &signature.0) };
        Self(ret)
    }

    /// Returns the Miller loop of a signature against the generator of the opposite group.
    ///
    /// This is the value [CommittedContext::final_verify] expects when signatures were not
    /// added to the context.
    pub fn from_signature<P: Point>(signature: &P) -> Self {
        let mut ret = Self::one();
        if !signature.is_infinity() {
            Pairing::aggregated(&mut ret.0, &signature.to_raw_affine());
        }
        ret
    }

    /// Normalizes the value into the target group.
    pub fn final_exponentiation(&self) -> GT {
        let mut ret = blst_fp12::default();
        unsafe { blst_final_exp(&mut ret, &self.0) };
        GT(ret)
    }
}

impl Mul for MillerLoopResult {
    type Output = Self;

    fn mul(mut self, rhs: Self) -> Self {
        self *= rhs;
        self
    }
}

impl MulAssign for MillerLoopResult {
    fn mul_assign(&mut self, rhs: Self) {
        unsafe { blst_fp12_mul(&mut self.0, &self.0, &rhs.0) };
    }
}

/// An element of the target group `GT`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[repr(transparent)]
pub struct GT(blst_fp12);

impl GT {
    /// Returns the identity.
    pub fn one() -> Self {
        Self(unsafe { *blst_fp12_one() })
    }

    /// Computes `e(p, q)`.
    pub fn pairing(p: &G1, q: &G2) -> Self {
        // Reference: https://github.com/MystenLabs/fastcrypto/blob/bd4999bd3e901eab34ae3dd96dbe38b86ac646a7/fastcrypto/src/groups/bls12381.rs#L223-L234
        MillerLoopResult::miller_loop(&q.to_affine(), &p.to_affine()).final_exponentiation()
    }

    /// Returns `self * self`.
    pub fn square(&self) -> Self {
        let mut ret = blst_fp12::default();
        unsafe { blst_fp12_sqr(&mut ret, &self.0) };
        Self(ret)
    }

    /// Returns true if the element is the identity.
    pub fn is_one(&self) -> bool {
        unsafe { blst_fp12_is_one(&self.0) }
    }

    /// Returns true if the element lies in the order-`r` subgroup of `Fp12`.
    pub fn in_subgroup(&self) -> bool {
        unsafe { blst_fp12_in_group(&self.0) }
    }

    /// Exports the element as 576 big-endian bytes.
    ///
    /// This encoding is for display and comparison only: there is no way to decode it.
    pub fn to_bendian(&self) -> [u8; GT_LENGTH] {
        let mut bytes = [0u8; GT_LENGTH];
        unsafe { blst_bendian_from_fp12(bytes.as_mut_ptr(), &self.0) };
        bytes
    }
}

impl Mul for GT {
    type Output = Self;

    fn mul(mut self, rhs: Self) -> Self {
        self *= rhs;
        self
    }
}

impl MulAssign for GT {
    fn mul_assign(&mut self, rhs: Self) {
        unsafe { blst_fp12_mul(&mut self.0, &self.0, &rhs.0) };
    }
}

impl fmt::Display for GT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_bendian()))
    }
}

/// An accumulating pairing context.
///
/// The context borrows the DST it maps messages under. If any method returns an error, the
/// context must be discarded.
pub struct PairingContext<'a> {
    pairing: Pairing<'a>,
    mapping: Mapping,
    dst: &'a [u8],
    terms: usize,
}

impl<'a> PairingContext<'a> {
    /// Creates an empty context that maps messages with `mapping` under `dst`.
    pub fn new(mapping: Mapping, dst: &'a [u8]) -> Self {
        let pairing = Pairing::new(mapping.is_hash(), dst);
        Self {
            pairing,
            mapping,
            dst,
            terms: 0,
        }
    }

    /// Returns the mapping used for messages.
    pub fn mapping(&self) -> Mapping {
        self.mapping
    }

    /// Returns the domain separation tag used for messages.
    pub fn dst(&self) -> &'a [u8] {
        self.dst
    }

    /// Adds `e(public, H(aug || message))` and, if provided, `signature` to the context.
    ///
    /// `public` must be neither infinity nor outside its subgroup, and `signature` must be in
    /// its subgroup. An infinite `signature` is skipped.
    pub fn aggregate<V: Variant>(
        &mut self,
        public: &V::Public,
        signature: Option<&V::Signature>,
        message: &[u8],
        aug: &[u8],
    ) -> Result<(), Error> {
        let public = public.to_raw_affine();
        let result = match signature {
            Some(signature) => {
                let signature = signature.to_raw_affine();
                self.pairing
                    .aggregate(&public, true, &signature, true, message, aug)
            }
            None => self.pairing.aggregate(&public, true, &(), false, message, aug),
        };
        Error::check(result)?;
        self.terms += 1;
        Ok(())
    }

    /// Like [PairingContext::aggregate], but scales the term (and the signature) by `scalar`.
    ///
    /// Fails with [Error::BadScalar] if `scalar` is zero.
    pub fn mul_n_aggregate<V: Variant>(
        &mut self,
        public: &V::Public,
        signature: Option<&V::Signature>,
        scalar: &Scalar,
        message: &[u8],
        aug: &[u8],
    ) -> Result<(), Error> {
        // blst treats a zero-length scalar as "no scaling"
        if scalar.is_zero() {
            return Err(Error::BadScalar);
        }
        let raw = scalar.as_blst_scalar();
        let nbits = bits(&raw);
        let public = public.to_raw_affine();
        let result = match signature {
            Some(signature) => {
                let signature = signature.to_raw_affine();
                self.pairing.mul_n_aggregate(
                    &public, true, &signature, true, &raw.b, nbits, message, aug,
                )
            }
            None => self
                .pairing
                .mul_n_aggregate(&public, true, &(), false, &raw.b, nbits, message, aug),
        };
        Error::check(result)?;
        self.terms += 1;
        Ok(())
    }

    /// Multiplies the accumulator by the Miller loop of `(q, p)` without mapping anything.
    ///
    /// Terms involving infinity are skipped (they contribute the identity).
    pub fn raw_aggregate(&mut self, q: &G2Affine, p: &G1Affine) {
        if q.is_infinity() || p.is_infinity() {
            return;
        }
        self.pairing.raw_aggregate(&q.0, &p.0);
        self.terms += 1;
    }

    /// Flushes pending terms into the accumulator.
    pub fn commit(mut self) -> CommittedContext<'a> {
        self.pairing.commit();
        CommittedContext {
            pairing: self.pairing,
            mapping: self.mapping,
            dst: self.dst,
            terms: self.terms,
        }
    }
}

/// A committed pairing context, ready to be merged or verified.
pub struct CommittedContext<'a> {
    pairing: Pairing<'a>,
    mapping: Mapping,
    dst: &'a [u8],
    terms: usize,
}

impl<'a> CommittedContext<'a> {
    /// Returns the number of terms accumulated (including merged contexts).
    pub fn terms(&self) -> usize {
        self.terms
    }

    /// Folds `other` into `self`.
    ///
    /// Fails with [Error::AggrTypeMismatch] if the contexts use different mappings or DSTs, or
    /// if they aggregated public keys in different groups. On failure neither context is
    /// modified.
    pub fn merge(&mut self, other: &CommittedContext<'a>) -> Result<(), Error> {
        if self.mapping != other.mapping || self.dst != other.dst {
            debug!(
                left = ?self.mapping,
                right = ?other.mapping,
                same_dst = self.dst == other.dst,
                "rejected merge of incompatible contexts"
            );
            return Err(Error::AggrTypeMismatch);
        }
        if let Err(err) = Error::check(self.pairing.merge(&other.pairing)) {
            debug!(?err, "rejected merge");
            return Err(err);
        }
        self.terms += other.terms;
        Ok(())
    }

    /// Checks that the accumulator equals `signature` after final exponentiation.
    ///
    /// Without an explicit `signature`, the sum of the signatures passed to
    /// [PairingContext::aggregate] is used (or the identity if none were). A context with no
    /// terms never verifies.
    pub fn final_verify(self, signature: Option<&MillerLoopResult>) -> Result<(), Error> {
        if !self.pairing.finalverify(signature.map(|s| &s.0)) {
            debug!(terms = self.terms, "final verification failed");
            return Err(Error::VerifyFail);
        }
        Ok(())
    }
}
