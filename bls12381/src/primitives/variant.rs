//! Different variants of the BLS signature scheme.

use super::{
    g1::G1,
    g2::G2,
    group::{
        Mapping, Point, DST, G1_MESSAGE, G1_PROOF_OF_POSSESSION, G2_MESSAGE,
        G2_PROOF_OF_POSSESSION,
    },
    pairing::PairingContext,
    scalar::Scalar,
    Error,
};
use rand::{CryptoRng, RngCore};
use std::{fmt::Debug, hash::Hash};
use tracing::debug;

/// A specific instance of a signature scheme.
pub trait Variant: Clone + Copy + Send + Sync + Hash + Eq + Debug + 'static {
    /// The public key type.
    type Public: Point;

    /// The signature type.
    type Signature: Point;

    /// The domain separator tag (DST) for a proof of possession.
    const PROOF_OF_POSSESSION: DST;

    /// The domain separator tag (DST) for a message.
    const MESSAGE: DST;

    /// Adds the Miller loop of `e(public, signature)` to `context`, ordering the operands as
    /// the pairing requires.
    fn pair(context: &mut PairingContext<'_>, public: &Self::Public, signature: &Self::Signature);

    /// Verify the signature from the provided public key and pre-hashed message.
    ///
    /// Checks `e(public, hm) == e(generator, signature)` with a single product check against a
    /// negated generator (`e(public, hm) * e(-generator, signature) == 1`).
    fn verify(
        public: &Self::Public,
        hm: &Self::Signature,
        signature: &Self::Signature,
    ) -> Result<(), Error> {
        if public.is_infinity() {
            return Err(Error::PkIsInfinity);
        }

        // Only pre-hashed messages are handled, so the mapping and DST are never used
        let mut context = PairingContext::new(Mapping::Hash, &[]);
        Self::pair(&mut context, &-Self::Public::generator(), signature);
        Self::pair(&mut context, public, hm);

        // If the product is one, `e(public, hm) == e(generator, signature)`
        context.commit().final_verify(None)
    }

    /// Verify many (public key, pre-hashed message, signature) triples at once.
    ///
    /// Each triple is weighted by an independent random scalar so that invalid signatures
    /// cannot cancel each other out.
    fn batch_verify<R: RngCore + CryptoRng>(
        rng: &mut R,
        publics: &[Self::Public],
        hms: &[Self::Signature],
        signatures: &[Self::Signature],
    ) -> Result<(), Error> {
        // Ensure arguments are populated correctly
        if publics.len() != hms.len() {
            return Err(Error::LengthMismatch(publics.len(), hms.len()));
        }
        if publics.len() != signatures.len() {
            return Err(Error::LengthMismatch(publics.len(), signatures.len()));
        }
        if publics.is_empty() {
            return Ok(());
        }
        if publics.iter().any(Point::is_infinity) {
            return Err(Error::PkIsInfinity);
        }

        // Populate pairing context
        let neg_generator = -Self::Public::generator();
        let mut context = PairingContext::new(Mapping::Hash, &[]);
        for ((public, hm), signature) in publics.iter().zip(hms).zip(signatures) {
            let scalar = Scalar::random_nonzero(rng);
            Self::pair(&mut context, &(neg_generator * scalar), signature);
            Self::pair(&mut context, public, &(*hm * scalar));
        }

        // Check validity
        context.commit().final_verify(None).inspect_err(|_| {
            debug!(count = publics.len(), "batch verification failed");
        })
    }
}

/// A [Variant] with a public key of type [G1] and a signature of type [G2].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct MinPk;

impl Variant for MinPk {
    type Public = G1;
    type Signature = G2;

    const PROOF_OF_POSSESSION: DST = G2_PROOF_OF_POSSESSION;
    const MESSAGE: DST = G2_MESSAGE;

    fn pair(context: &mut PairingContext<'_>, public: &G1, signature: &G2) {
        context.raw_aggregate(&signature.to_affine(), &public.to_affine());
    }
}

/// A [Variant] with a public key of type [G2] and a signature of type [G1].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct MinSig;

impl Variant for MinSig {
    type Public = G2;
    type Signature = G1;

    const PROOF_OF_POSSESSION: DST = G1_PROOF_OF_POSSESSION;
    const MESSAGE: DST = G1_MESSAGE;

    fn pair(context: &mut PairingContext<'_>, public: &G2, signature: &G1) {
        context.raw_aggregate(&public.to_affine(), &signature.to_affine());
    }
}
