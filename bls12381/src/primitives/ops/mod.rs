//! Digital signatures over the BLS12-381 curve.
//!
//! This module provides BLS12-381 signature operations:
//!
//! - Core primitives (keypair generation, signing, verification, proof of possession)
//! - [`aggregate`]: Aggregation of public keys and signatures, and verification of aggregates
//! - [`batch`]: Batch verification ensuring each individual signature is valid
//! - [`check`]: Batch subgroup checks for untrusted points
//!
//! # Domain Separation Tag (DST)
//!
//! Every function that maps a message takes the DST and the [Mapping] explicitly. The tags of
//! the standard ciphersuites are exported from [group](super::group): for the proof-of-possession
//! scheme, messages are signed under [`Variant::MESSAGE`] and public keys under
//! [`Variant::PROOF_OF_POSSESSION`]. You can read more about DSTs [here](https://datatracker.ietf.org/doc/html/draft-irtf-cfrg-bls-signature-05#section-4.2).
//!
//! # Batch vs Aggregate Verification
//!
//! Use [`batch`] when you need to ensure each individual signature is valid. Use [`aggregate`]
//! when you only need to verify that the aggregate is valid (more efficient, but an attacker
//! could redistribute signature components between signers while keeping the aggregate unchanged).
//! Batch verification uses random scalar weights internally to prevent this attack.

pub mod aggregate;
pub mod batch;
pub mod check;

use super::{
    group::{Mapping, Point},
    install,
    keys::SecretKey,
    pairing::{CommittedContext, PairingContext},
    variant::Variant,
    Error,
};
use rand::{CryptoRng, RngCore};
use rayon::prelude::*;

/// Computes the public key from the private key.
pub fn compute_public<V: Variant>(private: &SecretKey) -> V::Public {
    V::Public::generator() * *private.as_scalar()
}

/// Returns a new keypair derived from the provided randomness.
pub fn keypair<R: RngCore + CryptoRng, V: Variant>(rng: &mut R) -> (SecretKey, V::Public) {
    let private = SecretKey::random(rng);
    let public = compute_public::<V>(&private);
    (private, public)
}

/// Maps `aug || message` to the signature group under `dst`.
pub fn hash_message<V: Variant>(
    mapping: Mapping,
    message: &[u8],
    dst: &[u8],
    aug: &[u8],
) -> V::Signature {
    V::Signature::map(mapping, message, dst, aug)
}

/// Signs the provided message with the private key.
///
/// # Determinism
///
/// Signatures produced by this function are deterministic and are safe
/// to use in a consensus-critical context.
pub fn sign<V: Variant>(
    private: &SecretKey,
    mapping: Mapping,
    message: &[u8],
    dst: &[u8],
    aug: &[u8],
) -> V::Signature {
    hash_message::<V>(mapping, message, dst, aug) * *private.as_scalar()
}

/// Verifies `signature` over `aug || message` with the provided public key.
///
/// Both points are group checked. Fails with [Error::PkIsInfinity] for the identity public key,
/// [Error::PointNotInGroup] if either point is outside its subgroup, and [Error::VerifyFail]
/// if the signature does not match.
pub fn core_verify<V: Variant>(
    public: &V::Public,
    signature: &V::Signature,
    mapping: Mapping,
    message: &[u8],
    dst: &[u8],
    aug: &[u8],
) -> Result<(), Error> {
    if public.is_infinity() {
        return Err(Error::PkIsInfinity);
    }
    public.validate()?;
    signature.validate()?;

    let mut context = PairingContext::new(mapping, dst);
    context.aggregate::<V>(public, Some(signature), message, aug)?;
    context.commit().final_verify(None)
}

/// Verifies the signature with the provided public key and pre-hashed message.
///
/// # Warning
///
/// This function assumes a group check was already performed on
/// `public` and `signature`.
pub fn verify<V: Variant>(
    public: &V::Public,
    hm: &V::Signature,
    signature: &V::Signature,
) -> Result<(), Error> {
    V::verify(public, hm, signature)
}

/// Feeds every item into a pairing context and returns the merged, committed result.
///
/// With `concurrency > 1`, `items` is split into `concurrency` shards that are accumulated in
/// parallel (one context per shard) and merged in order. `f` receives the index of the item
/// in `items`.
pub(crate) fn accumulate<'a, T, F>(
    items: &[T],
    mapping: Mapping,
    dst: &'a [u8],
    concurrency: usize,
    f: F,
) -> Result<CommittedContext<'a>, Error>
where
    T: Sync,
    F: Fn(&mut PairingContext<'a>, usize, &T) -> Result<(), Error> + Sync,
{
    let size = if concurrency <= 1 {
        items.len()
    } else {
        items.len().div_ceil(concurrency)
    }
    .max(1);
    let build = |(shard, chunk): (usize, &[T])| -> Result<CommittedContext<'a>, Error> {
        let mut context = PairingContext::new(mapping, dst);
        for (offset, item) in chunk.iter().enumerate() {
            f(&mut context, shard * size + offset, item)?;
        }
        Ok(context.commit())
    };
    let contexts: Vec<CommittedContext<'a>> = if concurrency <= 1 {
        items
            .chunks(size)
            .enumerate()
            .map(build)
            .collect::<Result<_, Error>>()?
    } else {
        install(concurrency, || {
            items
                .par_chunks(size)
                .enumerate()
                .map(build)
                .collect::<Result<_, Error>>()
        })?
    };

    // Merge shards in order
    let mut contexts = contexts.into_iter();
    let Some(mut merged) = contexts.next() else {
        return Ok(PairingContext::new(mapping, dst).commit());
    };
    for context in contexts {
        merged.merge(&context)?;
    }
    Ok(merged)
}

// =============================================================================
// PROOF OF POSSESSION
// Proof of Possession is used to prove that a party controls the private key
// corresponding to a public key. This prevents rogue key attacks in aggregate
// signature schemes.
// =============================================================================

/// Generates a proof of possession for the private key.
pub fn sign_proof_of_possession<V: Variant>(private: &SecretKey) -> V::Signature {
    // Get public key
    let public = compute_public::<V>(private);

    // Sign the public key
    sign::<V>(
        private,
        Mapping::Hash,
        &public.compress(),
        V::PROOF_OF_POSSESSION,
        &[],
    )
}

/// Verifies a proof of possession for the provided public key.
pub fn verify_proof_of_possession<V: Variant>(
    public: &V::Public,
    signature: &V::Signature,
) -> Result<(), Error> {
    core_verify::<V>(
        public,
        signature,
        Mapping::Hash,
        &public.compress(),
        V::PROOF_OF_POSSESSION,
        &[],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{
        g1::G1,
        g2::G2,
        group::{G1_MESSAGE, G2_MESSAGE},
        scalar::Scalar,
        variant::{MinPk, MinSig},
    };
    use blst::BLST_ERROR;
    use rand::{rngs::StdRng, SeedableRng};

    const DST: &[u8] = b"TEST";

    fn end_to_end<V: Variant>() {
        let mut rng = StdRng::seed_from_u64(0);
        let (private, public) = keypair::<_, V>(&mut rng);
        assert_eq!(public, compute_public::<V>(&private));

        for mapping in [Mapping::Hash, Mapping::Encode] {
            let signature = sign::<V>(&private, mapping, b"hello", DST, &[]);
            core_verify::<V>(&public, &signature, mapping, b"hello", DST, &[]).unwrap();

            // Wrong message
            assert_eq!(
                core_verify::<V>(&public, &signature, mapping, b"world", DST, &[]),
                Err(Error::VerifyFail)
            );

            // Wrong DST
            assert_eq!(
                core_verify::<V>(&public, &signature, mapping, b"hello", b"OTHER", &[]),
                Err(Error::VerifyFail)
            );

            // Wrong augmentation
            assert_eq!(
                core_verify::<V>(&public, &signature, mapping, b"hello", DST, b"aug"),
                Err(Error::VerifyFail)
            );

            // Identity public key
            assert_eq!(
                core_verify::<V>(&V::Public::infinity(), &signature, mapping, b"hello", DST, &[]),
                Err(Error::PkIsInfinity)
            );

            // Pre-hashed
            let hm = hash_message::<V>(mapping, b"hello", DST, &[]);
            verify::<V>(&public, &hm, &signature).unwrap();
        }

        // Mixed mappings
        let signature = sign::<V>(&private, Mapping::Hash, b"hello", DST, &[]);
        assert_eq!(
            core_verify::<V>(&public, &signature, Mapping::Encode, b"hello", DST, &[]),
            Err(Error::VerifyFail)
        );
    }

    #[test]
    fn test_end_to_end() {
        end_to_end::<MinPk>();
        end_to_end::<MinSig>();
    }

    fn augmentation<V: Variant>() {
        let mut rng = StdRng::seed_from_u64(1);
        let (private, public) = keypair::<_, V>(&mut rng);

        // Augmentation is prepended to the message
        let signature = sign::<V>(&private, Mapping::Hash, b"world", DST, b"hello ");
        core_verify::<V>(&public, &signature, Mapping::Hash, b"world", DST, b"hello ").unwrap();
        core_verify::<V>(&public, &signature, Mapping::Hash, b"hello world", DST, &[]).unwrap();
    }

    #[test]
    fn test_augmentation() {
        augmentation::<MinPk>();
        augmentation::<MinSig>();
    }

    #[test]
    fn test_not_in_group() {
        // A point on the curve outside the subgroup
        let point = (1..=u8::MAX)
            .find_map(|x| {
                let mut compressed = [0u8; 48];
                compressed[0] = 0x80;
                compressed[47] = x;
                G1::from_compressed(&compressed).ok()
            })
            .unwrap();
        assert!(point.is_on_curve());
        assert!(!point.in_subgroup());

        let mut rng = StdRng::seed_from_u64(2);

        // As a public key
        let (private, _) = keypair::<_, MinPk>(&mut rng);
        let signature = sign::<MinPk>(&private, Mapping::Hash, b"hello", G2_MESSAGE, &[]);
        assert_eq!(
            core_verify::<MinPk>(&point, &signature, Mapping::Hash, b"hello", G2_MESSAGE, &[]),
            Err(Error::PointNotInGroup)
        );

        // As a signature
        let (_, public) = keypair::<_, MinSig>(&mut rng);
        assert_eq!(
            core_verify::<MinSig>(&public, &point, Mapping::Hash, b"hello", G1_MESSAGE, &[]),
            Err(Error::PointNotInGroup)
        );
    }

    #[test]
    fn test_matches_blst_min_pk() {
        let ikm = [42u8; 32];
        let private = SecretKey::key_gen(&ikm, &[]).unwrap();
        let public = compute_public::<MinPk>(&private);
        let signature = sign::<MinPk>(&private, Mapping::Hash, b"hello", G2_MESSAGE, b"aug");

        let sk = blst::min_pk::SecretKey::key_gen(&ikm, &[]).unwrap();
        let pk = sk.sk_to_pk();
        let sig = sk.sign(b"hello", G2_MESSAGE, b"aug");
        assert_eq!(public.to_compressed(), pk.compress());
        assert_eq!(signature.to_compressed(), sig.compress());

        // Signatures produced here verify with blst and vice versa
        let decoded = blst::min_pk::Signature::from_bytes(&signature.to_compressed()).unwrap();
        assert_eq!(
            decoded.verify(true, b"hello", G2_MESSAGE, b"aug", &pk, true),
            BLST_ERROR::BLST_SUCCESS
        );
        let signature = G2::decode(&sig.compress()).unwrap();
        core_verify::<MinPk>(&public, &signature, Mapping::Hash, b"hello", G2_MESSAGE, b"aug")
            .unwrap();
    }

    #[test]
    fn test_matches_blst_min_sig() {
        let ikm = [43u8; 32];
        let private = SecretKey::key_gen(&ikm, &[]).unwrap();
        let public = compute_public::<MinSig>(&private);
        let signature = sign::<MinSig>(&private, Mapping::Hash, b"hello", G1_MESSAGE, &[]);

        let sk = blst::min_sig::SecretKey::key_gen(&ikm, &[]).unwrap();
        let pk = sk.sk_to_pk();
        let sig = sk.sign(b"hello", G1_MESSAGE, &[]);
        assert_eq!(public.to_compressed(), pk.compress());
        assert_eq!(signature.to_compressed(), sig.compress());

        let decoded = blst::min_sig::Signature::from_bytes(&signature.to_uncompressed()).unwrap();
        assert_eq!(
            decoded.verify(true, b"hello", G1_MESSAGE, &[], &pk, true),
            BLST_ERROR::BLST_SUCCESS
        );
    }

    fn proof_of_possession<V: Variant>() {
        let mut rng = StdRng::seed_from_u64(3);
        let (private, public) = keypair::<_, V>(&mut rng);
        let pop = sign_proof_of_possession::<V>(&private);
        verify_proof_of_possession::<V>(&public, &pop).unwrap();

        // A proof for another key fails
        let (_, other) = keypair::<_, V>(&mut rng);
        assert_eq!(
            verify_proof_of_possession::<V>(&other, &pop),
            Err(Error::VerifyFail)
        );

        // A message signature is not a proof of possession
        let signature = sign::<V>(&private, Mapping::Hash, &public.compress(), V::MESSAGE, &[]);
        assert_eq!(
            verify_proof_of_possession::<V>(&public, &signature),
            Err(Error::VerifyFail)
        );
    }

    #[test]
    fn test_proof_of_possession() {
        proof_of_possession::<MinPk>();
        proof_of_possession::<MinSig>();
    }

    #[test]
    fn test_signature_is_scalar_multiple() {
        // e(k * G, H(m)) == e(G, k * H(m)) with k known
        let k = Scalar::from_u64(1234);
        let private = SecretKey::from_scalar(k).unwrap();
        let hm = hash_message::<MinPk>(Mapping::Hash, b"hello", DST, &[]);
        assert_eq!(sign::<MinPk>(&private, Mapping::Hash, b"hello", DST, &[]), hm * k);
        assert_eq!(compute_public::<MinPk>(&private), G1::generator() * k);
    }
}
