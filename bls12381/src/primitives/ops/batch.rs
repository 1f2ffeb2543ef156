//! Randomized batch verification of many signatures at once.
//!
//! Unlike [`aggregate`](super::aggregate), a passing batch implies every signature in it is
//! valid on its own. Each term is weighted by a fresh nonzero scalar, so moving signature
//! components between signers changes the weighted sum and is caught.
//!
//! Messages are mapped with the caller's [Mapping] under the caller's DST (and `aug`), exactly
//! as [`core_verify`](super::core_verify) would. [verify_multiple_signatures] feeds weighted
//! terms into one pairing context per shard (shards are built in parallel when
//! `concurrency > 1`), merges the committed shards in order, and runs a single final check.
//! [verify_multiple_public_keys] handles the same-message case with two MSMs per round and
//! bisects failing ranges to report the offending indices.

use super::{
    super::{
        group::{Mapping, Point},
        scalar::Scalar,
        variant::Variant,
        Error,
    },
    accumulate, hash_message,
};
use rand::{CryptoRng, RngCore};
use tracing::debug;

/// Verifies multiple signatures over the same message from different public keys,
/// ensuring each individual signature is valid.
///
/// Returns the indices of any invalid signatures found. Uses bisection internally
/// to efficiently identify which signatures are invalid.
///
/// # Warning
///
/// This function assumes a group check was already performed on each public key
/// and signature.
pub fn verify_multiple_public_keys<R, V>(
    rng: &mut R,
    entries: &[(V::Public, V::Signature)],
    mapping: Mapping,
    message: &[u8],
    dst: &[u8],
    aug: &[u8],
) -> Vec<usize>
where
    R: RngCore + CryptoRng,
    V: Variant,
{
    if entries.is_empty() {
        return Vec::new();
    }

    // Hash the message once
    let hm = hash_message::<V>(mapping, message, dst, aug);

    // Iteratively bisect to find invalid signatures
    let mut invalid = Vec::new();
    let mut stack = vec![(0, entries.len())];
    while let Some((start, end)) = stack.pop() {
        let slice = &entries[start..end];
        if slice.is_empty() {
            continue;
        }

        // Generate random scalars for each signature in this slice
        let scalars: Vec<Scalar> = (0..slice.len())
            .map(|_| Scalar::random_nonzero(&mut *rng))
            .collect();

        // Compute weighted sums: sum(r_i * pk_i) and sum(r_i * sig_i)
        let pks: Vec<V::Public> = slice.iter().map(|(pk, _)| *pk).collect();
        let sigs: Vec<V::Signature> = slice.iter().map(|(_, sig)| *sig).collect();
        let valid = match (
            V::Public::msm(&pks, &scalars, 1),
            V::Signature::msm(&sigs, &scalars, 1),
        ) {
            // Verify: e(weighted_pk, H(m)) == e(weighted_sig, G)
            (Ok(weighted_pk), Ok(weighted_sig)) => {
                V::verify(&weighted_pk, &hm, &weighted_sig).is_ok()
            }
            _ => false,
        };
        if !valid {
            if slice.len() == 1 {
                invalid.push(start);
            } else {
                let mid = slice.len() / 2;
                stack.push((start + mid, end));
                stack.push((start, start + mid));
            }
        }
    }

    if !invalid.is_empty() {
        debug!(
            entries = entries.len(),
            invalid = invalid.len(),
            "found invalid signatures"
        );
    }
    invalid
}

/// Verifies multiple (public key, message, signature) triples, ensuring each individual
/// signature is valid.
///
/// Every term is scaled by an independent nonzero random scalar before it is folded into a
/// pairing context, so invalid signatures cannot cancel each other out. With
/// `concurrency > 1`, the entries are split into shards whose contexts are built in parallel and
/// merged before the final check. Every public key and signature is group checked. Messages may
/// repeat.
pub fn verify_multiple_signatures<R, V>(
    rng: &mut R,
    entries: &[(V::Public, &[u8], V::Signature)],
    mapping: Mapping,
    dst: &[u8],
    aug: &[u8],
    concurrency: usize,
) -> Result<(), Error>
where
    R: RngCore + CryptoRng,
    V: Variant,
{
    if entries.is_empty() {
        return Ok(());
    }

    // Draw the weights up front so shards do not share the rng
    let scalars: Vec<Scalar> = (0..entries.len())
        .map(|_| Scalar::random_nonzero(&mut *rng))
        .collect();

    let context = accumulate(
        entries,
        mapping,
        dst,
        concurrency,
        |context, index, (public, message, signature)| {
            context.mul_n_aggregate::<V>(public, Some(signature), &scalars[index], message, aug)
        },
    )?;
    context.final_verify(None).inspect_err(|_| {
        debug!(entries = entries.len(), "batch verification failed");
    })
}
