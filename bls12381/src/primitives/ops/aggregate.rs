//! Aggregation of BLS12-381 public keys and signatures.
//!
//! Signatures over the *same* message are aggregated by point addition and verified against the
//! sum of the public keys ([fast_aggregate_verify]). Signatures over *distinct* messages are
//! aggregated the same way but must be verified term by term through a pairing context
//! ([aggregate_verify]).
//!
//! # Security Considerations
//!
//! Aggregate verification only checks that the aggregate is valid. An attacker that controls
//! some of the signers can redistribute signature components between them without changing
//! the aggregate. Use [`batch`](super::batch) when each individual signature must be valid.

use super::{
    super::{
        group::{Mapping, Point},
        variant::Variant,
        Error,
    },
    accumulate, core_verify,
};
use std::collections::HashSet;
use tracing::debug;

/// Combines multiple public keys into an aggregate public key.
///
/// # Warning
///
/// This function assumes a group check was already performed on all `public_keys`,
/// that each `public_key` is unique, and that the caller has a Proof-of-Possession (PoP)
/// for each `public_key`. If any of these assumptions are violated, an attacker can
/// exploit this function to verify an incorrect aggregate signature.
pub fn combine_public_keys<'a, V, I>(public_keys: I) -> V::Public
where
    V: Variant,
    I: IntoIterator<Item = &'a V::Public>,
    V::Public: 'a,
{
    let mut p = V::Public::infinity();
    for pk in public_keys {
        p += *pk;
    }
    p
}

/// Combines multiple signatures into an aggregate signature.
///
/// # Warning
///
/// This function assumes a group check was already performed on each `signature` and
/// that each `signature` is unique. If any of these assumptions are violated, an attacker can
/// exploit this function to verify an incorrect aggregate signature.
pub fn combine_signatures<'a, V, I>(signatures: I) -> V::Signature
where
    V: Variant,
    I: IntoIterator<Item = &'a V::Signature>,
    V::Signature: 'a,
{
    let mut s = V::Signature::infinity();
    for sig in signatures {
        s += *sig;
    }
    s
}

/// Verifies the aggregate signature over a single message from multiple public keys.
///
/// Fails with [Error::VerifyFail] if `public_keys` is empty and with [Error::PkIsInfinity] if
/// the public keys sum to the identity.
///
/// # Warning
///
/// This function assumes the caller has performed a group check and collected a proof-of-possession
/// for all provided `public_keys`. It is not safe to provide duplicate public keys.
pub fn fast_aggregate_verify<V: Variant>(
    public_keys: &[V::Public],
    signature: &V::Signature,
    mapping: Mapping,
    message: &[u8],
    dst: &[u8],
    aug: &[u8],
) -> Result<(), Error> {
    if public_keys.is_empty() {
        return Err(Error::VerifyFail);
    }

    // We can take advantage of the bilinearity property of pairings to aggregate public keys
    // that have all signed the same message (as long as all public keys are unique).
    let public = combine_public_keys::<V, _>(public_keys);
    core_verify::<V>(&public, signature, mapping, message, dst, aug)
}

/// Verifies an aggregate signature over distinct messages, one per public key.
///
/// Each entry is a tuple of (public key, message). Every public key and the signature are group
/// checked. With `concurrency > 1`, the entries are split into shards whose pairing contexts
/// are built in parallel and merged before the final check.
///
/// Fails with [Error::DuplicateMessage] if two entries share a message and with
/// [Error::VerifyFail] if there are no entries.
pub fn aggregate_verify<V: Variant>(
    entries: &[(V::Public, &[u8])],
    signature: &V::Signature,
    mapping: Mapping,
    dst: &[u8],
    aug: &[u8],
    concurrency: usize,
) -> Result<(), Error> {
    if entries.is_empty() {
        return Err(Error::VerifyFail);
    }

    // The basic scheme is only sound over distinct messages
    let mut seen = HashSet::with_capacity(entries.len());
    if !entries.iter().all(|(_, message)| seen.insert(*message)) {
        debug!(entries = entries.len(), "duplicate message in aggregate");
        return Err(Error::DuplicateMessage);
    }

    // The signature is folded into the first term
    let context = accumulate(
        entries,
        mapping,
        dst,
        concurrency,
        |context, index, (public, message)| {
            let signature = (index == 0).then_some(signature);
            context.aggregate::<V>(public, signature, message, aug)
        },
    )?;
    context.final_verify(None)
}
