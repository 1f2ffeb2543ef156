//! Scalar, group, and pairing arithmetic over BLS12-381 with aggregate BLS signatures.
//!
//! # Overview
//!
//! The crate is layered bottom-up:
//!
//! - [primitives::scalar] and [primitives::keys]: elements of the scalar field and the secret
//!   keys derived from them (IETF keygen variants and EIP-2333 hierarchical derivation).
//! - [primitives::g1] and [primitives::g2]: points in affine and Jacobian form, their
//!   canonical encodings, the group law, hash/encode-to-curve, and multi-scalar multiplication.
//! - [primitives::pairing]: Miller loop, final exponentiation, the target group, and an
//!   incremental pairing context that can be built in shards and merged.
//! - [primitives::ops]: BLS signing, verification, aggregation, and batch verification in
//!   both the "minimal public key" ([primitives::variant::MinPk]) and "minimal signature"
//!   ([primitives::variant::MinSig]) configurations.
//!
//! Field arithmetic, curve formulas, and the pairing itself are provided by
//! [blst](https://github.com/supranational/blst).
//!
//! # Status
//!
//! `commonware-bls12381` is **ALPHA** software and is not yet recommended for production use. Developers should
//! expect breaking changes and occasional instability.

pub mod primitives;

pub use primitives::{
    g1::{G1Affine, G1},
    g2::{G2Affine, G2},
    group::{Mapping, Point},
    keys::SecretKey,
    pairing::{CommittedContext, MillerLoopResult, PairingContext, GT},
    scalar::Scalar,
    variant::{MinPk, MinSig, Variant},
    Error,
};
