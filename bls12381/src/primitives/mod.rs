//! Operations over the BLS12-381 scalar field, its two curve groups, and the pairing between them.
//!
//! # Acknowledgements
//!
//! _The following crates were used as a reference when implementing this crate. If code is very similar
//! to the reference, it is accompanied by a comment and link._
//!
//! * <https://github.com/filecoin-project/blstrs> + <https://github.com/MystenLabs/fastcrypto>: Implementing operations over
//!   the BLS12-381 scalar field with <https://github.com/supranational/blst>.
//! * <https://github.com/supranational/blst/tree/master/bindings/rust>: Pairing contexts and the signature
//!   verification flows built on them.
//!
//! # Example
//!
//! ```rust
//! use commonware_bls12381::primitives::{
//!     group::{Mapping, G2_MESSAGE},
//!     ops::{core_verify, keypair, sign},
//!     variant::MinPk,
//!     Error,
//! };
//! use rand::rngs::OsRng;
//!
//! // Generate a keypair (public key in G1, signatures in G2)
//! let (private, public) = keypair::<_, MinPk>(&mut OsRng);
//!
//! // Sign a message
//! let message = b"hello world";
//! let signature = sign::<MinPk>(&private, Mapping::Hash, message, G2_MESSAGE, &[]);
//!
//! // Verify the signature
//! core_verify::<MinPk>(&public, &signature, Mapping::Hash, message, G2_MESSAGE, &[])
//!     .expect("signature should be valid");
//!
//! // A different message does not verify
//! assert_eq!(
//!     core_verify::<MinPk>(&public, &signature, Mapping::Hash, b"bye", G2_MESSAGE, &[]),
//!     Err(Error::VerifyFail)
//! );
//! ```

pub mod g1;
pub mod g2;
pub mod group;
pub mod keys;
mod msm;
pub mod ops;
pub mod pairing;
pub mod scalar;
pub mod variant;

use blst::BLST_ERROR;
use rayon::ThreadPoolBuilder;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur when working with BLS12-381 primitives.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("bad encoding")]
    BadEncoding,
    #[error("point not on curve")]
    PointNotOnCurve,
    #[error("point not in group")]
    PointNotInGroup,
    #[error("aggregate type mismatch")]
    AggrTypeMismatch,
    #[error("verification failed")]
    VerifyFail,
    #[error("public key is infinity")]
    PkIsInfinity,
    #[error("bad scalar")]
    BadScalar,
    #[error("length mismatch: {0} != {1}")]
    LengthMismatch(usize, usize),
    #[error("duplicate message")]
    DuplicateMessage,
}

impl Error {
    /// Maps a status code returned by `blst` onto [Error].
    pub(crate) fn check(err: BLST_ERROR) -> Result<(), Self> {
        match err {
            BLST_ERROR::BLST_SUCCESS => Ok(()),
            BLST_ERROR::BLST_BAD_ENCODING => Err(Self::BadEncoding),
            BLST_ERROR::BLST_POINT_NOT_ON_CURVE => Err(Self::PointNotOnCurve),
            BLST_ERROR::BLST_POINT_NOT_IN_GROUP => Err(Self::PointNotInGroup),
            BLST_ERROR::BLST_AGGR_TYPE_MISMATCH => Err(Self::AggrTypeMismatch),
            BLST_ERROR::BLST_VERIFY_FAIL => Err(Self::VerifyFail),
            BLST_ERROR::BLST_PK_IS_INFINITY => Err(Self::PkIsInfinity),
            BLST_ERROR::BLST_BAD_SCALAR => Err(Self::BadScalar),
        }
    }
}

/// Runs `f` on a dedicated pool of `concurrency` threads.
///
/// If the pool cannot be built, `f` runs on the calling thread (any parallel iterators inside
/// it then use the global pool).
pub(crate) fn install<T, F>(concurrency: usize, f: F) -> T
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match ThreadPoolBuilder::new().num_threads(concurrency).build() {
        Ok(pool) => pool.install(f),
        Err(err) => {
            warn!(?err, concurrency, "unable to build thread pool");
            f()
        }
    }
}
