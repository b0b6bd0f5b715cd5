//! Rolling k-mer hashing and accelerated AND-popcount for k-mer membership filters.
//!
//! The crate provides the two primitives of a Bloom-filter-style k-mer
//! membership test:
//! 1. `KmerHashIt` computes `h` ntHash values for every k-mer of a DNA
//!    sequence, skipping k-mers that contain ambiguous characters (`N` and
//!    anything else outside `ACGTacgt`) and updating the hashes in O(1) per base.
//! 2. `MaskedPopcount` computes the population count of the bitwise AND of a
//!    filter bit-vector and a query mask, on an accelerator (`SimdDevice`) or in
//!    portable software, with automatic fallback.
//!
//! The `membership` module combines them: a k-mer is reported as a member when
//! all of its query bits are set in the filter.
//!
//! #### Sequences
//!
//! The iterator accepts any `Seq`:
//! - a plain `&[u8]` of ASCII characters;
//! - a `PackedNSeq`: 2-bit packed bases plus a 1-bit ambiguity mask.
//!   Masked positions read back as `N`.
//!
//! ## Example
//!
//! ```
//! use nthash_filter::{
//!     membership::{query_mask, KmerQuery, Modulo},
//!     BitSeqVec, ExecutionMode, KmerHashIt, MaskedPopcount,
//! };
//!
//! let filter_bits = 1024;
//! let (k, h) = (5, 3);
//!
//! // Build a filter holding all 5-mers of a reference.
//! let reference = b"ACGTTGCATGCAACGT";
//! let mut filter = BitSeqVec::with_len(filter_bits);
//! KmerHashIt::new(&reference[..], h, k, filter_bits).for_each(|_, hashes| {
//!     for i in query_mask(hashes, filter_bits, &Modulo).as_slice().iter_ones() {
//!         filter.set(i);
//!     }
//! });
//!
//! let engine = MaskedPopcount::new(ExecutionMode::Auto).unwrap();
//! let query = KmerQuery::new(filter.as_slice(), &engine).unwrap();
//! let hits = query.query(&b"TTGCANNNACGTT"[..], k, h).unwrap();
//! assert_eq!(hits[0], (0, true));
//! assert_eq!(hits.iter().map(|&(pos, _)| pos).collect::<Vec<_>>(), vec![0, 8]);
//! ```

mod traits;

mod ascii;
mod bit_seq;
mod packed_n_seq;
mod packed_seq;
mod simd_types;

mod hash_it;
pub mod membership;
pub mod nthash;
pub mod offload;
mod popcount;


use mem_dbg::{MemDbg, MemSize};
use std::ops::Range;

pub use bit_seq::{is_ambiguous_char, BitSeq, BitSeqVec};
pub use hash_it::{KmerHashIt, Timed};
pub use nthash::{MultiHash, NtMultiHash};
pub use offload::{JobStatus, OffloadDevice, SimdDevice};
pub use packed_n_seq::{PackedNSeq, PackedNSeqVec};
pub use packed_seq::{complement_char, pack_char, pack_char_lossy, unpack_base};
pub use packed_seq::{PackedSeq, PackedSeqVec};
pub use popcount::{and_popcount, ExecutionMode, ExecutionPath, MaskedPopcount};
pub use traits::{Seq, SeqVec};

/// Shorthand `Result` for this crate's operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors of the AND-popcount engine and its configuration.
///
/// Running out of valid k-mers is not an error: the hash iterator simply ends.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An input or output buffer cannot hold `num_bits` bits.
    #[error("buffer of {got} bytes is too short for {num_bits} bits ({needed} bytes)")]
    BufferTooShort {
        needed: usize,
        got: usize,
        num_bits: u32,
    },

    /// The accelerator could not be probed or could not size its job.
    #[error("accelerator initialization failed: {0}")]
    OffloadInit(JobStatus),

    /// An accelerator job ran but did not succeed. Its count is meaningless.
    #[error("accelerator job failed: {0}")]
    OffloadExecution(JobStatus),

    #[error("unknown execution path `{0}`, expected one of hardware, software, auto")]
    UnknownExecutionPath(String),

    /// Filters must have a positive multiple of 8 bits, at most `u32::MAX`.
    #[error("invalid filter size of {0} bits")]
    FilterSize(usize),
}
