//! Membership tests of k-mers against a Bloom-filter-style bit-vector.
//!
//! Each k-mer's hashes are reduced to bit indices, collected in a query mask,
//! and the mask is ANDed with the filter. The k-mer is (probably) a member
//! when every query bit is set in the filter.

use crate::offload::OffloadDevice;
use crate::{BitSeq, BitSeqVec, Error, KmerHashIt, MaskedPopcount, Result, Seq};

/// Maps a hash value to a bit of a filter of `filter_bits` bits.
///
/// This must match the reduction used when the filter was built.
pub trait IndexReduction {
    fn bit_index(&self, hash: u64, filter_bits: usize) -> usize;
}

/// `hash % filter_bits`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modulo;

impl IndexReduction for Modulo {
    #[inline(always)]
    fn bit_index(&self, hash: u64, filter_bits: usize) -> usize {
        (hash % filter_bits as u64) as usize
    }
}

/// The query mask of one k-mer: a `filter_bits`-bit vector with the bit of every hash set.
pub fn query_mask(hashes: &[u64], filter_bits: usize, reduction: &impl IndexReduction) -> BitSeqVec {
    let mut mask = BitSeqVec::with_len(filter_bits);
    for &hash in hashes {
        mask.set(reduction.bit_index(hash, filter_bits));
    }
    mask
}

/// Tests k-mers against a borrowed filter bit-vector.
pub struct KmerQuery<'f, D: OffloadDevice, R: IndexReduction = Modulo> {
    filter: BitSeq<'f>,
    engine: &'f MaskedPopcount<D>,
    reduction: R,
}

impl<'f, D: OffloadDevice> KmerQuery<'f, D> {
    /// Query `filter` through `engine`, reducing hashes modulo the filter size.
    ///
    /// The filter size must be a positive multiple of 8 that fits in a `u32`.
    pub fn new(filter: BitSeq<'f>, engine: &'f MaskedPopcount<D>) -> Result<Self> {
        Self::with_reduction(filter, engine, Modulo)
    }
}

impl<'f, D: OffloadDevice, R: IndexReduction> KmerQuery<'f, D, R> {
    pub fn with_reduction(filter: BitSeq<'f>, engine: &'f MaskedPopcount<D>, reduction: R) -> Result<Self> {
        let bits = filter.len();
        if bits == 0 || bits % 8 != 0 || u32::try_from(bits).is_err() {
            return Err(Error::FilterSize(bits));
        }
        Ok(Self {
            filter,
            engine,
            reduction,
        })
    }

    /// Size of the filter in bits.
    pub fn filter_bits(&self) -> usize {
        self.filter.len()
    }

    /// Whether all bits selected by `hashes` are set in the filter.
    pub fn contains(&self, hashes: &[u64]) -> Result<bool> {
        let bits = self.filter.len();
        let mask = query_mask(hashes, bits, &self.reduction);
        let expected = mask.count_ones() as u32;
        let hits = self
            .engine
            .evaluate(self.filter.as_bytes(), mask.as_bytes(), bits as u32, None)?;
        Ok(hits == expected)
    }

    /// Test every valid `k`-mer of `seq` with `h` hashes each.
    /// Returns `(position, member)` pairs in order of position.
    pub fn query<'s, S: Seq<'s>>(&self, seq: S, k: usize, h: usize) -> Result<Vec<(usize, bool)>> {
        let mut it = KmerHashIt::new(seq, h, k, self.filter.len());
        let mut hits = vec![];
        while !it.is_end() {
            hits.push((it.pos(), self.contains(it.hashes())?));
            it.advance();
        }
        Ok(hits)
    }
}
