use mem_dbg::{MemDbg, MemSize};
use std::ops::Range;

/// A non-owned, read-only view of a nucleotide sequence.
///
/// Implemented for:
/// - A `&[u8]` of ASCII characters, returned as-is.
/// - A `PackedNSeq` of 2-bit packed bases with a separate ambiguity mask,
///   where ambiguous positions read back as `N`.
///
/// The k-mer hash iterator only needs random access to ASCII symbols,
/// so that is all this trait asks for.
pub trait Seq<'s>: Copy {
    /// The corresponding owned sequence type.
    type SeqVec: SeqVec;

    /// The length of the sequence in characters.
    fn len(&self) -> usize;

    /// Returns `true` if the sequence is empty.
    fn is_empty(&self) -> bool;

    /// Get the ASCII character at the given index.
    fn get_ascii(&self, index: usize) -> u8;

    /// Iterate over the ASCII characters in `range`.
    #[inline(always)]
    fn iter_ascii(self, range: Range<usize>) -> impl ExactSizeIterator<Item = u8> {
        range.map(move |i| self.get_ascii(i))
    }

    /// Convert to an owned version.
    fn to_vec(&self) -> Self::SeqVec;
}

/// An owned sequence.
/// Can be constructed from ASCII input, and borrowed as the corresponding `Seq`.
///
/// Implemented for:
/// - A `Vec<u8>` of ASCII characters.
/// - A `PackedNSeqVec` of packed bases plus ambiguity mask.
pub trait SeqVec: Default + Sync + MemSize + MemDbg + Clone + 'static {
    type Seq<'s>: Seq<'s>;

    /// Get a non-owning view of the underlying sequence.
    fn as_slice(&self) -> Self::Seq<'_>;

    /// The length of the sequence in characters.
    fn len(&self) -> usize;

    /// Returns `true` if the sequence is empty.
    fn is_empty(&self) -> bool;

    /// Empty the sequence.
    fn clear(&mut self);

    /// Generate a random `ACGT` sequence with the given number of characters.
    #[cfg(feature = "rand")]
    fn random(n: usize) -> Self;

    /// Create a `SeqVec` from ASCII input.
    #[inline(always)]
    fn from_ascii(seq: &[u8]) -> Self {
        let mut seq_vec = Self::default();
        seq_vec.push_ascii(seq);
        seq_vec
    }

    /// Append the given ASCII sequence to the underlying storage.
    ///
    /// Returns the range of indices corresponding to the pushed sequence.
    fn push_ascii(&mut self, seq: &[u8]) -> Range<usize>;
}
