use super::*;

/// A 1-bit non-owned bit sequence.
///
/// Bit `i` lives in byte `i / 8` at position `i % 8`, least significant bit first.
/// Used as ambiguity mask of a `PackedNSeq`, and as filter bit-vector and query
/// mask for `MaskedPopcount`.
#[derive(Copy, Clone, Debug, Default, MemSize, MemDbg)]
pub struct BitSeq<'s> {
    seq: &'s [u8],
    /// Length in bits.
    len: usize,
}

/// A 1-bit owned bit sequence.
#[derive(Clone, Debug, Default, MemSize, MemDbg, PartialEq, Eq)]
pub struct BitSeqVec {
    pub(crate) seq: Vec<u8>,
    /// Length in bits.
    len: usize,
}

/// Returns `true` for anything other than `ACGTacgt`.
#[inline(always)]
pub fn is_ambiguous_char(base: u8) -> bool {
    !matches!(base, b'A' | b'C' | b'G' | b'T' | b'a' | b'c' | b'g' | b't')
}

impl<'s> BitSeq<'s> {
    /// View the first `len` bits of `seq`.
    /// Panics when `seq` is too short to hold `len` bits.
    #[inline(always)]
    pub fn new(seq: &'s [u8], len: usize) -> Self {
        assert!(
            len.div_ceil(8) <= seq.len(),
            "{} bytes cannot hold {len} bits.",
            seq.len()
        );
        Self { seq, len }
    }

    /// Length in bits.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get bit `index` as `0` or `1`.
    #[inline(always)]
    pub fn get(&self, index: usize) -> u8 {
        debug_assert!(index < self.len, "Index out of bounds: {index} >= {}", self.len);
        (self.seq[index / 8] >> (index % 8)) & 1
    }

    /// The `ceil(len / 8)` bytes backing this sequence.
    #[inline(always)]
    pub fn as_bytes(&self) -> &'s [u8] {
        &self.seq[..self.len.div_ceil(8)]
    }

    /// Number of set bits among the first `len`.
    pub fn count_ones(&self) -> usize {
        let full = &self.seq[..self.len / 8];
        let (words, tail) = full.split_at(full.len() / 8 * 8);
        let mut cnt = 0;
        for word in words.chunks_exact(8) {
            cnt += u64::from_le_bytes(std::array::from_fn(|i| word[i])).count_ones();
        }
        for byte in tail {
            cnt += byte.count_ones();
        }
        if self.len % 8 != 0 {
            cnt += (self.seq[self.len / 8] & ((1u8 << (self.len % 8)) - 1)).count_ones();
        }
        cnt as usize
    }

    /// Iterate the indices of all set bits.
    pub fn iter_ones(self) -> impl Iterator<Item = usize> + 's {
        (0..self.len).filter(move |&i| self.get(i) == 1)
    }
}

impl PartialEq for BitSeq<'_> {
    /// Two views are equal when they hold the same bits; unused bits of the last byte are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && (0..self.len).all(|i| self.get(i) == other.get(i))
    }
}

impl Eq for BitSeq<'_> {}

impl BitSeqVec {
    /// An all-zero bit sequence of `len` bits.
    pub fn with_len(len: usize) -> Self {
        Self {
            seq: vec![0; len.div_ceil(8)],
            len,
        }
    }

    /// Take ownership of `seq`, interpreting its first `len` bits.
    /// Excess bytes are dropped.
    pub fn from_bytes(mut seq: Vec<u8>, len: usize) -> Self {
        assert!(
            len.div_ceil(8) <= seq.len(),
            "{} bytes cannot hold {len} bits.",
            seq.len()
        );
        seq.truncate(len.div_ceil(8));
        Self { seq, len }
    }

    #[inline(always)]
    pub fn as_slice(&self) -> BitSeq<'_> {
        BitSeq {
            seq: &self.seq,
            len: self.len,
        }
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.seq
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn clear(&mut self) {
        self.seq.clear();
        self.len = 0;
    }

    #[inline(always)]
    pub fn get(&self, index: usize) -> u8 {
        self.as_slice().get(index)
    }

    /// Set bit `index` to `1`.
    #[inline(always)]
    pub fn set(&mut self, index: usize) {
        assert!(index < self.len, "Index out of bounds: {index} >= {}", self.len);
        self.seq[index / 8] |= 1 << (index % 8);
    }

    /// Clear all bits, keeping the length.
    pub fn reset(&mut self) {
        self.seq.fill(0);
    }

    #[inline(always)]
    pub fn count_ones(&self) -> usize {
        self.as_slice().count_ones()
    }

    /// Append one bit per ASCII character: `1` for ambiguous (non-`ACGTacgt`) characters, `0` otherwise.
    pub fn push_ascii(&mut self, seq: &[u8]) -> Range<usize> {
        let start = self.len;
        self.seq.resize((self.len + seq.len()).div_ceil(8), 0);
        for &base in seq {
            self.seq[self.len / 8] |= (is_ambiguous_char(base) as u8) << (self.len % 8);
            self.len += 1;
        }
        start..self.len
    }

    /// The ambiguity mask of an ASCII sequence.
    pub fn from_ascii(seq: &[u8]) -> Self {
        let mut bits = Self::default();
        bits.push_ascii(seq);
        bits
    }

    /// A random bit sequence where each bit is set with probability `frac`.
    #[cfg(feature = "rand")]
    pub fn random(len: usize, frac: f32) -> Self {
        use rand::{Rng, SeedableRng};

        let mut rng = rand::rngs::SmallRng::from_os_rng();
        let mut bits = Self::with_len(len);
        for i in 0..len {
            if rng.random_bool(frac as f64) {
                bits.set(i);
            }
        }
        bits
    }
}
